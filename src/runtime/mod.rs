//! Crew execution
//!
//! The engine hands a fully assembled [`Crew`] to a [`CrewRuntime`], which
//! runs the tasks strictly in list order and returns the final task's text.
//! [`Executor`] is the thin entry point the service and CLI call; runtime
//! failures propagate through it unmodified. There are no retries and no
//! timeouts here: a hung model call blocks the caller, by design.

mod openai;

pub use openai::OpenAiRuntime;

use crate::crew::Crew;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to build completion request: {0}")]
    Request(String),
    #[error("model call failed: {0}")]
    Api(String),
    #[error("model returned no output for task {0}")]
    EmptyResponse(String),
    #[error("task {0} exceeded the tool-call turn limit")]
    ToolLimit(String),
}

/// The execution backend a crew is handed to.
#[async_trait]
pub trait CrewRuntime: Send + Sync {
    /// Run every task of the crew in declared order and return the final
    /// task's textual output.
    async fn kickoff(
        &self,
        crew: &Crew,
        inputs: &HashMap<String, String>,
    ) -> Result<String, RuntimeError>;
}

/// Runs assembled crews through a runtime.
#[derive(Clone)]
pub struct Executor {
    runtime: Arc<dyn CrewRuntime>,
}

impl Executor {
    pub fn new(runtime: Arc<dyn CrewRuntime>) -> Self {
        Self { runtime }
    }

    /// Execute the crew, blocking until the runtime returns.
    pub async fn run(
        &self,
        crew: &Crew,
        inputs: Option<HashMap<String, String>>,
    ) -> Result<String, RuntimeError> {
        let inputs = inputs.unwrap_or_default();
        self.runtime.kickoff(crew, &inputs).await
    }
}

//! Crew assembly: agents, tasks and the builder that wires them
//!
//! A crew is an ordered set of agents plus an ordered list of tasks. Task
//! ordering doubles as the dependency order: a task may only take context
//! from tasks that appear earlier in the list, so the graph is acyclic by
//! construction and needs no separate cycle check.

mod agent;
mod builder;
mod task;

pub use agent::Agent;
pub use builder::CrewBuilder;
pub use task::Task;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum CrewError {
    #[error("unknown agent type: {0}")]
    UnknownAgentType(String),
    #[error("unknown task type: {0}")]
    UnknownTaskType(String),
    #[error("custom crew resolved to no agents")]
    EmptyCrew,
}

/// How a crew executes its tasks.
///
/// Only sequential execution exists: later tasks may consume the textual
/// output of earlier ones, so they run one at a time in list order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    #[default]
    Sequential,
}

/// A fully assembled crew, ready to hand to a runtime.
#[derive(Debug, Clone, Serialize)]
pub struct Crew {
    pub agents: Vec<Agent>,
    pub tasks: Vec<Task>,
    pub process: Process,
    pub verbose: bool,
}

impl Crew {
    /// The agent that executes `task`.
    pub fn agent_for(&self, task: &Task) -> &Agent {
        &self.agents[task.agent]
    }
}

/// The crew shapes a caller can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrewKind {
    Research,
    Analysis,
    Full,
    Custom,
}

impl CrewKind {
    /// Map a caller-supplied selector to a crew kind. Unknown selectors fall
    /// back to `Research` (documented default, not an error).
    pub fn from_selector(selector: &str) -> Self {
        match selector {
            "research" => Self::Research,
            "analysis" => Self::Analysis,
            "full" => Self::Full,
            "custom" => Self::Custom,
            _ => Self::Research,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Research => "research",
            Self::Analysis => "analysis",
            Self::Full => "full",
            Self::Custom => "custom",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Research => "Research Crew",
            Self::Analysis => "Analysis Crew",
            Self::Full => "Full Crew",
            Self::Custom => "Custom Crew",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Research => "Researcher + Writer for comprehensive research and documentation",
            Self::Analysis => "Researcher + Analyst for research and strategic analysis",
            Self::Full => "All agents working together for comprehensive deliverables",
            Self::Custom => "Build your own crew with selected agents and tasks",
        }
    }

    /// Agent ids used by the fixed strategies; empty for `Custom`.
    pub fn agent_ids(&self) -> &'static [&'static str] {
        match self {
            Self::Research => &["researcher", "writer"],
            Self::Analysis => &["researcher", "analyst"],
            Self::Full => &["researcher", "writer", "analyst", "coordinator"],
            Self::Custom => &[],
        }
    }
}

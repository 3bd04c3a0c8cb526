//! Muster - assembles and runs small sequential crews of LLM agents
//!
//! This crate provides:
//! - Template tables for agent personas and task contracts
//! - A crew builder that instantiates and wires agents/tasks for a topic
//! - A sequential executor backed by any OpenAI-compatible API
//! - Pure text tools agents can call while working
//! - An HTTP service and CLI around the engine

pub mod config;
pub mod crew;
pub mod history;
pub mod server;
pub mod templates;
pub mod tool;
pub mod tools;

// Execution
pub mod runtime;

pub use config::Config;
pub use crew::{Agent, Crew, CrewBuilder, CrewError, CrewKind, Process, Task};
pub use history::{ExecutionHistory, ExecutionRecord, ExecutionStatus};
pub use runtime::{CrewRuntime, Executor, OpenAiRuntime, RuntimeError};
pub use templates::{AgentTemplate, ConfigError, TaskTemplate, TemplateStore};
pub use tool::{Tool, ToolRegistry};

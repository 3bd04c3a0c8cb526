//! Agent and task template tables
//!
//! Templates are the immutable, topic-parameterized definitions that crews
//! are instantiated from. Every text field may contain the literal `{topic}`
//! placeholder; instantiation replaces all occurrences with the topic string.
//!
//! Default tables are compiled in. A templates directory can replace a table
//! wholesale by providing `agents.yaml` or `tasks.yaml`. Loading is
//! idempotent and side-effect-free; a missing or malformed table is fatal at
//! startup.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Placeholder token replaced with the topic at instantiation time.
///
/// Plain substring replacement, not a templating language: all occurrences
/// are replaced, nothing is escaped.
pub const TOPIC_PLACEHOLDER: &str = "{topic}";

const DEFAULT_AGENTS: &str = include_str!("templates/agents.yaml");
const DEFAULT_TASKS: &str = include_str!("templates/tasks.yaml");

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read template table {name}: {source}")]
    Io {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse template table {name}: {source}")]
    Parse {
        name: &'static str,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("template table {0} has no entries")]
    EmptyTable(&'static str),
}

/// Definition an [`crate::crew::Agent`] is instantiated from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentTemplate {
    pub role: String,
    pub goal: String,
    pub backstory: String,
    #[serde(default = "default_true")]
    pub verbose: bool,
    #[serde(default)]
    pub allow_delegation: bool,
}

/// Definition a [`crate::crew::Task`] is instantiated from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub description: String,
    pub expected_output: String,
    /// Default agent id for this task, if declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Listing projection for an agent template.
#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub id: String,
    pub role: String,
    pub goal: String,
}

/// Listing projection for a task template.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub id: String,
    pub description: String,
    pub agent: String,
}

/// The two named template tables, keyed by identifier.
///
/// Tables preserve declaration order: custom-crew agent resolution falls back
/// to the first instantiated agent in insertion order.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    agents: IndexMap<String, AgentTemplate>,
    tasks: IndexMap<String, TaskTemplate>,
}

impl TemplateStore {
    /// Parse the compiled-in default tables.
    pub fn builtin() -> Result<Self, ConfigError> {
        Ok(Self {
            agents: parse_table("agents", DEFAULT_AGENTS)?,
            tasks: parse_table("tasks", DEFAULT_TASKS)?,
        })
    }

    /// Load tables, replacing a default table for each of `agents.yaml` /
    /// `tasks.yaml` that exists under `dir`.
    pub fn load(dir: Option<&Path>) -> Result<Self, ConfigError> {
        let mut store = Self::builtin()?;
        let Some(dir) = dir else {
            return Ok(store);
        };

        if let Some(text) = read_optional(&dir.join("agents.yaml"), "agents")? {
            store.agents = parse_table("agents", &text)?;
        }
        if let Some(text) = read_optional(&dir.join("tasks.yaml"), "tasks")? {
            store.tasks = parse_table("tasks", &text)?;
        }
        Ok(store)
    }

    pub fn agent(&self, id: &str) -> Option<&AgentTemplate> {
        self.agents.get(id)
    }

    pub fn task(&self, id: &str) -> Option<&TaskTemplate> {
        self.tasks.get(id)
    }

    pub fn agent_ids(&self) -> impl Iterator<Item = &str> {
        self.agents.keys().map(|s| s.as_str())
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    /// Agent listing: id plus trimmed role and goal.
    pub fn agent_summaries(&self) -> Vec<AgentSummary> {
        self.agents
            .iter()
            .map(|(id, t)| AgentSummary {
                id: id.clone(),
                role: t.role.trim().to_string(),
                goal: t.goal.trim().to_string(),
            })
            .collect()
    }

    /// Task listing: id, description truncated to 200 characters, and the
    /// declared default agent (empty string when none).
    pub fn task_summaries(&self) -> Vec<TaskSummary> {
        self.tasks
            .iter()
            .map(|(id, t)| TaskSummary {
                id: id.clone(),
                description: t.description.trim().chars().take(200).collect(),
                agent: t.agent.clone().unwrap_or_default(),
            })
            .collect()
    }
}

fn parse_table<T: serde::de::DeserializeOwned>(
    name: &'static str,
    text: &str,
) -> Result<IndexMap<String, T>, ConfigError> {
    let table: IndexMap<String, T> =
        serde_yaml::from_str(text).map_err(|source| ConfigError::Parse { name, source })?;
    if table.is_empty() {
        return Err(ConfigError::EmptyTable(name));
    }
    Ok(table)
}

fn read_optional(path: &Path, name: &'static str) -> Result<Option<String>, ConfigError> {
    if !path.is_file() {
        return Ok(None);
    }
    std::fs::read_to_string(path)
        .map(Some)
        .map_err(|source| ConfigError::Io { name, source })
}

//! Agent instances

use serde::Serialize;

/// A persona instantiated from an agent template for one crew.
///
/// All text fields already have the topic substituted (and the document
/// augmentation applied, when documents were supplied). Agents are owned by
/// the crew they were built for and never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct Agent {
    /// Template id this agent was instantiated from.
    pub id: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    pub verbose: bool,
    pub allow_delegation: bool,
    /// Names of the tools available to this agent.
    pub tools: Vec<String>,
}

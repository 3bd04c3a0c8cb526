//! Task instances

use serde::Serialize;

/// A unit of work instantiated from a task template for one crew.
///
/// `agent` and `context` are indices into the owning crew's agent and task
/// sequences. Context indices are always strictly smaller than the task's own
/// position: construction only ever appends, never reorders, so list order is
/// a topological order and no cycle check is needed.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    /// Template id this task was instantiated from.
    pub id: String,
    pub description: String,
    pub expected_output: String,
    /// Index of the owning agent in the crew's agent sequence.
    pub agent: usize,
    /// Indices of earlier tasks whose outputs feed this task.
    pub context: Vec<usize>,
}

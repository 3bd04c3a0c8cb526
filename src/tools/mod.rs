//! Built-in tool implementations
//!
//! Each tool implements the `Tool` trait from `crate::tool`. All four are
//! pure text transforms agents can call while working a task.

mod bullets;
mod format;
mod priority;
mod summary;

pub use bullets::{extract_bullet_points, BulletPointExtractor};
pub use format::{format_data, DataFormatter};
pub use priority::{score_priority, PriorityScorer};
pub use summary::{generate_summary, SummaryGenerator};

use crate::tool::ToolRegistry;

/// Create a registry with all built-in tools
pub fn create_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(DataFormatter);
    registry.register(SummaryGenerator);
    registry.register(BulletPointExtractor);
    registry.register(PriorityScorer);

    registry
}

/// Names of the default toolset, in registration order
pub fn default_tool_names() -> Vec<String> {
    create_registry().names()
}

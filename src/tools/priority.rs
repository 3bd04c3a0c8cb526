//! Priority scorer tool

use crate::tool::{Tool, ToolDefinition, ToolResult};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct Args {
    item: String,
    #[serde(default = "default_criteria")]
    criteria: String,
}

fn default_criteria() -> String {
    "impact,urgency,feasibility".to_string()
}

/// Score an item's priority against comma-separated criteria.
///
/// Each criterion gets High/Medium/Low from the item's word count
/// (>10 / >5 / otherwise). The report shows the first 50 characters of the
/// item and one line per criterion.
pub fn score_priority(item: &str, criteria: &str) -> String {
    let word_count = item.split_whitespace().count();
    let level = if word_count > 10 {
        "High"
    } else if word_count > 5 {
        "Medium"
    } else {
        "Low"
    };

    let score_text = criteria
        .split(',')
        .map(|criterion| format!("  - {}: {}", criterion.trim(), level))
        .collect::<Vec<_>>()
        .join("\n");

    let preview: String = item.chars().take(50).collect();
    format!("Priority Assessment for: {preview}...\n{score_text}")
}

pub struct PriorityScorer;

impl Tool for PriorityScorer {
    fn name(&self) -> &str {
        "score_priority"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "score_priority".to_string(),
            description: "Score an item's priority based on specified criteria.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "item": {
                        "type": "string",
                        "description": "The item to score"
                    },
                    "criteria": {
                        "type": "string",
                        "description": "Comma-separated scoring criteria. Defaults to impact,urgency,feasibility."
                    }
                },
                "required": ["item"]
            }),
        }
    }

    fn execute(&self, args: serde_json::Value) -> ToolResult {
        let args: Args = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return ToolResult::error(format!("Invalid arguments: {}", e)),
        };

        ToolResult::success(score_priority(&args.item, &args.criteria))
    }
}

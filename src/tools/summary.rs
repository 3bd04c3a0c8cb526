//! Summary generator tool - greedy sentence-level truncation

use crate::tool::{Tool, ToolDefinition, ToolResult};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct Args {
    text: String,
    #[serde(default = "default_max_length")]
    max_length: usize,
}

fn default_max_length() -> usize {
    500
}

/// Generate a concise summary of the provided text.
///
/// Text at or under `max_length` characters is returned unchanged. Longer
/// text is reduced to the leading whole sentences (split on the literal
/// `". "`) that fit the budget, with a `...` marker appended.
pub fn generate_summary(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }

    let mut summary = Vec::new();
    let mut current_length = 0;

    for sentence in text.split(". ") {
        let len = sentence.chars().count();
        if current_length + len <= max_length {
            summary.push(sentence);
            current_length += len + 2;
        } else {
            break;
        }
    }

    format!("{}...", summary.join(". "))
}

pub struct SummaryGenerator;

impl Tool for SummaryGenerator {
    fn name(&self) -> &str {
        "generate_summary"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "generate_summary".to_string(),
            description: "Generate a concise summary of the provided text.".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "The text to summarize"
                    },
                    "max_length": {
                        "type": "integer",
                        "description": "Maximum length of the summary in characters. Defaults to 500."
                    }
                },
                "required": ["text"]
            }),
        }
    }

    fn execute(&self, args: serde_json::Value) -> ToolResult {
        let args: Args = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return ToolResult::error(format!("Invalid arguments: {}", e)),
        };

        ToolResult::success(generate_summary(&args.text, args.max_length))
    }
}

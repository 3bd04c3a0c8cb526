//! Bullet point extractor tool

use crate::tool::{Tool, ToolDefinition, ToolResult};
use serde::Deserialize;
use serde_json::json;

/// Lines kept in the output, at most.
const MAX_POINTS: usize = 20;

#[derive(Debug, Deserialize)]
struct Args {
    text: String,
}

/// Extract key points from text and format them as bullet points.
///
/// Lines are trimmed; already-bulleted lines pass through, prose lines of
/// 21..=199 characters get a `• ` prefix, headings and blank lines are
/// dropped. The first 20 qualifying lines are kept, in input order.
pub fn extract_bullet_points(text: &str) -> String {
    let mut points = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with("- ") || line.starts_with("* ") || line.starts_with("• ") {
            points.push(line.to_string());
        } else {
            let len = line.chars().count();
            if len > 20 && len < 200 {
                points.push(format!("• {line}"));
            }
        }

        if points.len() == MAX_POINTS {
            break;
        }
    }

    points.join("\n")
}

pub struct BulletPointExtractor;

impl Tool for BulletPointExtractor {
    fn name(&self) -> &str {
        "extract_bullet_points"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "extract_bullet_points".to_string(),
            description: "Extract key points from text and format them as bullet points."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "text": {
                        "type": "string",
                        "description": "The text to extract points from"
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

        ToolResult::success(extract_bullet_points(&args.text))
    }
}

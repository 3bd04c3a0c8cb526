//! Data formatter tool - reformats text as JSON, markdown or CSV

use crate::tool::{Tool, ToolDefinition, ToolResult};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct Args {
    data: String,
    #[serde(default = "default_format")]
    format_type: String,
}

fn default_format() -> String {
    "json".to_string()
}

/// Format data into a specified format (json, markdown, csv).
///
/// Unknown formats return the input unchanged. Malformed JSON input yields an
/// error message string, not an error value.
pub fn format_data(data: &str, format_type: &str) -> String {
    match format_type {
        "json" => match serde_json::from_str::<serde_json::Value>(data) {
            Ok(parsed) => serde_json::to_string_pretty(&parsed)
                .unwrap_or_else(|e| format_error(&e, data)),
            Err(e) => format_error(&e, data),
        },
        "markdown" => format!("## Data Output\n\n```\n{data}\n```"),
        "csv" => data.replace(", ", ",").replace(" - ", ","),
        _ => data.to_string(),
    }
}

fn format_error(err: &dyn std::fmt::Display, data: &str) -> String {
    format!("Error formatting data: {err}\n\nOriginal data:\n{data}")
}

pub struct DataFormatter;

impl Tool for DataFormatter {
    fn name(&self) -> &str {
        "format_data"
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "format_data".to_string(),
            description: "Format data into a specified format (json, markdown, csv).".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "data": {
                        "type": "string",
                        "description": "The data to format"
                    },
                    "format_type": {
                        "type": "string",
                        "description": "The output format: json, markdown or csv. Defaults to json."
                    }
                },
                "required": ["data"]
            }),
        }
    }

    fn execute(&self, args: serde_json::Value) -> ToolResult {
        let args: Args = match serde_json::from_value(args) {
            Ok(a) => a,
            Err(e) => return ToolResult::error(format!("Invalid arguments: {}", e)),
        };

        ToolResult::success(format_data(&args.data, &args.format_type))
    }
}

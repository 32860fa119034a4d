//! `read` tool — read file contents from the project, optionally a line window.

use async_trait::async_trait;
use codeloop_core::error::ToolError;
use codeloop_core::tool::{Tool, ToolContext, ToolKind, ToolResult};

use crate::sandbox::{display_path, resolve_in_root};
use crate::{optional_usize, required_str};

pub struct FileReadTool;

#[async_trait]
impl Tool for FileReadTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Read
    }

    fn description(&self) -> &str {
        "Read the contents of a file in the project. Optionally pass a 1-based line offset and a line limit."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path, relative to the project root"
                },
                "offset": {
                    "type": "integer",
                    "description": "1-based line to start reading from"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of lines to return"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let path = required_str(&arguments, "path")?;
        let resolved = resolve_in_root(context.root(), path)?;
        let shown = display_path(context.root(), &resolved);
        let title = format!("Read {shown}");

        let content = match tokio::fs::read_to_string(&resolved).await {
            Ok(content) => content,
            Err(e) => return Ok(ToolResult::error(title, format!("Failed to read file: {e}"))),
        };

        let offset = optional_usize(&arguments, "offset");
        let limit = optional_usize(&arguments, "limit");
        if offset.is_none() && limit.is_none() {
            return Ok(ToolResult::ok(title, content));
        }

        let start = offset.unwrap_or(1).saturating_sub(1);
        let window: Vec<&str> = content
            .lines()
            .skip(start)
            .take(limit.unwrap_or(usize::MAX))
            .collect();
        Ok(ToolResult::ok(title, window.join("\n")))
    }
}

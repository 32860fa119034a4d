//! `write` tool — create or overwrite a file in the project.

use async_trait::async_trait;
use codeloop_core::error::ToolError;
use codeloop_core::tool::{Tool, ToolContext, ToolKind, ToolResult};

use crate::required_str;
use crate::sandbox::{display_path, resolve_in_root};

pub struct FileWriteTool;

#[async_trait]
impl Tool for FileWriteTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Write
    }

    fn description(&self) -> &str {
        "Write content to a file. Creates the file and missing parent directories, overwrites if it exists."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path, relative to the project root"
                },
                "content": {
                    "type": "string",
                    "description": "The full content to write"
                }
            },
            "required": ["path", "content"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let path = required_str(&arguments, "path")?;
        let content = required_str(&arguments, "content")?;

        let resolved = resolve_in_root(context.root(), path)?;
        let shown = display_path(context.root(), &resolved);
        let title = format!("Wrote {shown}");

        if let Some(parent) = resolved.parent()
            && let Err(e) = tokio::fs::create_dir_all(parent).await
        {
            return Ok(ToolResult::error(
                title,
                format!("Failed to create directory: {e}"),
            ));
        }

        match tokio::fs::write(&resolved, content).await {
            Ok(()) => Ok(ToolResult::ok(
                title,
                format!("Successfully wrote {} bytes to {shown}", content.len()),
            )),
            Err(e) => Ok(ToolResult::error(title, format!("Failed to write file: {e}"))),
        }
    }
}

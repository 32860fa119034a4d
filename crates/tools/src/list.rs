//! `list` tool — list the entries of a project directory.

use async_trait::async_trait;
use codeloop_core::error::ToolError;
use codeloop_core::tool::{Tool, ToolContext, ToolKind, ToolResult};

use crate::sandbox::{display_path, resolve_in_root};

pub struct ListTool;

#[async_trait]
impl Tool for ListTool {
    fn kind(&self) -> ToolKind {
        ToolKind::List
    }

    fn description(&self) -> &str {
        "List files and directories in a project directory. Directories end with '/'."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Directory to list, relative to the project root (default: root)"
                }
            }
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let path = arguments["path"].as_str().unwrap_or(".");
        let resolved = resolve_in_root(context.root(), path)?;
        let shown = display_path(context.root(), &resolved);
        let title = format!("List {shown}");

        let mut dir = match tokio::fs::read_dir(&resolved).await {
            Ok(dir) => dir,
            Err(e) => {
                return Ok(ToolResult::error(
                    title,
                    format!("Failed to list directory: {e}"),
                ));
            }
        };

        let mut entries = Vec::new();
        loop {
            match dir.next_entry().await {
                Ok(Some(entry)) => {
                    let mut name = entry.file_name().to_string_lossy().into_owned();
                    if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
                        name.push('/');
                    }
                    entries.push(name);
                }
                Ok(None) => break,
                Err(e) => {
                    return Ok(ToolResult::error(
                        title,
                        format!("Failed to list directory: {e}"),
                    ));
                }
            }
        }
        entries.sort();

        if entries.is_empty() {
            return Ok(ToolResult::ok(title, format!("{shown} is empty")));
        }
        Ok(ToolResult::ok(title, entries.join("\n")))
    }
}

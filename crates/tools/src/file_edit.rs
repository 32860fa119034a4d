//! `edit` tool — exact string replacement inside an existing file.

use async_trait::async_trait;
use codeloop_core::error::ToolError;
use codeloop_core::tool::{Tool, ToolContext, ToolKind, ToolResult};

use crate::required_str;
use crate::sandbox::{display_path, resolve_in_root};

pub struct FileEditTool;

#[async_trait]
impl Tool for FileEditTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Edit
    }

    fn description(&self) -> &str {
        "Replace an exact string in a file. old_string must match exactly once unless replace_all is true."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "File path, relative to the project root"
                },
                "old_string": {
                    "type": "string",
                    "description": "Exact text to replace"
                },
                "new_string": {
                    "type": "string",
                    "description": "Replacement text"
                },
                "replace_all": {
                    "type": "boolean",
                    "description": "Replace every occurrence instead of exactly one"
                }
            },
            "required": ["path", "old_string", "new_string"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let path = required_str(&arguments, "path")?;
        let old_string = required_str(&arguments, "old_string")?;
        let new_string = required_str(&arguments, "new_string")?;
        let replace_all = arguments["replace_all"].as_bool().unwrap_or(false);

        if old_string.is_empty() {
            return Err(ToolError::InvalidArguments(
                "'old_string' must not be empty".into(),
            ));
        }

        let resolved = resolve_in_root(context.root(), path)?;
        let shown = display_path(context.root(), &resolved);
        let title = format!("Edited {shown}");

        let original = match tokio::fs::read_to_string(&resolved).await {
            Ok(content) => content,
            Err(e) => return Ok(ToolResult::error(title, format!("Failed to read file: {e}"))),
        };

        let occurrences = original.matches(old_string).count();
        if occurrences == 0 {
            return Ok(ToolResult::error(
                title,
                format!("old_string not found in {shown}"),
            ));
        }
        if occurrences > 1 && !replace_all {
            return Ok(ToolResult::error(
                title,
                format!(
                    "old_string occurs {occurrences} times in {shown}; add context or set replace_all"
                ),
            ));
        }

        let updated = if replace_all {
            original.replace(old_string, new_string)
        } else {
            original.replacen(old_string, new_string, 1)
        };

        match tokio::fs::write(&resolved, updated).await {
            Ok(()) => Ok(ToolResult::ok(
                title,
                format!("Replaced {occurrences} occurrence(s) in {shown}"),
            )),
            Err(e) => Ok(ToolResult::error(title, format!("Failed to write file: {e}"))),
        }
    }
}

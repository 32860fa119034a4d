//! Built-in tool implementations for codeloop.
//!
//! Tools give the model the ability to work on the project:
//! read, write and edit files, run shell commands, search and list the tree.
//! Every path is confined to the project root via [`sandbox`].

pub mod file_edit;
pub mod file_read;
pub mod file_write;
pub mod list;
pub mod sandbox;
pub mod search;
pub mod shell;

use codeloop_core::error::ToolError;
use codeloop_core::tool::ToolRegistry;

pub use shell::ShellTool;

/// Create a registry with every built-in tool and an unrestricted shell.
pub fn default_registry() -> ToolRegistry {
    registry_with_shell(ShellTool::default())
}

/// Create a registry with every built-in tool, using the given shell policy.
pub fn registry_with_shell(shell: ShellTool) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(file_read::FileReadTool));
    registry.register(Box::new(file_write::FileWriteTool));
    registry.register(Box::new(file_edit::FileEditTool));
    registry.register(Box::new(shell));
    registry.register(Box::new(search::SearchTool));
    registry.register(Box::new(list::ListTool));
    registry
}

/// Fetch a required string argument.
pub(crate) fn required_str<'a>(
    arguments: &'a serde_json::Value,
    key: &str,
) -> Result<&'a str, ToolError> {
    arguments[key]
        .as_str()
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{key}' argument")))
}

/// Fetch an optional non-negative integer argument.
pub(crate) fn optional_usize(arguments: &serde_json::Value, key: &str) -> Option<usize> {
    arguments[key].as_u64().map(|n| n as usize)
}

/// Shorten `text` to at most `max` chars for a progress title.
pub(crate) fn clip(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() <= max && line.len() == text.len() {
        return line.to_string();
    }
    let mut out: String = line.chars().take(max).collect();
    out.push('…');
    out
}

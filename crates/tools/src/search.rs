//! `search` tool — regex search over project files, honoring ignore files.

use std::path::Path;

use async_trait::async_trait;
use codeloop_core::error::ToolError;
use codeloop_core::tool::{Tool, ToolContext, ToolKind, ToolResult};
use ignore::WalkBuilder;
use regex_lite::Regex;
use tracing::debug;

use crate::sandbox::{display_path, resolve_in_root};
use crate::{clip, optional_usize, required_str};

const DEFAULT_MAX_RESULTS: usize = 100;
const MAX_LINE_CHARS: usize = 200;

pub struct SearchTool;

#[async_trait]
impl Tool for SearchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Search
    }

    fn description(&self) -> &str {
        "Search file contents with a regular expression. Returns matching lines as path:line: text. Respects .gitignore."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "pattern": {
                    "type": "string",
                    "description": "Regular expression to search for"
                },
                "path": {
                    "type": "string",
                    "description": "Directory or file to search, relative to the project root (default: root)"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of matching lines to return (default 100)"
                }
            },
            "required": ["pattern"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let pattern = required_str(&arguments, "pattern")?;
        let regex = Regex::new(pattern)
            .map_err(|e| ToolError::InvalidArguments(format!("Invalid pattern: {e}")))?;
        let start = resolve_in_root(context.root(), arguments["path"].as_str().unwrap_or("."))?;
        let max_results = optional_usize(&arguments, "max_results")
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_RESULTS);

        let root = context.root().to_path_buf();
        let (matches, truncated) =
            tokio::task::spawn_blocking(move || search_tree(&root, &start, &regex, max_results))
                .await
                .map_err(|e| ToolError::ExecutionFailed {
                    tool_name: "search".into(),
                    reason: e.to_string(),
                })?;

        debug!(pattern = %pattern, matches = matches.len(), "Search finished");

        let title = format!("Search {}", clip(pattern, 60));
        if matches.is_empty() {
            return Ok(ToolResult::ok(title, format!("No matches for '{pattern}'")));
        }

        let mut output = matches.join("\n");
        if truncated {
            output.push_str(&format!("\n[results truncated at {max_results}]"));
        }
        Ok(ToolResult::ok(title, output))
    }
}

/// Walk `start` and collect up to `max` matching lines. Unreadable or
/// non-UTF-8 files are skipped.
fn search_tree(root: &Path, start: &Path, regex: &Regex, max: usize) -> (Vec<String>, bool) {
    let mut matches = Vec::new();

    let walker = WalkBuilder::new(start)
        .require_git(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .build();

    for entry in walker.flatten() {
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let Ok(content) = std::fs::read_to_string(entry.path()) else {
            continue;
        };
        let shown = display_path(root, entry.path());
        for (index, line) in content.lines().enumerate() {
            if !regex.is_match(line) {
                continue;
            }
            if matches.len() == max {
                return (matches, true);
            }
            let text: String = line.trim().chars().take(MAX_LINE_CHARS).collect();
            matches.push(format!("{shown}:{}: {text}", index + 1));
        }
    }

    (matches, false)
}

//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what give the model the ability to act on the project:
//! read/write/edit files, run shell commands, search the tree.
//!
//! The set of capabilities is closed: every tool has a [`ToolKind`], and the
//! [`ToolRegistry`] is a table from kind to implementation built once at
//! startup.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// The identifiers of every capability the orchestrator knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Read,
    Write,
    Edit,
    Shell,
    Search,
    List,
}

impl ToolKind {
    /// The default set enabled when a task does not name its tools.
    pub const ALL: [ToolKind; 6] = [
        ToolKind::Read,
        ToolKind::Write,
        ToolKind::Edit,
        ToolKind::Shell,
        ToolKind::Search,
        ToolKind::List,
    ];

    /// Wire name of this tool.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Edit => "edit",
            Self::Shell => "shell",
            Self::Search => "search",
            Self::List => "list",
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tool identifier: {0}")]
pub struct UnknownToolKind(pub String);

impl FromStr for ToolKind {
    type Err = UnknownToolKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownToolKind(s.to_string()))
    }
}

/// The only environment information a tool receives from the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolContext {
    /// Root of the project sandbox; relative paths resolve against it.
    pub project_root: PathBuf,
}

impl ToolContext {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.project_root
    }
}

/// The result of a tool execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Text appended verbatim as the tool message content
    pub output: String,

    /// Short human-readable label for progress display
    pub title: String,

    /// Whether the tool reports a failure the model should see
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    pub fn ok(title: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            title: title.into(),
            is_error: false,
        }
    }

    pub fn error(title: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            title: title.into(),
            is_error: true,
        }
    }
}

/// The core Tool trait.
///
/// Each built-in tool implements this trait and is registered in the
/// [`ToolRegistry`] under its kind.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Which capability this tool provides.
    fn kind(&self) -> ToolKind;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given argument object.
    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> std::result::Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the model.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.kind().as_str().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A table of available tools, keyed by kind.
///
/// The orchestration loop uses this to:
/// 1. Get the definitions of the tools enabled for a task
/// 2. Look up and execute tools when the model requests them
pub struct ToolRegistry {
    tools: HashMap<ToolKind, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool of the same kind.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.kind(), tool);
    }

    /// Get a tool by kind.
    pub fn get(&self, kind: ToolKind) -> Option<&dyn Tool> {
        self.tools.get(&kind).map(|t| t.as_ref())
    }

    /// Definitions for exactly the given kinds, in the given order.
    ///
    /// Duplicates collapse to their first occurrence and kinds without a
    /// registered tool are skipped, so the same input always yields the same
    /// output.
    pub fn specs_for(&self, kinds: &[ToolKind]) -> Vec<ToolDefinition> {
        let mut seen = Vec::with_capacity(kinds.len());
        kinds
            .iter()
            .filter(|kind| {
                if seen.contains(*kind) {
                    false
                } else {
                    seen.push(**kind);
                    true
                }
            })
            .filter_map(|kind| self.get(*kind).map(|t| t.to_definition()))
            .collect()
    }

    /// Execute a tool by wire name.
    pub async fn execute(
        &self,
        name: &str,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> std::result::Result<ToolResult, ToolError> {
        let Some(tool) = name
            .parse::<ToolKind>()
            .ok()
            .and_then(|kind| self.tools.get(&kind))
        else {
            warn!(tool = %name, "Tool not registered");
            return Err(ToolError::NotFound(name.to_string()));
        };
        tool.execute(arguments, context).await
    }

    /// All registered kinds, in declaration order.
    pub fn kinds(&self) -> Vec<ToolKind> {
        let mut kinds: Vec<_> = self.tools.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

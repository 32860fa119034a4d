//! Shell tool — run a command in the project root.
//!
//! Supports command allowlisting and a per-command timeout.

use std::time::Duration;

use async_trait::async_trait;
use codeloop_core::error::ToolError;
use codeloop_core::tool::{Tool, ToolContext, ToolKind, ToolResult};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{clip, optional_usize, required_str};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Execute shell commands with safety constraints.
pub struct ShellTool {
    /// If non-empty, only these commands are allowed.
    allowed_commands: Vec<String>,
    timeout: Duration,
}

impl ShellTool {
    pub fn new(allowed_commands: Vec<String>, timeout: Duration) -> Self {
        Self {
            allowed_commands,
            timeout,
        }
    }

    /// With an allowlist set, only a single allowlisted command without
    /// shell operators may run.
    fn is_command_allowed(&self, command: &str) -> bool {
        if self.allowed_commands.is_empty() {
            return true;
        }
        if has_shell_operator(command) {
            return false;
        }

        let base_cmd = command.split_whitespace().next().unwrap_or("");
        self.allowed_commands.iter().any(|a| a == base_cmd)
    }

    /// A per-call `timeout_secs` may shorten the configured limit, never extend it.
    fn effective_timeout(&self, arguments: &serde_json::Value) -> Duration {
        match optional_usize(arguments, "timeout_secs") {
            Some(secs) if secs > 0 => self.timeout.min(Duration::from_secs(secs as u64)),
            _ => self.timeout,
        }
    }
}

fn has_shell_operator(command: &str) -> bool {
    command.contains("$(")
        || command
            .chars()
            .any(|c| matches!(c, ';' | '&' | '|' | '`' | '<' | '>' | '\n' | '\r'))
}

impl Default for ShellTool {
    fn default() -> Self {
        Self::new(Vec::new(), DEFAULT_TIMEOUT)
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Shell
    }

    fn description(&self) -> &str {
        "Execute a shell command in the project root and return stdout/stderr. Use this for builds, tests, git and other programs."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "command": {
                    "type": "string",
                    "description": "The shell command to execute"
                },
                "timeout_secs": {
                    "type": "integer",
                    "description": "Seconds before the command is killed (cannot exceed the configured limit)"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let command = required_str(&arguments, "command")?;
        let timeout = self.effective_timeout(&arguments);

        if !self.is_command_allowed(command) {
            return Err(ToolError::PermissionDenied {
                tool_name: "shell".into(),
                reason: if has_shell_operator(command) {
                    "Shell operators are not allowed with a command allowlist".into()
                } else {
                    format!(
                        "Command '{}' not in allowlist",
                        command.split_whitespace().next().unwrap_or("")
                    )
                },
            });
        }

        debug!(command = %command, root = %context.root().display(), "Executing shell command");

        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };
        cmd.current_dir(context.root()).kill_on_drop(true);

        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ToolError::ExecutionFailed {
                    tool_name: "shell".into(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                warn!(command = %command, "Command timed out");
                return Err(ToolError::Timeout {
                    tool_name: "shell".into(),
                    timeout_secs: timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let success = output.status.success();

        let text = if success {
            if stderr.is_empty() {
                stdout.into_owned()
            } else {
                format!("{stdout}\n[stderr]: {stderr}")
            }
        } else {
            let code = output.status.code().unwrap_or(-1);
            warn!(command = %command, exit_code = code, "Command failed");
            format!("[exit code: {code}]\n{stdout}\n{stderr}")
        };

        let title = format!("$ {}", clip(command, 60));
        let text = text.trim().to_string();
        Ok(if success {
            ToolResult::ok(title, text)
        } else {
            ToolResult::error(title, text)
        })
    }
}

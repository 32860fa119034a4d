//! Batch driver — run independent tasks from a JSON file, one after another.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use codeloop_core::message::{MessageToolCall, Session};
use codeloop_core::tool::{ToolKind, ToolResult};
use serde::Deserialize;
use tracing::{debug, info};

use crate::loop_runner::{AgentLoop, CompletionMode, LoopObserver};

/// Characters of the answer shown under a passing task.
const PREVIEW_CHARS: usize = 200;

/// A batch file: `{"version": "...", "tasks": [...]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchFile {
    pub version: String,
    pub tasks: Vec<BatchTask>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchTask {
    pub name: String,
    pub prompt: String,

    /// Tools enabled for this task; all tools when absent.
    #[serde(default)]
    pub tools: Option<Vec<ToolKind>>,
}

impl BatchTask {
    pub fn enabled_tools(&self) -> &[ToolKind] {
        self.tools.as_deref().unwrap_or(&ToolKind::ALL)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("failed to read batch file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed batch file: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl BatchFile {
    /// Load and validate a batch file from disk.
    pub fn load(path: &Path) -> Result<Self, BatchError> {
        let content = std::fs::read_to_string(path).map_err(|source| BatchError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse batch JSON. Unknown tool identifiers and missing fields are errors.
    pub fn parse(json: &str) -> Result<Self, BatchError> {
        let batch: BatchFile = serde_json::from_str(json)?;
        debug!(version = %batch.version, tasks = batch.tasks.len(), "Batch file parsed");
        Ok(batch)
    }
}

/// Pass/fail counts for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub passed: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Writes one progress line per tool call.
struct ProgressLines<'a, W: Write> {
    out: &'a mut W,
    error: Option<io::Error>,
}

impl<W: Write> ProgressLines<'_, W> {
    fn write_line(&mut self, line: std::fmt::Arguments<'_>) {
        if self.error.is_none()
            && let Err(e) = writeln!(self.out, "{line}")
        {
            self.error = Some(e);
        }
    }
}

impl<W: Write> LoopObserver for ProgressLines<'_, W> {
    fn on_tool_result(&mut self, call: &MessageToolCall, result: &ToolResult) {
        let suffix = if result.is_error { " (error)" } else { "" };
        self.write_line(format_args!("  -> {}: {}{suffix}", call.name, result.title));
    }
}

/// Run every task in order, each in a fresh session, and print progress.
///
/// A failing task is counted and the batch continues. Only write errors
/// on `out` abort the batch.
pub async fn run_batch<W: Write>(
    agent: &AgentLoop,
    batch: &BatchFile,
    system_prompt: &str,
    out: &mut W,
) -> io::Result<BatchSummary> {
    let total = batch.tasks.len();
    let mut summary = BatchSummary::default();
    info!(tasks = total, "Batch starting");

    for (index, task) in batch.tasks.iter().enumerate() {
        writeln!(out, "[{}/{total}] {}", index + 1, task.name)?;

        let mut session = Session::seeded(system_prompt, &task.prompt);
        let mut progress = ProgressLines {
            out: &mut *out,
            error: None,
        };
        let report = agent
            .run(
                &mut session,
                task.enabled_tools(),
                CompletionMode::Buffered,
                &mut progress,
            )
            .await;
        if let Some(e) = progress.error {
            return Err(e);
        }

        match report.answer() {
            Some(answer) => {
                summary.passed += 1;
                writeln!(out, "  {}", preview(answer))?;
            }
            None => {
                summary.failed += 1;
                if let Some(e) = report.error() {
                    writeln!(out, "  FAILED: {e}")?;
                }
            }
        }
        info!(task = %task.name, success = report.is_success(), rounds = report.rounds, "Task finished");
    }

    writeln!(out, "{} passed, {} failed", summary.passed, summary.failed)?;
    out.flush()?;
    Ok(summary)
}

/// First characters of `answer` on one line.
fn preview(answer: &str) -> String {
    let flat = answer.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.is_empty() {
        return "(empty answer)".into();
    }
    let mut shown: String = flat.chars().take(PREVIEW_CHARS).collect();
    if flat.chars().count() > PREVIEW_CHARS {
        shown.push_str("...");
    }
    shown
}

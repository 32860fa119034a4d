//! Streaming driver — one task from standard input, output echoed as it arrives.

use std::io::{self, Read, Write};

use codeloop_core::message::{MessageToolCall, Session};
use codeloop_core::tool::{ToolKind, ToolResult};

use crate::loop_runner::{AgentLoop, CompletionMode, LoopObserver, TaskReport};

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("no prompt given on standard input")]
    Empty,

    #[error("failed to read standard input: {0}")]
    Read(#[from] io::Error),
}

/// Read the whole of `reader` as the task prompt, trimmed.
pub fn read_prompt<R: Read>(mut reader: R) -> Result<String, InputError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    let prompt = input.trim();
    if prompt.is_empty() {
        return Err(InputError::Empty);
    }
    Ok(prompt.to_string())
}

/// Fragments to `out` (flushed each time), tool progress to `err`.
struct Echo<'a, O: Write, E: Write> {
    out: &'a mut O,
    err: &'a mut E,
    wrote_text: bool,
    /// Text was written in an earlier round; separate the next round's text.
    round_break: bool,
    error: Option<io::Error>,
}

impl<O: Write, E: Write> Echo<'_, O, E> {
    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result
            && self.error.is_none()
        {
            self.error = Some(e);
        }
    }
}

impl<O: Write, E: Write> LoopObserver for Echo<'_, O, E> {
    fn on_fragment(&mut self, text: &str) {
        let separator = if std::mem::take(&mut self.round_break) {
            "\n"
        } else {
            ""
        };
        self.wrote_text = true;
        let result = self
            .out
            .write_all(separator.as_bytes())
            .and_then(|()| self.out.write_all(text.as_bytes()))
            .and_then(|()| self.out.flush());
        self.record(result);
    }

    fn on_tool_result(&mut self, call: &MessageToolCall, result: &ToolResult) {
        self.round_break |= self.wrote_text;
        let suffix = if result.is_error { " (error)" } else { "" };
        let line = writeln!(self.err, "  -> {}: {}{suffix}", call.name, result.title);
        self.record(line);
    }
}

/// Run `prompt` as a single streamed task.
///
/// On failure `error: <message>` is written to `err`; the report tells the
/// caller how the task ended.
pub async fn run_stream<O: Write, E: Write>(
    agent: &AgentLoop,
    prompt: &str,
    enabled: &[ToolKind],
    system_prompt: &str,
    out: &mut O,
    err: &mut E,
) -> io::Result<TaskReport> {
    let mut session = Session::seeded(system_prompt, prompt);
    let mut echo = Echo {
        out: &mut *out,
        err: &mut *err,
        wrote_text: false,
        round_break: false,
        error: None,
    };

    let report = agent
        .run(&mut session, enabled, CompletionMode::Streaming, &mut echo)
        .await;

    let Echo {
        wrote_text, error, ..
    } = echo;
    if let Some(e) = error {
        return Err(e);
    }
    if wrote_text {
        writeln!(out)?;
        out.flush()?;
    }
    if let Some(e) = report.error() {
        writeln!(err, "error: {e}")?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::sync::Arc;

    #[test]
    fn prompt_is_trimmed() {
        assert_eq!(read_prompt(&b"  fix the bug \n"[..]).unwrap(), "fix the bug");
    }

    #[test]
    fn empty_input_rejected() {
        assert!(matches!(read_prompt(&b""[..]), Err(InputError::Empty)));
        assert!(matches!(read_prompt(&b" \n\t"[..]), Err(InputError::Empty)));
    }

    #[tokio::test]
    async fn answer_streams_to_out() {
        let project = tempfile::tempdir().unwrap();
        std::fs::write(project.path().join("a.txt"), "alpha").unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_response(vec![tool_call("c1", "read", r#"{"path":"a.txt"}"#)]),
            text_response("It says alpha."),
        ]));
        let agent = agent_for(provider, project.path());

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let report = run_stream(
            &agent,
            "what is in a.txt?",
            &ToolKind::ALL,
            "system",
            &mut out,
            &mut err,
        )
        .await
        .unwrap();

        assert!(report.is_success());
        assert_eq!(String::from_utf8(out).unwrap(), "It says alpha.\n");
        assert_eq!(String::from_utf8(err).unwrap(), "  -> read: Read a.txt\n");
    }

    #[tokio::test]
    async fn text_from_separate_rounds_is_on_separate_lines() {
        let project = tempfile::tempdir().unwrap();
        std::fs::write(project.path().join("a.txt"), "alpha").unwrap();
        let mut first = tool_call_response(vec![tool_call("c1", "read", r#"{"path":"a.txt"}"#)]);
        first.message.content = Some("I'll read it.".into());
        let provider = Arc::new(ScriptedProvider::new(vec![
            first,
            tool_call_response(vec![tool_call("c2", "list", "{}")]),
            text_response("It says alpha."),
        ]));
        let agent = agent_for(provider, project.path());

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let report = run_stream(
            &agent,
            "what is in a.txt?",
            &ToolKind::ALL,
            "system",
            &mut out,
            &mut err,
        )
        .await
        .unwrap();

        assert!(report.is_success());
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "I'll read it.\nIt says alpha.\n"
        );
    }

    #[tokio::test]
    async fn failure_goes_to_err() {
        let project = tempfile::tempdir().unwrap();
        let agent = agent_for(Arc::new(TruncatedStreamProvider), project.path());

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let report = run_stream(
            &agent,
            "hi",
            &ToolKind::ALL,
            "system",
            &mut out,
            &mut err,
        )
        .await
        .unwrap();

        assert!(!report.is_success());
        assert_eq!(String::from_utf8(out).unwrap(), "partial\n");
        let err = String::from_utf8(err).unwrap();
        assert!(err.starts_with("error: completion failed: Stream interrupted"));
    }
}

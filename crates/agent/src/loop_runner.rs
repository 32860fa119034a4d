//! The orchestration loop.
//!
//! One call to [`AgentLoop::run`] drives a single task's [`Session`] through
//! the tool-calling protocol:
//!
//! ```text
//! AwaitingCompletion --no tool calls--> Done
//!        |    ^
//!  tool calls  \__ every call answered, in order
//!        v    /
//!   ExecutingTools
//! ```
//!
//! Any state moves to `Failed` on a completion error, a protocol violation,
//! or when the iteration budget runs out. The loop never returns an error;
//! the outcome is reported in a [`TaskReport`].

use std::sync::Arc;
use std::time::Duration;

use codeloop_config::AppConfig;
use codeloop_core::error::{ProviderError, ToolError};
use codeloop_core::message::{Message, MessageToolCall, Session};
use codeloop_core::provider::{Provider, ProviderRequest, ToolDefinition};
use codeloop_core::tool::{ToolContext, ToolKind, ToolRegistry, ToolResult};
use tracing::{debug, info, warn};

use crate::arguments::lenient_arguments;
use crate::protocol::{self, ProtocolViolation};
use crate::stream::{RoundReply, aggregate_round};

/// Default maximum completion round trips per task.
pub const DEFAULT_MAX_ITERATIONS: u32 = 20;

/// Tool message content used when a tool produced no output.
pub const EMPTY_OUTPUT: &str = "(no output)";

/// How completions are fetched from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    /// One `complete` call per round.
    Buffered,
    /// One `stream` call per round, fragments echoed to the observer.
    Streaming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    AwaitingCompletion,
    ExecutingTools,
    Done,
    Failed,
}

/// A state entered during a given round (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub round: u32,
    pub state: LoopState,
}

#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("completion failed: {0}")]
    Completion(#[from] ProviderError),

    #[error("iteration budget exhausted after {max} round trips")]
    IterationBudgetExceeded { max: u32 },

    #[error("protocol violation: {0}")]
    ProtocolViolation(#[from] ProtocolViolation),
}

#[derive(Debug)]
pub enum TaskOutcome {
    Completed { answer: String },
    Failed(TaskError),
}

/// What happened while running one task.
#[derive(Debug)]
pub struct TaskReport {
    pub outcome: TaskOutcome,
    /// Completion round trips issued.
    pub rounds: u32,
    /// Tool calls executed, successful or not.
    pub tool_calls: usize,
    pub transitions: Vec<Transition>,
}

impl TaskReport {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TaskOutcome::Completed { .. })
    }

    pub fn answer(&self) -> Option<&str> {
        match &self.outcome {
            TaskOutcome::Completed { answer } => Some(answer),
            TaskOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&TaskError> {
        match &self.outcome {
            TaskOutcome::Failed(e) => Some(e),
            TaskOutcome::Completed { .. } => None,
        }
    }

    /// Number of times `state` was entered.
    pub fn count(&self, state: LoopState) -> usize {
        self.transitions.iter().filter(|t| t.state == state).count()
    }
}

/// Receives progress from a running loop, synchronously and in order.
pub trait LoopObserver {
    /// A streamed text fragment. Only called in streaming mode.
    fn on_fragment(&mut self, _text: &str) {}

    /// A tool call finished; called once per call, in call order.
    fn on_tool_result(&mut self, _call: &MessageToolCall, _result: &ToolResult) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl LoopObserver for NoopObserver {}

/// Running bookkeeping for one task.
struct Progress {
    rounds: u32,
    tool_calls: usize,
    transitions: Vec<Transition>,
}

impl Progress {
    fn enter(&mut self, round: u32, state: LoopState) {
        debug!(round, state = ?state, "Loop transition");
        self.transitions.push(Transition { round, state });
    }

    fn finish(mut self, outcome: TaskOutcome) -> TaskReport {
        let terminal = match outcome {
            TaskOutcome::Completed { .. } => LoopState::Done,
            TaskOutcome::Failed(_) => LoopState::Failed,
        };
        self.enter(self.rounds, terminal);
        TaskReport {
            outcome,
            rounds: self.rounds,
            tool_calls: self.tool_calls,
            transitions: self.transitions,
        }
    }
}

/// The orchestration loop: provider, tools and limits shared by every task.
pub struct AgentLoop {
    /// The completion endpoint
    provider: Arc<dyn Provider>,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// Passed to every tool execution
    context: ToolContext,

    model: String,
    temperature: f32,
    max_tokens: Option<u32>,

    /// Maximum completion round trips per task
    max_iterations: u32,

    /// Optional bound on each completion call and each stream pull
    round_timeout: Option<Duration>,
}

impl AgentLoop {
    /// Create a new loop with default limits.
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
        context: ToolContext,
    ) -> Self {
        Self {
            provider,
            tools,
            context,
            model: model.into(),
            temperature: 0.2,
            max_tokens: None,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            round_timeout: None,
        }
    }

    /// Create a loop using the model and limits from `config`.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        config: &AppConfig,
        context: ToolContext,
    ) -> Self {
        let mut agent = Self::new(provider, tools, &config.model, context)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens)
            .with_max_iterations(config.max_iterations);
        if let Some(secs) = config.round_timeout_secs {
            agent = agent.with_round_timeout(Duration::from_secs(secs));
        }
        agent
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the default max tokens per response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    /// Set the maximum number of completion round trips per task.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_round_timeout(mut self, timeout: Duration) -> Self {
        self.round_timeout = Some(timeout);
        self
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Run one task to completion, failure or budget exhaustion.
    ///
    /// `session` must already hold the system and user messages. Only the
    /// tools in `enabled` are offered to the model and executable.
    pub async fn run(
        &self,
        session: &mut Session,
        enabled: &[ToolKind],
        mode: CompletionMode,
        observer: &mut dyn LoopObserver,
    ) -> TaskReport {
        let specs = self.tools.specs_for(enabled);
        let mut progress = Progress {
            rounds: 0,
            tool_calls: 0,
            transitions: Vec::new(),
        };

        info!(
            session_id = %session.id,
            model = %self.model,
            mode = ?mode,
            tools = specs.len(),
            max_iterations = self.max_iterations,
            "Task starting"
        );

        for round in 1..=self.max_iterations {
            progress.rounds = round;
            progress.enter(round, LoopState::AwaitingCompletion);

            if let Err(violation) = protocol::check_tool_replies(session.messages()) {
                warn!(session_id = %session.id, error = %violation, "Protocol violation");
                return progress.finish(TaskOutcome::Failed(violation.into()));
            }

            let request = self.request(session, &specs, mode);
            let reply = match self.complete_round(request, mode, observer).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(session_id = %session.id, round, error = %e, "Completion failed");
                    return progress.finish(TaskOutcome::Failed(e.into()));
                }
            };

            debug!(
                round,
                total_tokens = reply.usage.map(|u| u.total_tokens),
                estimated_tokens = session.estimated_tokens(),
                "Round usage"
            );

            if reply.tool_calls.is_empty() {
                let answer = reply.content.unwrap_or_default();
                session.push(Message::assistant(answer.clone()));
                info!(
                    session_id = %session.id,
                    rounds = round,
                    tool_calls = progress.tool_calls,
                    "Task completed"
                );
                return progress.finish(TaskOutcome::Completed { answer });
            }

            progress.enter(round, LoopState::ExecutingTools);
            debug!(round, count = reply.tool_calls.len(), "Executing tool calls");

            let calls = reply.tool_calls.clone();
            session.push(Message::assistant_tool_calls(
                reply.content,
                reply.tool_calls,
            ));

            for call in &calls {
                let result = self.execute_call(call, enabled).await;
                progress.tool_calls += 1;
                observer.on_tool_result(call, &result);
                session.push(Message::tool_result(&call.id, result.output));
            }
        }

        warn!(
            session_id = %session.id,
            max_iterations = self.max_iterations,
            "Iteration budget exhausted"
        );
        progress.finish(TaskOutcome::Failed(TaskError::IterationBudgetExceeded {
            max: self.max_iterations,
        }))
    }

    fn request(
        &self,
        session: &Session,
        specs: &[ToolDefinition],
        mode: CompletionMode,
    ) -> ProviderRequest {
        ProviderRequest {
            model: self.model.clone(),
            messages: session.messages().to_vec(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tools: specs.to_vec(),
            stream: mode == CompletionMode::Streaming,
        }
    }

    async fn complete_round(
        &self,
        request: ProviderRequest,
        mode: CompletionMode,
        observer: &mut dyn LoopObserver,
    ) -> Result<RoundReply, ProviderError> {
        match mode {
            CompletionMode::Buffered => {
                let response = self.bounded(self.provider.complete(request)).await?;
                Ok(RoundReply {
                    content: response.message.content,
                    tool_calls: response.message.tool_calls,
                    usage: response.usage,
                })
            }
            CompletionMode::Streaming => {
                let rx = self.bounded(self.provider.stream(request)).await?;
                aggregate_round(rx, observer, self.round_timeout).await
            }
        }
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, ProviderError> {
        match self.round_timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                ProviderError::Timeout(format!("no response within {}s", limit.as_secs_f32()))
            })?,
            None => fut.await,
        }
    }

    /// Execute one call. Failures become an error result whose output is
    /// `Error: <message>`; the output is never empty.
    async fn execute_call(&self, call: &MessageToolCall, enabled: &[ToolKind]) -> ToolResult {
        let outcome = match call.name.parse::<ToolKind>() {
            Ok(kind) if enabled.contains(&kind) => {
                let arguments = lenient_arguments(&call.name, &call.arguments);
                debug!(tool = %call.name, id = %call.id, "Executing tool");
                self.tools
                    .execute(&call.name, arguments, &self.context)
                    .await
            }
            Ok(_) => Err(ToolError::NotEnabled(call.name.clone())),
            Err(_) => Err(ToolError::NotFound(call.name.clone())),
        };

        match outcome {
            Ok(mut result) => {
                if result.output.is_empty() {
                    result.output = EMPTY_OUTPUT.to_string();
                }
                result
            }
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Tool execution failed");
                ToolResult::error(e.to_string(), format!("Error: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use codeloop_core::message::Role;

    fn session() -> Session {
        Session::seeded("You are a coding assistant.", "hi")
    }

    #[derive(Default)]
    struct Recorder {
        fragments: Vec<String>,
        tools: Vec<(String, String, bool)>,
    }

    impl LoopObserver for Recorder {
        fn on_fragment(&mut self, text: &str) {
            self.fragments.push(text.to_string());
        }

        fn on_tool_result(&mut self, call: &MessageToolCall, result: &ToolResult) {
            self.tools
                .push((call.name.clone(), result.title.clone(), result.is_error));
        }
    }

    #[tokio::test]
    async fn simple_text_response() {
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("hello")]));
        let project = tempfile::tempdir().unwrap();
        let agent = agent_for(provider.clone(), project.path());

        let mut session = session();
        let report = agent
            .run(
                &mut session,
                &ToolKind::ALL,
                CompletionMode::Buffered,
                &mut NoopObserver,
            )
            .await;

        assert_eq!(report.answer(), Some("hello"));
        assert_eq!(report.rounds, 1);
        assert_eq!(provider.call_count(), 1);
        // System + User + Assistant
        assert_eq!(session.len(), 3);
        assert_eq!(
            report.transitions,
            vec![
                Transition { round: 1, state: LoopState::AwaitingCompletion },
                Transition { round: 1, state: LoopState::Done },
            ]
        );
    }

    #[tokio::test]
    async fn read_call_then_answer() {
        let project = tempfile::tempdir().unwrap();
        std::fs::write(project.path().join("a.txt"), "alpha").unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_response(vec![tool_call("call_1", "read", r#"{"path":"a.txt"}"#)]),
            text_response("the file says alpha"),
        ]));
        let agent = agent_for(provider.clone(), project.path());

        let mut session = session();
        let report = agent
            .run(
                &mut session,
                &ToolKind::ALL,
                CompletionMode::Buffered,
                &mut NoopObserver,
            )
            .await;

        assert!(report.is_success());
        assert_eq!(report.count(LoopState::ExecutingTools), 1);
        assert_eq!(
            report.transitions.last(),
            Some(&Transition { round: 2, state: LoopState::Done })
        );

        let tool_messages: Vec<_> = session
            .messages()
            .iter()
            .filter(|m| m.role == Role::Tool)
            .collect();
        assert_eq!(tool_messages.len(), 1);
        assert_eq!(tool_messages[0].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool_messages[0].text(), "alpha");

        // The second request carries the tool reply.
        let requests = provider.requests();
        assert_eq!(requests[1].messages.len(), 4);
        assert_eq!(requests[1].messages[3].role, Role::Tool);
    }

    #[tokio::test]
    async fn calls_answered_in_order() {
        let project = tempfile::tempdir().unwrap();
        std::fs::write(project.path().join("a.txt"), "A").unwrap();
        std::fs::write(project.path().join("b.txt"), "B").unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_response(vec![
                tool_call("c1", "read", r#"{"path":"b.txt"}"#),
                tool_call("c2", "read", r#"{"path":"a.txt"}"#),
                tool_call("c3", "list", "{}"),
            ]),
            text_response("done"),
        ]));
        let agent = agent_for(provider, project.path());

        let mut session = session();
        let mut recorder = Recorder::default();
        let report = agent
            .run(
                &mut session,
                &ToolKind::ALL,
                CompletionMode::Buffered,
                &mut recorder,
            )
            .await;
        assert!(report.is_success());
        assert_eq!(report.tool_calls, 3);

        let messages = session.messages();
        let assistant = &messages[2];
        assert_eq!(assistant.tool_calls.len(), 3);
        for (offset, call) in assistant.tool_calls.iter().enumerate() {
            let reply = &messages[3 + offset];
            assert_eq!(reply.role, Role::Tool);
            assert_eq!(reply.tool_call_id.as_deref(), Some(call.id.as_str()));
        }
        assert_eq!(messages[3].text(), "B");
        assert_eq!(messages[4].text(), "A");

        let titles: Vec<_> = recorder.tools.iter().map(|t| t.1.as_str()).collect();
        assert_eq!(titles, ["Read b.txt", "Read a.txt", "List ."]);
    }

    #[tokio::test]
    async fn malformed_arguments_still_produce_one_reply() {
        let project = tempfile::tempdir().unwrap();
        std::fs::write(project.path().join("x.txt"), "").unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_response(vec![tool_call("bad", "list", "{not json")]),
            text_response("ok"),
        ]));
        let agent = agent_for(provider.clone(), project.path());

        let mut session = session();
        let report = agent
            .run(
                &mut session,
                &ToolKind::ALL,
                CompletionMode::Buffered,
                &mut NoopObserver,
            )
            .await;

        assert!(report.is_success());
        assert_eq!(provider.call_count(), 2);
        let replies: Vec<_> = session
            .messages()
            .iter()
            .filter(|m| m.role == Role::Tool)
            .collect();
        assert_eq!(replies.len(), 1);
        // Executed with an empty mapping: list defaults to the root.
        assert_eq!(replies[0].text(), "x.txt");
    }

    #[tokio::test]
    async fn failing_tool_does_not_stop_later_calls() {
        let project = tempfile::tempdir().unwrap();
        std::fs::write(project.path().join("ok.txt"), "fine").unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_response(vec![
                tool_call("c1", "read", "{}"),
                tool_call("c2", "nonexistent", "{}"),
                tool_call("c3", "read", r#"{"path":"ok.txt"}"#),
            ]),
            text_response("recovered"),
        ]));
        let agent = agent_for(provider, project.path());

        let mut session = session();
        let mut recorder = Recorder::default();
        let report = agent
            .run(
                &mut session,
                &ToolKind::ALL,
                CompletionMode::Buffered,
                &mut recorder,
            )
            .await;

        assert_eq!(report.answer(), Some("recovered"));
        let replies: Vec<_> = session
            .messages()
            .iter()
            .filter(|m| m.role == Role::Tool)
            .map(|m| m.text().to_string())
            .collect();
        assert_eq!(replies.len(), 3);
        assert!(replies[0].starts_with("Error: Invalid tool arguments"));
        assert_eq!(replies[1], "Error: Tool not found: nonexistent");
        assert_eq!(replies[2], "fine");
        let flags: Vec<_> = recorder.tools.iter().map(|t| t.2).collect();
        assert_eq!(flags, [true, true, false]);
    }

    #[tokio::test]
    async fn disabled_tool_is_reported_not_executed() {
        let project = tempfile::tempdir().unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_response(vec![tool_call(
                "w1",
                "write",
                r#"{"path":"x.txt","content":"x"}"#,
            )]),
            text_response("ok"),
        ]));
        let agent = agent_for(provider.clone(), project.path());

        let mut session = session();
        let report = agent
            .run(
                &mut session,
                &[ToolKind::Read],
                CompletionMode::Buffered,
                &mut NoopObserver,
            )
            .await;

        assert!(report.is_success());
        assert!(!project.path().join("x.txt").exists());
        assert_eq!(
            session.messages()[3].text(),
            "Error: tool 'write' is not enabled for this task"
        );
        // Only the enabled tool was offered.
        let offered: Vec<_> = provider.requests()[0]
            .tools
            .iter()
            .map(|t| t.name.clone())
            .collect();
        assert_eq!(offered, ["read"]);
    }

    #[tokio::test]
    async fn empty_tool_output_gets_placeholder() {
        let project = tempfile::tempdir().unwrap();
        std::fs::write(project.path().join("empty.txt"), "").unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![
            tool_call_response(vec![tool_call("e", "read", r#"{"path":"empty.txt"}"#)]),
            text_response("ok"),
        ]));
        let agent = agent_for(provider, project.path());

        let mut session = session();
        agent
            .run(
                &mut session,
                &ToolKind::ALL,
                CompletionMode::Buffered,
                &mut NoopObserver,
            )
            .await;
        assert_eq!(session.messages()[3].text(), EMPTY_OUTPUT);
    }

    #[tokio::test]
    async fn streaming_budget_is_enforced() {
        let project = tempfile::tempdir().unwrap();
        let provider = Arc::new(ScriptedProvider::repeating(tool_call_response(vec![
            tool_call("loop", "list", "{}"),
        ])));
        let agent = agent_for(provider.clone(), project.path());

        let mut session = session();
        let report = agent
            .run(
                &mut session,
                &ToolKind::ALL,
                CompletionMode::Streaming,
                &mut NoopObserver,
            )
            .await;

        assert_eq!(provider.call_count(), DEFAULT_MAX_ITERATIONS as usize);
        assert_eq!(report.rounds, DEFAULT_MAX_ITERATIONS);
        assert!(matches!(
            report.error(),
            Some(TaskError::IterationBudgetExceeded { max: 20 })
        ));
        assert_eq!(report.transitions.last().unwrap().state, LoopState::Failed);
    }

    #[tokio::test]
    async fn buffered_budget_is_configurable() {
        let project = tempfile::tempdir().unwrap();
        let provider = Arc::new(ScriptedProvider::repeating(tool_call_response(vec![
            tool_call("loop", "list", "{}"),
        ])));
        let agent = agent_for(provider.clone(), project.path()).with_max_iterations(3);

        let mut session = session();
        let report = agent
            .run(
                &mut session,
                &ToolKind::ALL,
                CompletionMode::Buffered,
                &mut NoopObserver,
            )
            .await;

        assert_eq!(provider.call_count(), 3);
        assert!(matches!(
            report.error(),
            Some(TaskError::IterationBudgetExceeded { max: 3 })
        ));
    }

    #[tokio::test]
    async fn streaming_echoes_fragments() {
        let project = tempfile::tempdir().unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("streamed")]));
        let agent = agent_for(provider.clone(), project.path());

        let mut session = session();
        let mut recorder = Recorder::default();
        let report = agent
            .run(
                &mut session,
                &ToolKind::ALL,
                CompletionMode::Streaming,
                &mut recorder,
            )
            .await;

        assert_eq!(report.answer(), Some("streamed"));
        assert_eq!(recorder.fragments, ["streamed"]);
        assert!(provider.requests()[0].stream);
    }

    #[tokio::test]
    async fn stream_closed_before_final_fails_task() {
        let project = tempfile::tempdir().unwrap();
        let agent = agent_for(Arc::new(TruncatedStreamProvider), project.path());

        let mut session = session();
        let report = agent
            .run(
                &mut session,
                &ToolKind::ALL,
                CompletionMode::Streaming,
                &mut NoopObserver,
            )
            .await;

        assert!(matches!(
            report.error(),
            Some(TaskError::Completion(ProviderError::StreamInterrupted(_)))
        ));
        assert_eq!(report.count(LoopState::ExecutingTools), 0);
    }

    #[tokio::test]
    async fn provider_error_fails_task() {
        let project = tempfile::tempdir().unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![]));
        let agent = agent_for(provider, project.path());

        let mut session = session();
        let report = agent
            .run(
                &mut session,
                &ToolKind::ALL,
                CompletionMode::Buffered,
                &mut NoopObserver,
            )
            .await;
        assert!(matches!(report.error(), Some(TaskError::Completion(_))));
        assert_eq!(session.len(), 2);
    }

    #[tokio::test]
    async fn dangling_history_is_a_protocol_violation() {
        let project = tempfile::tempdir().unwrap();
        let provider = Arc::new(ScriptedProvider::new(vec![text_response("never")]));
        let agent = agent_for(provider.clone(), project.path());

        let mut session = session();
        session.push(Message::tool_result("ghost", "orphan"));
        let report = agent
            .run(
                &mut session,
                &ToolKind::ALL,
                CompletionMode::Buffered,
                &mut NoopObserver,
            )
            .await;

        assert!(matches!(report.error(), Some(TaskError::ProtocolViolation(_))));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn round_timeout_fails_slow_completion() {
        let project = tempfile::tempdir().unwrap();
        let agent = agent_for(Arc::new(StalledProvider), project.path())
            .with_round_timeout(Duration::from_secs(2));

        let mut session = session();
        let report = agent
            .run(
                &mut session,
                &ToolKind::ALL,
                CompletionMode::Buffered,
                &mut NoopObserver,
            )
            .await;
        assert!(matches!(
            report.error(),
            Some(TaskError::Completion(ProviderError::Timeout(_)))
        ));
    }

    #[test]
    fn from_config_applies_limits() {
        let config = AppConfig {
            max_iterations: 7,
            ..AppConfig::default()
        };
        let agent = AgentLoop::from_config(
            Arc::new(ScriptedProvider::new(vec![])),
            Arc::new(ToolRegistry::new()),
            &config,
            ToolContext::new("."),
        );
        assert_eq!(agent.max_iterations(), 7);
        assert_eq!(agent.model, config.model);
        assert_eq!(agent.max_tokens, Some(config.max_tokens));
    }
}

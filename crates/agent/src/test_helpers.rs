//! Shared test helpers for loop and driver tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};

use codeloop_core::error::ProviderError;
use codeloop_core::message::{Message, MessageToolCall};
use codeloop_core::provider::{
    Provider, ProviderRequest, ProviderResponse, StreamEvent, StreamReceiver, Usage,
};
use codeloop_core::tool::ToolContext;
use tokio::sync::mpsc;

use crate::loop_runner::AgentLoop;

/// A mock provider that returns a sequence of scripted responses.
///
/// Each call to `complete` returns the next response in the queue, or the
/// repeating response once the queue is empty. With neither, the call fails.
/// Streaming uses the trait's default replay of `complete`.
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<ProviderResponse>>,
    repeat: Option<ProviderResponse>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A provider that returns `response` on every call.
    pub fn repeating(response: ProviderResponse) -> Self {
        Self {
            repeat: Some(response),
            ..Self::new(vec![])
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let next = self.responses.lock().unwrap().pop_front();
        next.or_else(|| self.repeat.clone())
            .ok_or_else(|| ProviderError::ApiError {
                status_code: 500,
                message: "script exhausted".into(),
            })
    }
}

/// Streams one fragment, then drops the channel without a final event.
pub struct TruncatedStreamProvider;

#[async_trait::async_trait]
impl Provider for TruncatedStreamProvider {
    fn name(&self) -> &str {
        "truncated"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Ok(text_response("unused"))
    }

    async fn stream(&self, _request: ProviderRequest) -> Result<StreamReceiver, ProviderError> {
        let (tx, rx) = mpsc::channel(4);
        let _ = tx.send(Ok(StreamEvent::Fragment("partial".into()))).await;
        Ok(rx)
    }
}

/// Never answers.
pub struct StalledProvider;

#[async_trait::async_trait]
impl Provider for StalledProvider {
    fn name(&self) -> &str {
        "stalled"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        std::future::pending().await
    }
}

fn usage() -> Option<Usage> {
    Some(Usage {
        prompt_tokens: 10,
        completion_tokens: 5,
        total_tokens: 15,
    })
}

/// Create a simple text response (no tool calls).
pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: usage(),
        model: "mock-model".into(),
    }
}

/// Create a response that only requests tool calls.
pub fn tool_call_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant_tool_calls(None, tool_calls),
        usage: usage(),
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call with raw argument text.
pub fn tool_call(id: &str, name: &str, arguments: &str) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: arguments.into(),
    }
}

/// A loop over the built-in tools, sandboxed to `root`.
pub fn agent_for(provider: Arc<dyn Provider>, root: &Path) -> AgentLoop {
    AgentLoop::new(
        provider,
        Arc::new(codeloop_tools::default_registry()),
        "mock-model",
        ToolContext::new(root),
    )
}

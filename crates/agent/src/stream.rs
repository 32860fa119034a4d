//! Streaming delta aggregation.
//!
//! A streaming round is a channel of [`StreamEvent`]s: fragments echoed to
//! the observer as they arrive, then one `Final` carrying the tool calls.

use std::time::Duration;

use codeloop_core::error::ProviderError;
use codeloop_core::message::MessageToolCall;
use codeloop_core::provider::{StreamEvent, StreamReceiver, Usage};
use tracing::{debug, trace};

use crate::loop_runner::LoopObserver;

/// The assistant turn produced by one completion round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundReply {
    pub content: Option<String>,
    pub tool_calls: Vec<MessageToolCall>,
    pub usage: Option<Usage>,
}

/// Consume one streamed round until its `Final` event.
///
/// Each fragment is forwarded to `observer` before the next pull. The
/// accumulated fragments become the content; if none arrived, the final
/// event's content is used and echoed once. A channel that closes before
/// `Final` is a [`ProviderError::StreamInterrupted`]. `pull_timeout` bounds
/// each individual pull.
pub async fn aggregate_round(
    mut rx: StreamReceiver,
    observer: &mut dyn LoopObserver,
    pull_timeout: Option<Duration>,
) -> Result<RoundReply, ProviderError> {
    let mut buffer = String::new();
    let mut fragments = 0usize;

    loop {
        let event = match pull_timeout {
            Some(limit) => tokio::time::timeout(limit, rx.recv()).await.map_err(|_| {
                ProviderError::Timeout(format!("no stream event within {}s", limit.as_secs_f32()))
            })?,
            None => rx.recv().await,
        };

        match event {
            Some(Ok(StreamEvent::Fragment(text))) => {
                trace!(len = text.len(), "Stream fragment");
                fragments += 1;
                observer.on_fragment(&text);
                buffer.push_str(&text);
            }
            Some(Ok(StreamEvent::Final {
                content,
                tool_calls,
                usage,
            })) => {
                debug!(
                    fragments,
                    tool_calls = tool_calls.len(),
                    "Stream round finished"
                );
                let content = if buffer.is_empty() {
                    let content = content.filter(|c| !c.is_empty());
                    if let Some(text) = &content {
                        observer.on_fragment(text);
                    }
                    content
                } else {
                    Some(buffer)
                };
                return Ok(RoundReply {
                    content,
                    tool_calls,
                    usage,
                });
            }
            Some(Err(e)) => return Err(e),
            None => {
                return Err(ProviderError::StreamInterrupted(format!(
                    "stream closed after {fragments} fragment(s) without a final event"
                )));
            }
        }
    }
}

//! Tool-call / tool-reply pairing check.
//!
//! Every tool call on an assistant message must be answered by exactly one
//! tool message, in the same order, immediately after it. The loop runs
//! [`check_tool_replies`] before each completion request.

use codeloop_core::message::{Message, Role};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolViolation {
    #[error("tool call '{id}' has no reply")]
    MissingReply { id: String },

    #[error("tool reply for '{found}' where a reply to '{expected}' was expected")]
    OutOfOrder { expected: String, found: String },

    #[error("tool message at position {index} does not answer a preceding tool call")]
    DanglingReply { index: usize },
}

/// Verify the pairing invariant over a whole message sequence.
pub fn check_tool_replies(messages: &[Message]) -> Result<(), ProtocolViolation> {
    let mut index = 0;
    while index < messages.len() {
        let message = &messages[index];
        match message.role {
            Role::Tool => return Err(ProtocolViolation::DanglingReply { index }),
            Role::Assistant if message.has_tool_calls() => {
                for call in &message.tool_calls {
                    index += 1;
                    match messages.get(index) {
                        Some(reply) if reply.role == Role::Tool => {
                            let found = reply.tool_call_id.as_deref().unwrap_or_default();
                            if found != call.id {
                                return Err(ProtocolViolation::OutOfOrder {
                                    expected: call.id.clone(),
                                    found: found.to_string(),
                                });
                            }
                        }
                        _ => {
                            return Err(ProtocolViolation::MissingReply {
                                id: call.id.clone(),
                            });
                        }
                    }
                }
            }
            Role::Assistant | Role::System | Role::User => {}
        }
        index += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeloop_core::message::MessageToolCall;

    fn call(id: &str) -> MessageToolCall {
        MessageToolCall {
            id: id.into(),
            name: "read".into(),
            arguments: "{}".into(),
        }
    }

    fn calls(ids: &[&str]) -> Message {
        Message::assistant_tool_calls(None, ids.iter().map(|id| call(id)).collect())
    }

    #[test]
    fn plain_conversation_is_valid() {
        let messages = vec![
            Message::system("sys"),
            Message::user("hi"),
            Message::assistant("hello"),
        ];
        assert_eq!(check_tool_replies(&messages), Ok(()));
    }

    #[test]
    fn replies_in_order_are_valid() {
        let messages = vec![
            Message::user("hi"),
            calls(&["a", "b"]),
            Message::tool_result("a", "1"),
            Message::tool_result("b", "2"),
            Message::assistant("done"),
        ];
        assert_eq!(check_tool_replies(&messages), Ok(()));
    }

    #[test]
    fn missing_reply_detected() {
        let messages = vec![
            Message::user("hi"),
            calls(&["a", "b"]),
            Message::tool_result("a", "1"),
        ];
        assert_eq!(
            check_tool_replies(&messages),
            Err(ProtocolViolation::MissingReply { id: "b".into() })
        );
    }

    #[test]
    fn out_of_order_reply_detected() {
        let messages = vec![
            calls(&["a", "b"]),
            Message::tool_result("b", "2"),
            Message::tool_result("a", "1"),
        ];
        assert_eq!(
            check_tool_replies(&messages),
            Err(ProtocolViolation::OutOfOrder {
                expected: "a".into(),
                found: "b".into()
            })
        );
    }

    #[test]
    fn extra_tool_message_is_dangling() {
        let messages = vec![
            calls(&["a"]),
            Message::tool_result("a", "1"),
            Message::tool_result("a", "again"),
        ];
        assert_eq!(
            check_tool_replies(&messages),
            Err(ProtocolViolation::DanglingReply { index: 2 })
        );
    }
}

//! The orchestration loop — the heart of codeloop.
//!
//! The loop follows a **Complete → Execute → Fold back** cycle:
//!
//! 1. **Send** the session and the enabled tool specs to the provider
//! 2. **If tool calls**: execute them in order, append one reply per call, loop
//! 3. **If text**: that is the task's answer
//!
//! The loop continues until the model answers without tool calls, or the
//! iteration budget runs out. The batch and streaming drivers in [`drivers`]
//! share the loop unchanged.

pub mod arguments;
pub mod drivers;
pub mod loop_runner;
pub mod protocol;
pub mod stream;

#[cfg(test)]
mod test_helpers;

pub use arguments::{ArgumentError, lenient_arguments, parse_arguments};
pub use loop_runner::{
    AgentLoop, CompletionMode, LoopObserver, LoopState, NoopObserver, TaskError, TaskOutcome,
    TaskReport, Transition,
};
pub use protocol::{ProtocolViolation, check_tool_replies};
pub use stream::{RoundReply, aggregate_round};

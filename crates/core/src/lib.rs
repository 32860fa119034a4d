//! # codeloop core
//!
//! Domain types, traits, and error definitions for the codeloop
//! tool-calling orchestrator. This crate has no framework dependencies:
//! it defines the conversation model and the two collaborator contracts
//! (completion client and tool registry) that every other crate
//! implements against.
//!
//! ## Design Philosophy
//!
//! Collaborators are traits here, implementations live in their own crates:
//! - `Provider` is implemented in `codeloop-providers`
//! - `Tool` is implemented in `codeloop-tools`
//! - the orchestration loop in `codeloop-agent` only sees these traits,
//!   which keeps it testable with scripted mocks

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{ProviderError, ToolError};
pub use message::{Message, MessageToolCall, Role, Session, SessionId};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StreamEvent, ToolDefinition, Usage};
pub use tool::{Tool, ToolContext, ToolKind, ToolRegistry, ToolResult};

//! Completion endpoint clients for codeloop.
//!
//! All clients implement the `codeloop_core::Provider` trait.
//! [`build_from_config`] picks and configures the client for a run.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::build_from_config;

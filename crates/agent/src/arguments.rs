//! Tool-call argument parsing.
//!
//! Arguments arrive from the model as raw text that is supposed to be a JSON
//! object. [`parse_arguments`] is the strict parser; [`lenient_arguments`] is
//! the policy the loop applies, substituting an empty object on failure.

use serde_json::{Map, Value};
use tracing::warn;

#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
    #[error("arguments are not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("arguments must be a JSON object, got {0}")]
    NotAnObject(&'static str),
}

/// Parse raw argument text into a JSON object.
///
/// Blank text is treated as an empty object; models commonly send `""` for
/// tools without parameters.
pub fn parse_arguments(raw: &str) -> Result<Map<String, Value>, ArgumentError> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        other => Err(ArgumentError::NotAnObject(kind_of(&other))),
    }
}

/// Parse arguments for `tool`, falling back to an empty object.
pub fn lenient_arguments(tool: &str, raw: &str) -> Value {
    match parse_arguments(raw) {
        Ok(map) => Value::Object(map),
        Err(e) => {
            warn!(tool = %tool, error = %e, "Malformed tool arguments, using empty object");
            Value::Object(Map::new())
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

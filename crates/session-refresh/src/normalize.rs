//! Terminal error normalization
//!
//! Backend rejections arrive with whatever body the backend chose to send.
//! Callers get a uniform shape instead: a human-readable message plus the
//! status and raw payload for anyone who needs more.

use serde_json::Value;
use transport::TransportFailure;

use crate::error::Error;

/// Message used when the payload offers nothing better.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// A backend rejection in caller-facing form.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct NormalizedError {
    pub message: String,
    pub status: Option<u16>,
    pub payload: Option<Value>,
}

/// Convert a terminal transport failure into the caller-facing error.
///
/// Failures carrying a backend payload become `Error::Backend`, with the
/// message taken from the payload's `detail` field, then its `message` field,
/// then `DEFAULT_ERROR_MESSAGE`. Failures without a payload pass through
/// unchanged as `Error::Transport`.
pub fn normalize(failure: TransportFailure) -> Error {
    match failure {
        TransportFailure::Status {
            status,
            payload: Some(payload),
        } => Error::Backend(NormalizedError {
            message: payload_message(&payload),
            status: Some(status),
            payload: Some(payload),
        }),
        other => Error::Transport(other),
    }
}

fn payload_message(payload: &Value) -> String {
    ["detail", "message"]
        .iter()
        .find_map(|field| payload.get(field).and_then(field_text))
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string())
}

/// Text of a payload field. Falsy values (null, `false`, zero, empty string)
/// don't count; structured values (e.g. validation error lists) are rendered
/// as JSON.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

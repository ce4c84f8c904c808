//! Transport failure types

use serde_json::Value;

/// Why a request did not produce a 2xx response.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportFailure {
    /// The backend answered with a non-2xx status.
    ///
    /// `payload` is the response body parsed as JSON, a JSON string when the
    /// body is not JSON, or `None` when the body is empty.
    #[error("request failed with status code {status}")]
    Status { status: u16, payload: Option<Value> },

    /// No response was received (connection refused, timeout, reset).
    #[error("network error: {0}")]
    Network(String),

    /// The request could not be built or sent (bad URL, bad header).
    #[error("request error: {0}")]
    Request(String),
}

impl TransportFailure {
    /// HTTP status, when the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportFailure::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Backend payload, when the backend answered with a body.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            TransportFailure::Status { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }
}

/// Result alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportFailure>;

//! Caller-facing error type

use serde_json::Value;
use transport::TransportFailure;

use crate::normalize::NormalizedError;

/// Terminal errors returned to callers of `SessionClient`.
///
/// `Clone` so a single refresh failure can be handed to every waiting caller.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The backend rejected the request with a payload
    #[error("{0}")]
    Backend(NormalizedError),

    /// No usable backend payload (network failure, request construction)
    #[error(transparent)]
    Transport(#[from] TransportFailure),

    /// The refresh leader went away before the refresh settled
    #[error("token refresh abandoned before it settled")]
    RefreshAbandoned,
}

impl Error {
    /// HTTP status, when the backend answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Backend(normalized) => normalized.status,
            Error::Transport(failure) => failure.status(),
            Error::RefreshAbandoned => None,
        }
    }

    /// Raw backend payload, when there was one.
    pub fn payload(&self) -> Option<&Value> {
        match self {
            Error::Backend(normalized) => normalized.payload.as_ref(),
            Error::Transport(failure) => failure.payload(),
            Error::RefreshAbandoned => None,
        }
    }
}

/// Result alias for session client operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Failure classification for session recovery
//!
//! Only a 401 from the backend marks a session as expired. Everything else is
//! either a network-level failure (no response at all) or an ordinary error
//! that is surfaced to the caller as-is.

use crate::failure::TransportFailure;

/// HTTP status the backend uses for an expired or missing session.
pub const AUTH_EXPIRED_STATUS: u16 = 401;

/// Classification of a transport failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The backend reported that authentication is required
    AuthExpired,
    /// No response was received
    NetworkError,
    /// Any other status, or a local request construction failure
    OtherError,
}

impl ErrorClass {
    /// Label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorClass::AuthExpired => "auth_expired",
            ErrorClass::NetworkError => "network",
            ErrorClass::OtherError => "other",
        }
    }
}

/// Classify a transport failure.
pub fn classify(failure: &TransportFailure) -> ErrorClass {
    match failure {
        TransportFailure::Status { status, .. } if *status == AUTH_EXPIRED_STATUS => {
            ErrorClass::AuthExpired
        }
        TransportFailure::Status { .. } => ErrorClass::OtherError,
        TransportFailure::Network(_) => ErrorClass::NetworkError,
        TransportFailure::Request(_) => ErrorClass::OtherError,
    }
}

//! Session recovery policy
//!
//! Decides whether a failed request should go through the refresh
//! coordinator. Recovery is only attempted for an expired session, never for
//! the refresh or login endpoints themselves (a failed refresh would loop, a
//! failed login is a bad password rather than an expired session), and at
//! most once per request.

use session::{DEFAULT_LOGIN_PATH, DEFAULT_REFRESH_PATH};
use transport::{ErrorClass, OriginalRequest};

/// Endpoints excluded from recovery.
#[derive(Debug, Clone)]
pub struct RecoveryPolicy {
    refresh_path: String,
    login_path: String,
}

impl RecoveryPolicy {
    pub fn new(refresh_path: impl Into<String>, login_path: impl Into<String>) -> Self {
        Self {
            refresh_path: refresh_path.into(),
            login_path: login_path.into(),
        }
    }

    pub fn refresh_path(&self) -> &str {
        &self.refresh_path
    }

    /// True only for an expired session on a first attempt against a
    /// non-auth endpoint.
    ///
    /// Endpoint matching is by substring so absolute URLs and query strings
    /// are excluded too.
    pub fn should_attempt_recovery(&self, request: &OriginalRequest, class: ErrorClass) -> bool {
        class == ErrorClass::AuthExpired
            && !request.url().contains(&self.refresh_path)
            && !request.url().contains(&self.login_path)
            && !request.is_retry()
    }
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_PATH, DEFAULT_LOGIN_PATH)
    }
}

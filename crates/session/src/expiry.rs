//! Session-expired recovery
//!
//! Runs once per failed refresh cycle, from the cycle's leader only. Records
//! where the user was and sends them to the login route. While the user is
//! already on the login route this is a no-op: no second navigation, and the
//! stored redirect target is left alone so it still points at the page the
//! user originally came from.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::constants::DEFAULT_LOGIN_ROUTE;
use crate::navigator::{Navigator, RedirectMemory};

/// What `handle_refresh_failure` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpiryAction {
    /// The user was sent to the login route from `from`
    Redirected { from: String },
    /// The user was already on the login route
    AlreadyOnLogin,
}

/// Navigation side effect for a failed token refresh.
pub struct SessionExpiry {
    navigator: Arc<dyn Navigator>,
    memory: Arc<dyn RedirectMemory>,
    login_route: String,
}

impl SessionExpiry {
    pub fn new(
        navigator: Arc<dyn Navigator>,
        memory: Arc<dyn RedirectMemory>,
        login_route: impl Into<String>,
    ) -> Self {
        Self {
            navigator,
            memory,
            login_route: login_route.into(),
        }
    }

    /// Uses the default `/login` route.
    pub fn with_default_route(
        navigator: Arc<dyn Navigator>,
        memory: Arc<dyn RedirectMemory>,
    ) -> Self {
        Self::new(navigator, memory, DEFAULT_LOGIN_ROUTE)
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Remember the current location and redirect to login.
    ///
    /// A failure to persist the location is logged and does not block the
    /// redirect.
    pub async fn handle_refresh_failure(&self) -> ExpiryAction {
        let current = self.navigator.current_path();
        if current == self.login_route {
            debug!(path = %current, "already on login route, skipping redirect");
            return ExpiryAction::AlreadyOnLogin;
        }

        if let Err(e) = self.memory.store(&current).await {
            warn!(path = %current, error = %e, "failed to persist redirect target");
        }

        warn!(from = %current, to = %self.login_route, "token refresh failed, redirecting to login");
        self.navigator.redirect_to(&self.login_route);
        ExpiryAction::Redirected { from: current }
    }
}

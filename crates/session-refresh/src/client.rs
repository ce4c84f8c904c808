//! Session-recovering client
//!
//! Sends requests through the transport and, when one fails because the
//! session expired, routes it through the refresh coordinator and replays it
//! once. Everything that is not recovered is normalized and returned.

use std::sync::Arc;

use tracing::{debug, error, instrument};
use transport::{
    Method, OriginalRequest, RequestDescriptor, Response, Transport, TransportFailure, classify,
};

use crate::coordinator::RefreshCoordinator;
use crate::error::Result;
use crate::metrics;
use crate::normalize::normalize;
use crate::policy::RecoveryPolicy;

/// HTTP client that transparently recovers from expired sessions.
///
/// Cheap to clone. Clones share the transport and the coordinator, so
/// concurrent requests from any clone join the same refresh.
#[derive(Clone)]
pub struct SessionClient {
    transport: Arc<dyn Transport>,
    coordinator: Arc<RefreshCoordinator>,
    policy: RecoveryPolicy,
}

impl SessionClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        coordinator: Arc<RefreshCoordinator>,
        policy: RecoveryPolicy,
    ) -> Self {
        Self {
            transport,
            coordinator,
            policy,
        }
    }

    pub fn coordinator(&self) -> &RefreshCoordinator {
        &self.coordinator
    }

    pub async fn get(&self, url: &str) -> Result<Response> {
        self.execute(RequestDescriptor::get(url)).await
    }

    pub async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<Response> {
        self.execute(RequestDescriptor::post(url).with_json(body)).await
    }

    /// Send a request, recovering once from an expired session.
    ///
    /// On an expired session the request waits for the shared refresh and is
    /// replayed exactly once if it succeeds. The replay's own result is
    /// returned as-is (a second 401 is terminal). If the refresh fails, the
    /// refresh error is returned.
    #[instrument(skip_all, fields(method = %request.method, url = %request.url))]
    pub async fn execute(&self, request: RequestDescriptor) -> Result<Response> {
        let mut original = OriginalRequest::new(request);
        loop {
            log_request(&original);
            let failure = match self.transport.execute(original.descriptor()).await {
                Ok(response) => {
                    log_response(&original, &response);
                    return Ok(response);
                }
                Err(failure) => failure,
            };
            log_failure(&original, &failure);

            let class = classify(&failure);
            if !self.policy.should_attempt_recovery(&original, class) {
                metrics::record_terminal_error(class);
                return Err(normalize(failure));
            }

            original = original.into_retry();
            self.coordinator
                .await_refresh(self.transport.as_ref())
                .await?;
            metrics::record_replay();
            debug!("replaying request after session refresh");
        }
    }
}

/// Preflight requests are noise; everything else is logged at debug.
fn is_logged(original: &OriginalRequest) -> bool {
    original.descriptor().method != Method::OPTIONS
}

fn log_request(original: &OriginalRequest) {
    if is_logged(original) {
        debug!(retry = original.is_retry(), "sending request");
    }
}

fn log_response(original: &OriginalRequest, response: &Response) {
    if is_logged(original) {
        debug!(status = response.status, "request succeeded");
    }
}

fn log_failure(original: &OriginalRequest, failure: &TransportFailure) {
    let retry = original.is_retry();
    match failure {
        TransportFailure::Status { status, .. } => {
            error!(status, retry, "request rejected by backend")
        }
        TransportFailure::Network(msg) => error!(error = %msg, retry, "network error (no response)"),
        TransportFailure::Request(msg) => error!(error = %msg, retry, "request error"),
    }
}

//! Single-flight refresh coordinator
//!
//! Owns the session state: whether a refresh is in flight and who is waiting
//! on it. The first caller to arrive while idle becomes the leader and issues
//! the one refresh call; callers arriving while it runs become followers and
//! park in the pending queue. When the refresh settles the leader returns the
//! coordinator to idle and drains the queue with the shared outcome.
//!
//! Transitions:
//! - Idle → Refreshing (first recoverable failure, caller leads)
//! - Refreshing → Refreshing (further failures, callers queue)
//! - Refreshing → Idle (refresh settles or the leader is dropped; queue drained)

use std::sync::{Mutex, MutexGuard};

use session::SessionExpiry;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use transport::{RequestDescriptor, Transport};

use crate::error::Error;
use crate::metrics;
use crate::normalize::normalize;
use crate::queue::{PendingEntry, PendingQueue, RefreshOutcome};

/// Mutable state behind the coordinator's lock.
///
/// Invariant: `refreshing == false` implies `queue` is empty.
#[derive(Debug, Default)]
struct SessionState {
    refreshing: bool,
    queue: PendingQueue,
}

enum Role {
    Leader,
    Follower(oneshot::Receiver<RefreshOutcome>),
}

/// Coordinates token refreshes so at most one is in flight.
///
/// The state lock is a `std::sync::Mutex` that is never held across an await,
/// so check-and-transition is a single critical section on any runtime flavor.
pub struct RefreshCoordinator {
    state: Mutex<SessionState>,
    refresh_request: RequestDescriptor,
    expiry: Option<SessionExpiry>,
}

impl RefreshCoordinator {
    /// Coordinator that refreshes by POSTing to `refresh_url` with no body.
    ///
    /// `expiry` runs after a failed refresh; `None` skips navigation entirely.
    pub fn new(refresh_url: impl Into<String>, expiry: Option<SessionExpiry>) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            refresh_request: RequestDescriptor::post(refresh_url),
            expiry,
        }
    }

    /// Whether a refresh call is outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    /// Number of callers parked behind the current refresh.
    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// Wait for a refresh to settle, leading one if none is in flight.
    ///
    /// Every caller that joins the same cycle gets the same outcome. Exactly
    /// one refresh call is made per cycle.
    pub async fn await_refresh(&self, transport: &dyn Transport) -> RefreshOutcome {
        match self.join() {
            Role::Leader => self.lead(transport).await,
            Role::Follower(rx) => rx.await.unwrap_or(Err(Error::RefreshAbandoned)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Atomically decide this caller's role.
    fn join(&self) -> Role {
        let mut state = self.lock();
        debug_assert!(state.refreshing || state.queue.is_empty());

        if state.refreshing {
            let (entry, rx) = PendingEntry::new();
            state.queue.push(entry);
            metrics::record_queued();
            debug!(queued = state.queue.len(), "refresh in flight, queueing request");
            Role::Follower(rx)
        } else {
            state.refreshing = true;
            Role::Leader
        }
    }

    async fn lead(&self, transport: &dyn Transport) -> RefreshOutcome {
        let guard = SettleGuard {
            coordinator: self,
            settled: false,
        };

        info!(url = %self.refresh_request.url, "session expired, refreshing token");
        let outcome = match transport.execute(&self.refresh_request).await {
            Ok(response) => {
                info!(status = response.status, "token refresh succeeded");
                metrics::record_refresh("success");
                Ok(())
            }
            Err(failure) => {
                warn!(error = %failure, "token refresh failed");
                metrics::record_refresh("failure");
                Err(normalize(failure))
            }
        };
        guard.settle(&outcome);

        if outcome.is_err() {
            if let Some(expiry) = &self.expiry {
                expiry.handle_refresh_failure().await;
            }
        }
        outcome
    }

    /// Return to idle and hand `outcome` to every queued caller.
    fn settle(&self, outcome: &RefreshOutcome) {
        let queue = {
            let mut state = self.lock();
            state.refreshing = false;
            std::mem::take(&mut state.queue)
        };
        let waiting = queue.len();
        let delivered = queue.drain(outcome);
        debug!(waiting, delivered, ok = outcome.is_ok(), "refresh settled, queue drained");
    }
}

/// Settles the cycle even if the leader's future is dropped mid-refresh, so
/// followers never wait on a refresh nobody is driving.
struct SettleGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl SettleGuard<'_> {
    fn settle(mut self, outcome: &RefreshOutcome) {
        self.settled = true;
        self.coordinator.settle(outcome);
    }
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("refresh leader dropped before the refresh settled");
            metrics::record_refresh("abandoned");
            self.coordinator.settle(&Err(Error::RefreshAbandoned));
        }
    }
}

//! Pending-request queue
//!
//! Callers that hit an expired session while a refresh is already running are
//! parked here. Each `PendingEntry` owns the sending half of a oneshot channel;
//! the caller awaits the receiving half. Draining publishes one outcome to
//! every entry in arrival order.

use tokio::sync::oneshot;
use tracing::debug;

use crate::error::Error;

/// Result of one refresh attempt, shared by every caller waiting on it.
pub type RefreshOutcome = std::result::Result<(), Error>;

/// Completion handle for one suspended caller.
#[derive(Debug)]
pub struct PendingEntry {
    tx: oneshot::Sender<RefreshOutcome>,
}

impl PendingEntry {
    /// Create an entry and the receiver its caller waits on.
    pub fn new() -> (Self, oneshot::Receiver<RefreshOutcome>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Wake the caller to replay its request. Returns false if it went away.
    pub fn succeed(self) -> bool {
        self.tx.send(Ok(())).is_ok()
    }

    /// Wake the caller with the refresh failure. Returns false if it went away.
    pub fn fail(self, cause: Error) -> bool {
        self.tx.send(Err(cause)).is_ok()
    }
}

/// FIFO of suspended callers.
#[derive(Debug, Default)]
pub struct PendingQueue {
    entries: Vec<PendingEntry>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: PendingEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every entry, oldest first, with `outcome`.
    ///
    /// Returns the number of callers that were still waiting.
    pub fn drain(self, outcome: &RefreshOutcome) -> usize {
        let total = self.entries.len();
        let mut delivered = 0usize;
        for entry in self.entries {
            let waiting = match outcome {
                Ok(()) => entry.succeed(),
                Err(cause) => entry.fail(cause.clone()),
            };
            if waiting {
                delivered += 1;
            }
        }
        if delivered < total {
            debug!(
                total,
                dropped = total - delivered,
                "some queued callers went away before the refresh settled"
            );
        }
        delivered
    }
}

//! Single-flight session refresh for HTTP clients
//!
//! Wraps a `Transport` so that requests failing with an expired session are
//! recovered transparently. However many requests hit a 401 at once, exactly
//! one refresh call is made; the rest wait for its outcome and are then
//! replayed (on success) or failed with the same cause (on failure).
//!
//! Request lifecycle:
//! 1. `SessionClient::execute` sends the request through the transport
//! 2. On failure, `classify` + `RecoveryPolicy` decide whether to recover
//! 3. The first recoverable caller leads a refresh; later ones queue behind it
//! 4. Refresh settles → coordinator drains the queue with the shared outcome
//! 5. Success: each caller replays its request once, marked as retried
//! 6. Failure: each caller gets the refresh error; the leader redirects to login
//! 7. Terminal failures are normalized before reaching the caller

pub mod client;
pub mod coordinator;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod policy;
pub mod queue;

#[cfg(test)]
mod testing;

pub use client::SessionClient;
pub use coordinator::RefreshCoordinator;
pub use error::{Error, Result};
pub use normalize::{DEFAULT_ERROR_MESSAGE, NormalizedError, normalize};
pub use policy::RecoveryPolicy;
pub use queue::{PendingEntry, PendingQueue, RefreshOutcome};

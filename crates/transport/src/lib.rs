//! Transport abstraction for outbound HTTP requests
//!
//! Defines the `Transport` trait the session-recovery layer calls through, the
//! request/response value types it exchanges, and the failure taxonomy the
//! recovery policy classifies. `ReqwestTransport` is the production
//! implementation; tests substitute scripted transports.

pub mod classify;
pub mod descriptor;
pub mod failure;
pub mod http;

pub use classify::{ErrorClass, classify};
pub use descriptor::{OriginalRequest, RequestDescriptor, Response};
pub use failure::{Result, TransportFailure};
pub use http::{DEFAULT_TIMEOUT, HeaderInjection, ReqwestTransport};
pub use reqwest::Method;

use std::future::Future;
use std::pin::Pin;

/// Executes request descriptors against the backend.
///
/// Any response outside the 2xx range is reported as
/// `TransportFailure::Status`, so callers only ever see successful responses
/// in the `Ok` branch. Timeouts, connection handling and serialization are the
/// implementation's concern.
///
/// Uses `Pin<Box<dyn Future>>` return types for dyn-compatibility (`Arc<dyn Transport>`).
pub trait Transport: Send + Sync {
    /// Send a request and wait for its response.
    fn execute<'a>(
        &'a self,
        request: &'a RequestDescriptor,
    ) -> Pin<Box<dyn Future<Output = Result<Response>> + Send + 'a>>;
}

//! reqwest-backed transport
//!
//! Resolves relative URLs against a configured base URL, applies the default
//! header set to every request, keeps a cookie jar so session cookies set by
//! the refresh endpoint are sent on replays, and folds non-2xx responses into
//! `TransportFailure::Status` with the body preserved as the payload.

use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::descriptor::{RequestDescriptor, Response};
use crate::failure::{Result, TransportFailure};
use crate::Transport;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Extra default header (name + value pair from config).
#[derive(Debug, Clone, Deserialize)]
pub struct HeaderInjection {
    pub name: String,
    pub value: String,
}

/// Transport over a shared `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
    headers: HeaderMap,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Build a transport with its own cookie-enabled client.
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        extra_headers: &[HeaderInjection],
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| TransportFailure::Request(format!("building HTTP client: {e}")))?;
        Ok(Self::with_client(client, base_url, timeout, extra_headers))
    }

    /// Build a transport around an existing client.
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        timeout: Duration,
        extra_headers: &[HeaderInjection],
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            headers: default_headers(extra_headers),
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: &RequestDescriptor) -> Result<Response> {
        let url = common::join_url(&self.base_url, &request.url);
        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(self.headers.clone())
            .headers(request.headers.clone())
            .timeout(self.timeout);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(failure_from_reqwest)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await;

        // The backend answered, so a non-2xx stays a status failure even when
        // its body is cut off.
        if !status.is_success() {
            let payload = match &body {
                Ok(body) => parse_payload(body),
                Err(e) => {
                    warn!(status = status.as_u16(), error = %e, "error response body unreadable");
                    None
                }
            };
            return Err(TransportFailure::Status {
                status: status.as_u16(),
                payload,
            });
        }

        let body =
            body.map_err(|e| TransportFailure::Network(format!("reading response body: {e}")))?;

        Ok(Response {
            status: status.as_u16(),
            headers,
            body,
        })
    }
}

impl Transport for ReqwestTransport {
    fn execute<'a>(
        &'a self,
        request: &'a RequestDescriptor,
    ) -> Pin<Box<dyn Future<Output = Result<Response>> + Send + 'a>> {
        Box::pin(self.send(request))
    }
}

/// JSON defaults plus the configured extras. Invalid entries are skipped.
fn default_headers(extra: &[HeaderInjection]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        HeaderName::from_static("x-requested-with"),
        HeaderValue::from_static("XMLHttpRequest"),
    );

    for injection in extra {
        let name = match HeaderName::from_str(&injection.name) {
            Ok(n) => n,
            Err(e) => {
                warn!(header = %injection.name, error = %e, "skipping invalid header name");
                continue;
            }
        };
        let value = match HeaderValue::from_str(&injection.value) {
            Ok(v) => v,
            Err(e) => {
                warn!(header = %injection.name, error = %e, "skipping invalid header value");
                continue;
            }
        };
        headers.insert(name, value);
    }
    headers
}

fn failure_from_reqwest(err: reqwest::Error) -> TransportFailure {
    if err.is_builder() {
        TransportFailure::Request(err.to_string())
    } else {
        TransportFailure::Network(err.to_string())
    }
}

/// Parse an error body: JSON when possible, otherwise the raw text.
fn parse_payload(body: &Bytes) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(String::from_utf8_lossy(body).into_owned())),
    }
}

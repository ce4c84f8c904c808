//! Request and response value types
//!
//! A `RequestDescriptor` is an immutable snapshot of everything needed to send
//! a request again later. `OriginalRequest` pairs it with the retry marker the
//! recovery policy consults, so replaying a request never mutates the
//! descriptor itself.

use std::sync::Arc;

use bytes::Bytes;
use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

/// Everything needed to (re-)issue a request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    /// Absolute URL, or a path resolved against the transport's base URL
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    /// Add or replace a header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a raw body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach a JSON body and set `Content-Type: application/json`.
    pub fn with_json(self, body: &serde_json::Value) -> Self {
        self.with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(body.to_string())
    }
}

/// A request as first issued by a caller, plus whether it has already been
/// replayed after a session refresh.
///
/// The descriptor is shared behind an `Arc`; marking a retry produces a new
/// `OriginalRequest` and leaves the descriptor untouched.
#[derive(Debug, Clone)]
pub struct OriginalRequest {
    descriptor: Arc<RequestDescriptor>,
    retried: bool,
}

impl OriginalRequest {
    pub fn new(descriptor: RequestDescriptor) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
            retried: false,
        }
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    pub fn url(&self) -> &str {
        &self.descriptor.url
    }

    /// Whether this request has already been through one recovery cycle.
    pub fn is_retry(&self) -> bool {
        self.retried
    }

    /// The same request, marked as replayed after recovery.
    pub fn into_retry(self) -> Self {
        Self {
            descriptor: self.descriptor,
            retried: true,
        }
    }
}

/// A successful (2xx) response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

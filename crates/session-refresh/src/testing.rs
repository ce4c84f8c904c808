//! Scripted in-memory transport for coordinator and client tests.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{Notify, Semaphore};
use transport::{RequestDescriptor, Response, Transport, TransportFailure};

/// How a non-refresh URL responds.
#[derive(Debug, Clone)]
pub(crate) enum Behavior {
    /// 401 on the first call, 200 afterwards
    ExpireOnce,
    /// 401 on every call
    AlwaysExpire,
    /// The given failure on every call
    Fail(TransportFailure),
}

fn ok_response(body: serde_json::Value) -> Response {
    Response {
        status: 200,
        headers: Default::default(),
        body: body.to_string().into_bytes().into(),
    }
}

pub(crate) fn expired() -> TransportFailure {
    TransportFailure::Status {
        status: 401,
        payload: Some(serde_json::json!({"detail": "Token expired"})),
    }
}

/// Transport whose responses are scripted per URL.
///
/// Unscripted URLs answer 200 with `{"url": ..., "call": n}`. The refresh
/// endpoint answers 200 unless `refresh_fails_with` is set, and can be held
/// open until `release_refresh` so tests can park followers behind it.
pub(crate) struct ScriptedTransport {
    refresh_url: String,
    refresh_failure: Option<TransportFailure>,
    held: bool,
    gate: Semaphore,
    refresh_started: Notify,
    refresh_calls: AtomicUsize,
    behaviors: HashMap<String, Behavior>,
    calls: Mutex<HashMap<String, usize>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self {
            refresh_url: session::DEFAULT_REFRESH_PATH.to_string(),
            refresh_failure: None,
            held: false,
            gate: Semaphore::new(0),
            refresh_started: Notify::new(),
            refresh_calls: AtomicUsize::new(0),
            behaviors: HashMap::new(),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn on(mut self, url: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(url.to_string(), behavior);
        self
    }

    pub(crate) fn hold_refresh(mut self) -> Self {
        self.held = true;
        self
    }

    pub(crate) fn refresh_fails_with(mut self, failure: TransportFailure) -> Self {
        self.refresh_failure = Some(failure);
        self
    }

    pub(crate) fn release_refresh(&self) {
        self.gate.add_permits(1);
    }

    /// Resolves once a refresh call has started.
    pub(crate) async fn wait_for_refresh(&self) {
        self.refresh_started.notified().await;
    }

    pub(crate) fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn calls(&self, url: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    async fn refresh(&self) -> transport::Result<Response> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.refresh_started.notify_one();
        if self.held {
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
        }
        match &self.refresh_failure {
            Some(failure) => Err(failure.clone()),
            None => Ok(ok_response(serde_json::json!({"refreshed": true}))),
        }
    }

    async fn respond(&self, request: &RequestDescriptor) -> transport::Result<Response> {
        if request.url == self.refresh_url {
            return self.refresh().await;
        }

        let call = {
            let mut calls = self.calls.lock().unwrap();
            let count = calls.entry(request.url.clone()).or_default();
            *count += 1;
            *count
        };

        match self.behaviors.get(&request.url) {
            Some(Behavior::ExpireOnce) if call == 1 => Err(expired()),
            Some(Behavior::AlwaysExpire) => Err(expired()),
            Some(Behavior::Fail(failure)) => Err(failure.clone()),
            _ => Ok(ok_response(
                serde_json::json!({"url": request.url, "call": call}),
            )),
        }
    }
}

impl Transport for ScriptedTransport {
    fn execute<'a>(
        &'a self,
        request: &'a RequestDescriptor,
    ) -> Pin<Box<dyn Future<Output = transport::Result<Response>> + Send + 'a>> {
        Box::pin(self.respond(request))
    }
}

//! Navigation and redirect-memory collaborators
//!
//! The refresh coordinator never touches routing state directly. It goes
//! through these two traits so the client can run in a browser shell, a
//! terminal tool, or a test harness with the same recovery logic.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::Result;

/// Reads and changes the user's current location.
pub trait Navigator: Send + Sync {
    /// Current location path (e.g. `/dashboard`).
    fn current_path(&self) -> String;

    /// Send the user to `path`.
    fn redirect_to(&self, path: &str);
}

/// Remembers where the user was before being sent to log in.
///
/// Write-only from the coordinator's side; restoring the location after login
/// is up to the implementation's owner.
pub trait RedirectMemory: Send + Sync {
    fn store<'a>(&'a self, path: &'a str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;
}

/// In-process navigator that tracks a current path and records every redirect.
#[derive(Debug)]
pub struct MemoryNavigator {
    current: Mutex<String>,
    redirects: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(start.into()),
            redirects: Mutex::new(Vec::new()),
        }
    }

    /// Every path passed to `redirect_to`, oldest first.
    pub fn redirects(&self) -> Vec<String> {
        self.redirects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn redirect_to(&self, path: &str) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = path.to_string();
        self.redirects
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_string());
    }
}

/// In-process redirect memory (last write wins).
#[derive(Debug, Default)]
pub struct MemoryRedirectMemory {
    stored: Mutex<Option<String>>,
    writes: AtomicUsize,
}

impl MemoryRedirectMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently stored path.
    pub fn stored(&self) -> Option<String> {
        self.stored
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of `store` calls.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

impl RedirectMemory for MemoryRedirectMemory {
    fn store<'a>(&'a self, path: &'a str) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>> {
        Box::pin(async move {
            *self.stored.lock().unwrap_or_else(|e| e.into_inner()) = Some(path.to_string());
            self.writes.fetch_add(1, Ordering::Relaxed);
            Ok(())
        })
    }
}

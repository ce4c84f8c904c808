//! Session-expired handling for the recovering HTTP client
//!
//! Provides the navigation and redirect-memory collaborators the refresh
//! coordinator calls when a token refresh fails, plus the one-shot recovery
//! routine that ties them together.
//!
//! Failed-refresh flow:
//! 1. Coordinator's leader sees the refresh call fail
//! 2. `SessionExpiry::handle_refresh_failure()` reads `Navigator::current_path()`
//! 3. The path is persisted via `RedirectMemory::store()` for post-login restore
//! 4. `Navigator::redirect_to()` sends the user to the login route
//! 5. After login, `FileRedirectMemory::load()` returns the stored path

pub mod constants;
pub mod error;
pub mod expiry;
pub mod navigator;
pub mod redirect_file;

pub use constants::*;
pub use error::{Error, Result};
pub use expiry::{ExpiryAction, SessionExpiry};
pub use navigator::{MemoryNavigator, MemoryRedirectMemory, Navigator, RedirectMemory};
pub use redirect_file::FileRedirectMemory;

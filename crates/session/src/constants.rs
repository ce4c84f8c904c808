//! Default endpoint and route values
//!
//! These match the backend's auth API layout. Every value can be overridden
//! in configuration.

/// Endpoint that exchanges the session cookie for a fresh access token
pub const DEFAULT_REFRESH_PATH: &str = "/auth/refresh";

/// Endpoint that accepts user credentials
pub const DEFAULT_LOGIN_PATH: &str = "/auth/login";

/// Client-side route showing the login form
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

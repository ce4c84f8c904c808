//! Route and URL helpers shared by the transport and the config loader

use crate::error::{Error, Result};

/// Join a possibly-relative URL onto a base URL.
///
/// Absolute `http://` and `https://` URLs are returned untouched. Otherwise the
/// base loses its trailing slashes, the relative part loses its leading ones,
/// and the two are joined with a single `/`.
pub fn join_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    let relative = url.trim_start_matches('/');
    if relative.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), relative)
}

/// Check that a configured route is an absolute path (`/login`, `/auth/refresh`).
pub fn validate_route(field: &str, value: &str) -> Result<()> {
    if !value.starts_with('/') {
        return Err(Error::Config(format!(
            "{field} must start with '/', got: {value}"
        )));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(Error::Config(format!(
            "{field} must not contain whitespace, got: {value}"
        )));
    }
    Ok(())
}

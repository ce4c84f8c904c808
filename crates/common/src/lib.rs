//! Shared types for the session client workspace

mod error;
mod route;

pub use error::{Error, Result};
pub use route::{join_url, validate_route};

//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The backend base URL can be overridden with `API_BASE_URL` so the same
//! file works against different deployments.

use serde::Deserialize;
use session::{DEFAULT_LOGIN_PATH, DEFAULT_LOGIN_ROUTE, DEFAULT_REFRESH_PATH};
use std::path::{Path, PathBuf};
use std::time::Duration;
use transport::HeaderInjection;

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub client: ClientConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: Vec<HeaderInjection>,
}

/// Backend connection settings
#[derive(Debug, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// Auth endpoint layout
#[derive(Debug, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Route the user is sent to when the session cannot be refreshed
    #[serde(default = "default_login_route")]
    pub login_route: String,
}

/// Navigation state for session-expired handling
#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    /// Location the client starts on
    #[serde(default = "default_current_path")]
    pub current_path: String,
    /// Where to persist the pre-login location. In-memory when unset.
    #[serde(default)]
    pub redirect_file: Option<PathBuf>,
}

fn default_timeout() -> u64 {
    10
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

fn default_login_route() -> String {
    DEFAULT_LOGIN_ROUTE.to_string()
}

fn default_current_path() -> String {
    "/".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            refresh_path: default_refresh_path(),
            login_path: default_login_path(),
            login_route: default_login_route(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            current_path: default_current_path(),
            redirect_file: None,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file, then overlay environment variables.
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| common::Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&contents)?;

        if let Ok(base_url) = std::env::var("API_BASE_URL") {
            config.client.base_url = base_url;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        if !self.client.base_url.starts_with("http://")
            && !self.client.base_url.starts_with("https://")
        {
            return Err(common::Error::Config(format!(
                "base_url must start with http:// or https://, got: {}",
                self.client.base_url
            )));
        }

        if self.client.timeout_secs == 0 {
            return Err(common::Error::Config(
                "timeout_secs must be greater than 0".into(),
            ));
        }

        common::validate_route("auth.refresh_path", &self.auth.refresh_path)?;
        common::validate_route("auth.login_path", &self.auth.login_path)?;
        common::validate_route("auth.login_route", &self.auth.login_route)?;
        common::validate_route("session.current_path", &self.session.current_path)?;
        Ok(())
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("session-client.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize tests that mutate environment variables, preventing
    /// data races when tests run in parallel.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// SAFETY: Callers must hold ENV_MUTEX to prevent concurrent env mutation.
    unsafe fn set_env(key: &str, val: &str) {
        unsafe { std::env::set_var(key, val) };
    }

    unsafe fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) };
    }

    fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn full_toml() -> &'static str {
        r#"
[client]
base_url = "https://app.example.com/api"
timeout_secs = 30

[auth]
refresh_path = "/session/refresh"
login_path = "/session/login"
login_route = "/signin"

[session]
current_path = "/dashboard"
redirect_file = "/var/lib/session-client/redirect.json"

[[headers]]
name = "x-client-version"
value = "1.4.0"
"#
    }

    #[test]
    fn test_load_full_config() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("API_BASE_URL") };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, full_toml());

        let config = Config::load(&path).unwrap();
        assert_eq!(config.client.base_url, "https://app.example.com/api");
        assert_eq!(config.client.timeout(), Duration::from_secs(30));
        assert_eq!(config.auth.refresh_path, "/session/refresh");
        assert_eq!(config.auth.login_path, "/session/login");
        assert_eq!(config.auth.login_route, "/signin");
        assert_eq!(config.session.current_path, "/dashboard");
        assert_eq!(
            config.session.redirect_file,
            Some(PathBuf::from("/var/lib/session-client/redirect.json"))
        );
        assert_eq!(config.headers.len(), 1);
        assert_eq!(config.headers[0].name, "x-client-version");
    }

    #[test]
    fn test_defaults_apply_to_minimal_config() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("API_BASE_URL") };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[client]
base_url = "http://localhost:8000"
"#,
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.client.timeout_secs, 10);
        assert_eq!(config.auth.refresh_path, "/auth/refresh");
        assert_eq!(config.auth.login_path, "/auth/login");
        assert_eq!(config.auth.login_route, "/login");
        assert_eq!(config.session.current_path, "/");
        assert!(config.session.redirect_file.is_none());
        assert!(config.headers.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/path/config.toml")).unwrap_err();
        assert!(matches!(err, common::Error::Io { .. }), "got: {err:?}");
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "not valid {{{{ toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, common::Error::Toml(_)), "got: {err:?}");
    }

    #[test]
    fn test_base_url_from_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, full_toml());

        unsafe { set_env("API_BASE_URL", "http://staging.internal:8080") };
        let config = Config::load(&path).unwrap();
        assert_eq!(config.client.base_url, "http://staging.internal:8080");
        unsafe { remove_env("API_BASE_URL") };
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("API_BASE_URL") };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[client]
base_url = "app.example.com"
"#,
        );

        let err = Config::load(&path).unwrap_err().to_string();
        assert!(
            err.contains("base_url must start with http"),
            "error message should explain the issue, got: {err}"
        );
    }

    #[test]
    fn test_invalid_env_base_url_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, full_toml());

        unsafe { set_env("API_BASE_URL", "ftp://files.example.com") };
        let result = Config::load(&path);
        unsafe { remove_env("API_BASE_URL") };
        assert!(result.is_err(), "env override must be validated too");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("API_BASE_URL") };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[client]
base_url = "http://localhost:8000"
timeout_secs = 0
"#,
        );

        assert!(Config::load(&path).is_err(), "timeout_secs = 0 must be rejected");
    }

    #[test]
    fn test_relative_login_route_rejected() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("API_BASE_URL") };
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(
            &dir,
            r#"
[client]
base_url = "http://localhost:8000"

[auth]
login_route = "login"
"#,
        );

        let err = Config::load(&path).unwrap_err().to_string();
        assert!(err.contains("auth.login_route"), "got: {err}");
    }

    #[test]
    fn test_resolve_path_cli_arg() {
        let path = Config::resolve_path(Some("/custom/path.toml"));
        assert_eq!(path, PathBuf::from("/custom/path.toml"));
    }

    #[test]
    fn test_resolve_path_env_var() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/path.toml") };
        let path = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("/env/path.toml"));
        unsafe { remove_env("CONFIG_PATH") };
    }

    #[test]
    fn test_resolve_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { remove_env("CONFIG_PATH") };
        let path = Config::resolve_path(None);
        assert_eq!(path, PathBuf::from("session-client.toml"));
    }

    #[test]
    fn test_resolve_path_cli_overrides_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        unsafe { set_env("CONFIG_PATH", "/env/should-lose.toml") };
        let path = Config::resolve_path(Some("/cli/wins.toml"));
        assert_eq!(
            path,
            PathBuf::from("/cli/wins.toml"),
            "CLI arg must take precedence over CONFIG_PATH env var"
        );
        unsafe { remove_env("CONFIG_PATH") };
    }
}

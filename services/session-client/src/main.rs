//! Session Client
//!
//! Command-line HTTP client that:
//! 1. Loads the backend and auth endpoint layout from TOML
//! 2. Issues every requested call concurrently through one `SessionClient`
//! 3. Recovers expired sessions with a single shared token refresh
//! 4. Prints one JSON line per request on stdout

mod config;
mod metrics;
mod report;

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use futures_util::future::join_all;
use session::{
    FileRedirectMemory, MemoryNavigator, MemoryRedirectMemory, Navigator, RedirectMemory,
    SessionExpiry,
};
use session_refresh::{RecoveryPolicy, RefreshCoordinator, SessionClient};
use tracing::{Instrument, info, info_span, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transport::{Method, RequestDescriptor, ReqwestTransport};
use uuid::Uuid;

use crate::config::Config;
use crate::report::{Outcome, RequestReport};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "session-client")]
#[command(about = "HTTP client that recovers expired sessions with one shared refresh", long_about = None)]
struct Cli {
    /// Config file. Falls back to CONFIG_PATH, then session-client.toml.
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// Print Prometheus metrics to stderr after the run.
    #[arg(long)]
    metrics: bool,

    /// Requests to send, as METHOD PATH pairs.
    #[arg(value_name = "METHOD PATH", required = true)]
    requests: Vec<String>,
}

impl Cli {
    /// Pair up the positional arguments into (method, path) requests.
    fn requests(&self) -> Result<Vec<(Method, String)>> {
        self.requests
            .chunks(2)
            .map(|pair| {
                let (method, path) = match pair {
                    [method, path] => (method, path),
                    [method, ..] => bail!("{method} requires a path"),
                    [] => bail!("empty request"),
                };
                let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                    .with_context(|| format!("invalid HTTP method: {method}"))?;
                Ok((method, path.clone()))
            })
            .collect()
    }
}

/// Wire the transport, the session-expiry handler and the coordinator into
/// one client.
fn build_client(config: &Config, navigator: Arc<dyn Navigator>) -> Result<SessionClient> {
    let transport = ReqwestTransport::new(
        &config.client.base_url,
        config.client.timeout(),
        &config.headers,
    )
    .context("failed to build HTTP transport")?;

    let memory: Arc<dyn RedirectMemory> = match &config.session.redirect_file {
        Some(path) => Arc::new(FileRedirectMemory::new(path.clone())),
        None => Arc::new(MemoryRedirectMemory::new()),
    };
    let expiry = SessionExpiry::new(navigator, memory, config.auth.login_route.clone());

    let policy = RecoveryPolicy::new(
        config.auth.refresh_path.clone(),
        config.auth.login_path.clone(),
    );
    let coordinator = Arc::new(RefreshCoordinator::new(policy.refresh_path(), Some(expiry)));

    Ok(SessionClient::new(Arc::new(transport), coordinator, policy))
}

/// Run every request concurrently on the shared client. Reports come back in
/// argument order.
async fn run_requests(
    client: &SessionClient,
    requests: Vec<(Method, String)>,
) -> Vec<RequestReport> {
    let tasks = requests.into_iter().map(|(method, url)| {
        let client = client.clone();
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!("request", request_id = %request_id);

        async move {
            let started = Instant::now();
            let result = client
                .execute(RequestDescriptor::new(method.clone(), url.clone()))
                .await;
            let outcome = Outcome::from_result(&result);
            metrics::record_request(
                &outcome.label(),
                method.as_str(),
                started.elapsed().as_secs_f64(),
            );

            RequestReport {
                request_id,
                method: method.to_string(),
                url,
                outcome,
            }
        }
        .instrument(span)
    });

    join_all(tasks).await
}

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs on stderr, LOG_LEVEL / RUST_LOG support; stdout carries the reports
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let requests = cli.requests()?;

    // Install Prometheus metrics recorder before any metrics are emitted
    let prometheus_handle = metrics::install_recorder()?;

    let config_path = Config::resolve_path(cli.config.as_deref());
    info!(path = %config_path.display(), "loading configuration");

    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    info!(
        base_url = %config.client.base_url,
        refresh_path = %config.auth.refresh_path,
        login_route = %config.auth.login_route,
        headers = config.headers.len(),
        requests = requests.len(),
        "configuration loaded"
    );

    let navigator = Arc::new(MemoryNavigator::new(config.session.current_path.clone()));
    let client = build_client(&config, navigator.clone())?;

    let reports = run_requests(&client, requests).await;
    for report in &reports {
        println!("{}", report.to_line());
    }

    if let Some(route) = navigator.redirects().last() {
        warn!(login_route = %route, "session could not be refreshed, log in again");
    }

    if cli.metrics {
        eprint!("{}", prometheus_handle.render());
    }

    let failed = reports.iter().filter(|r| r.outcome.is_error()).count();
    if failed > 0 {
        bail!("{failed} of {} requests failed", reports.len());
    }
    Ok(())
}

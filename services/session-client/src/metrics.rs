//! Prometheus metrics exposition
//!
//! The library crates emit the session recovery counters; this module adds
//! per-request metrics for the CLI and installs the recorder that renders them:
//!
//! - `client_requests_total` (counter): labels `outcome`, `method`
//! - `client_request_duration_seconds` (histogram): label `outcome`

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

const DURATION_BUCKETS: &[f64] = &[
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0,
];

fn builder() -> Result<PrometheusBuilder> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("client_request_duration_seconds".to_string()),
            DURATION_BUCKETS,
        )
        .context("failed to set histogram buckets")
}

/// Install the Prometheus recorder and return a handle for rendering metrics.
///
/// Request durations render as a histogram with buckets from 5ms to 60s,
/// covering the configurable request timeout range.
pub fn install_recorder() -> Result<PrometheusHandle> {
    builder()?
        .install_recorder()
        .context("failed to install Prometheus recorder")
}

/// Record a finished request. `outcome` is the status code, or the error
/// class when no response arrived.
pub fn record_request(outcome: &str, method: &str, duration_secs: f64) {
    metrics::counter!(
        "client_requests_total",
        "outcome" => outcome.to_string(),
        "method" => method.to_string()
    )
    .increment(1);
    metrics::histogram!("client_request_duration_seconds", "outcome" => outcome.to_string())
        .record(duration_secs);
}

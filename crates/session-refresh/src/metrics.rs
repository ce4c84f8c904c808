//! Session recovery metrics
//!
//! - `session_refresh_total` (counter): label `outcome` (`success`, `failure`, `abandoned`)
//! - `session_requests_queued_total` (counter): callers parked behind a refresh
//! - `session_replays_total` (counter): requests re-sent after a successful refresh
//! - `session_terminal_errors_total` (counter): label `class`

use transport::ErrorClass;

pub fn record_refresh(outcome: &'static str) {
    metrics::counter!("session_refresh_total", "outcome" => outcome).increment(1);
}

pub fn record_queued() {
    metrics::counter!("session_requests_queued_total").increment(1);
}

pub fn record_replay() {
    metrics::counter!("session_replays_total").increment(1);
}

pub fn record_terminal_error(class: ErrorClass) {
    metrics::counter!("session_terminal_errors_total", "class" => class.label()).increment(1);
}

//! Metrics collection and exposition.
//!
//! # Metrics
//! - `circuit_breaker_transitions_total` (counter): transitions by breaker, from, to
//! - `circuit_breaker_rejections_total` (counter): rejections by breaker, reason
//! - `circuit_breaker_outcomes_total` (counter): recorded outcomes by breaker, outcome
//! - `circuit_breaker_discarded_total` (counter): outcomes dropped as stale
//! - `circuit_breaker_state` (gauge): 0=closed, 1=half-open, 2=open
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is installed by the binary only

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::{Rejected, State};

/// Install the Prometheus exporter with an HTTP scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_state(breaker: &str, state: State) {
    metrics::gauge!("circuit_breaker_state", "breaker" => breaker.to_string())
        .set(f64::from(state.as_gauge()));
}

pub fn record_transition(breaker: &str, from: State, to: State) {
    metrics::counter!(
        "circuit_breaker_transitions_total",
        "breaker" => breaker.to_string(),
        "from" => from.as_str(),
        "to" => to.as_str()
    )
    .increment(1);
    record_state(breaker, to);
}

pub fn record_rejection(breaker: &str, reason: Rejected) {
    metrics::counter!(
        "circuit_breaker_rejections_total",
        "breaker" => breaker.to_string(),
        "reason" => reason.as_str()
    )
    .increment(1);
}

pub fn record_outcome(breaker: &str, success: bool) {
    let outcome = if success { "success" } else { "failure" };
    metrics::counter!(
        "circuit_breaker_outcomes_total",
        "breaker" => breaker.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_discarded(breaker: &str) {
    metrics::counter!("circuit_breaker_discarded_total", "breaker" => breaker.to_string())
        .increment(1);
}

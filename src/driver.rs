//! Demo request loop.
//!
//! Sends a fixed number of pings through the breaker at a fixed pace and
//! tallies what happened to each one.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::BreakerConfig;
use crate::http::{ClientError, PingClient};
use crate::resilience::{BreakerError, CircuitBreaker, State};

/// Per-outcome request tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DriverReport {
    pub succeeded: u32,
    pub failed: u32,
    pub rejected: u32,
}

/// Build the demo breaker, logging every state change.
pub fn build_breaker(config: &BreakerConfig) -> CircuitBreaker<ClientError> {
    let mut settings = config.to_settings();
    settings.on_state_change = Some(Arc::new(|name: &str, from: State, to: State| {
        tracing::info!(breaker = name, %from, %to, "CircuitBreaker state change");
    }));
    CircuitBreaker::new(settings)
}

pub async fn run(
    breaker: &CircuitBreaker<ClientError>,
    client: &PingClient,
    requests: u32,
    interval: Duration,
) -> DriverReport {
    let mut report = DriverReport::default();

    for request in 0..requests {
        match breaker.execute_async(|| client.ping()).await {
            Ok(()) => report.succeeded += 1,
            Err(BreakerError::Rejected(reason)) => {
                report.rejected += 1;
                tracing::info!(request, %reason, "Request rejected by circuit breaker");
            }
            Err(BreakerError::Operation(e)) => {
                report.failed += 1;
                tracing::warn!(request, error = %e, "Request failed");
            }
        }

        if request + 1 < requests {
            tokio::time::sleep(interval).await;
        }
    }

    tracing::info!(
        succeeded = report.succeeded,
        failed = report.failed,
        rejected = report.rejected,
        state = %breaker.state(),
        "Driver finished"
    );
    report
}

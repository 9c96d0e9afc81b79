//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use tripwire::http::{serve, AppState, ClientError};
use tripwire::resilience::policy::consecutive_failures;
use tripwire::{CircuitBreaker, ManualClock, Settings};

#[allow(dead_code)]
pub const TIMEOUT: Duration = Duration::from_millis(100);

/// Breaker on a manual clock that trips after `threshold` consecutive failures.
#[allow(dead_code)]
pub fn manual_breaker(
    clock: &ManualClock,
    max_requests: u32,
    threshold: u32,
) -> CircuitBreaker<&'static str> {
    CircuitBreaker::new(Settings {
        name: "integration".into(),
        max_requests,
        timeout: TIMEOUT,
        ready_to_trip: Some(consecutive_failures(threshold)),
        clock: Some(Arc::new(clock.clone())),
        ..Settings::default()
    })
}

/// Start the demo ping server on an ephemeral port.
///
/// Returns the bound address and a sender that stops the server.
#[allow(dead_code)]
pub async fn start_ping_server(
    breaker: CircuitBreaker<ClientError>,
    failing_for: Duration,
) -> (SocketAddr, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState {
        started: Instant::now(),
        failing_for,
        breaker,
    };

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let _ = serve(listener, state, async move {
            let _ = rx.await;
        })
        .await;
    });

    (addr, tx)
}

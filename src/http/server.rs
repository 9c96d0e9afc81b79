//! Demo HTTP server.
//!
//! # Responsibilities
//! - `GET /ping`: fails with 500 for a configured window after startup, then 200
//! - `GET /breaker`: JSON snapshot of the client-side breaker
//! - Graceful shutdown on an external signal

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::http::client::ClientError;
use crate::resilience::{CircuitBreaker, Snapshot};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Reference point for the failing window.
    pub started: Instant,
    pub failing_for: Duration,
    /// Breaker guarding the driver's calls, exposed for status reporting.
    pub breaker: CircuitBreaker<ClientError>,
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/breaker", get(breaker_status))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn ping(State(state): State<AppState>) -> (StatusCode, &'static str) {
    if state.started.elapsed() < state.failing_for {
        (StatusCode::INTERNAL_SERVER_ERROR, "pong")
    } else {
        (StatusCode::OK, "pong")
    }
}

async fn breaker_status(State(state): State<AppState>) -> Json<Snapshot> {
    Json(state.breaker.snapshot())
}

/// Serve until `shutdown` resolves.
pub async fn serve<S>(listener: TcpListener, state: AppState, shutdown: S) -> std::io::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Ping server starting");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Ping server stopped");
    Ok(())
}

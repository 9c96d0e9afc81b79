//! tripwire demo
//!
//! Starts a ping server that fails for a while after startup, then drives
//! requests at it through a circuit breaker and logs every transition.
//!
//! ```text
//!   driver ──▶ CircuitBreaker ──▶ PingClient ──▶ /ping (500 → 200)
//!                    │
//!                    └──▶ /breaker (snapshot)
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use tripwire::config::{load_config, AppConfig};
use tripwire::driver;
use tripwire::http::{serve, AppState, PingClient};
use tripwire::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "tripwire")]
#[command(about = "Drive a flaky ping endpoint through a circuit breaker", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of requests the driver sends.
    #[arg(short, long)]
    requests: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(requests) = cli.requests {
        config.demo.requests = requests.max(1);
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("tripwire v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let breaker = driver::build_breaker(&config.breaker);
    tracing::info!(
        breaker = %config.breaker.name,
        max_requests = config.breaker.max_requests,
        interval_ms = config.breaker.interval_ms,
        timeout_ms = config.breaker.timeout_ms,
        "Circuit breaker configured"
    );

    let listener = TcpListener::bind(&config.demo.bind_address).await?;
    let local_addr = listener.local_addr()?;

    let state = AppState {
        started: Instant::now(),
        failing_for: Duration::from_millis(config.demo.failing_for_ms),
        breaker: breaker.clone(),
    };
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(serve(listener, state, async move {
        let _ = shutdown_rx.await;
    }));

    let client = PingClient::new(
        &format!("http://{}", local_addr),
        Duration::from_millis(config.demo.request_timeout_ms),
    )?;
    driver::run(
        &breaker,
        &client,
        config.demo.requests,
        Duration::from_millis(config.demo.request_interval_ms),
    )
    .await;

    let _ = shutdown_tx.send(());
    server.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}

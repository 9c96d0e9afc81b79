//! Demo server and driver over real sockets.

use std::time::Duration;

use tripwire::config::{BreakerConfig, TripPolicyConfig};
use tripwire::driver::{self, build_breaker};
use tripwire::http::PingClient;
use tripwire::State;

mod common;

fn breaker_config() -> BreakerConfig {
    BreakerConfig {
        name: "demo".into(),
        max_requests: 1,
        interval_ms: 0,
        timeout_ms: 150,
        trip: TripPolicyConfig::ConsecutiveFailures { threshold: 3 },
    }
}

#[tokio::test]
async fn test_ping_fails_inside_window_then_recovers() {
    let breaker = build_breaker(&breaker_config());
    let (addr, shutdown) = common::start_ping_server(breaker, Duration::from_millis(300)).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let url = format!("http://{}/ping", addr);

    let res = client.get(&url).send().await.expect("Server unreachable");
    assert_eq!(res.status(), 500);
    assert_eq!(res.text().await.unwrap(), "pong");

    tokio::time::sleep(Duration::from_millis(400)).await;
    let res = client.get(&url).send().await.expect("Server unreachable");
    assert_eq!(res.status(), 200);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_breaker_endpoint_reports_snapshot() {
    let breaker = build_breaker(&breaker_config());
    let (addr, shutdown) = common::start_ping_server(breaker.clone(), Duration::ZERO).await;

    let client = PingClient::new(&format!("http://{}", addr), Duration::from_secs(1)).unwrap();
    breaker.execute_async(|| client.ping()).await.unwrap();

    let http = reqwest::Client::builder().no_proxy().build().unwrap();
    let body: serde_json::Value = http
        .get(format!("http://{}/breaker", addr))
        .send()
        .await
        .expect("Server unreachable")
        .json()
        .await
        .unwrap();

    assert_eq!(body["name"], "demo");
    assert_eq!(body["state"], "closed");
    assert_eq!(body["counts"]["requests"], 1);
    assert_eq!(body["counts"]["total_successes"], 1);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_driver_trips_and_recovers() {
    let breaker = build_breaker(&breaker_config());
    let (addr, shutdown) = common::start_ping_server(breaker.clone(), Duration::from_millis(200)).await;

    let client = PingClient::new(&format!("http://{}", addr), Duration::from_secs(1)).unwrap();
    let report = driver::run(&breaker, &client, 60, Duration::from_millis(20)).await;

    assert!(report.failed >= 3, "should fail until tripped: {:?}", report);
    assert!(report.rejected >= 1, "should fast-fail while open: {:?}", report);
    assert!(report.succeeded >= 1, "should recover after the window: {:?}", report);
    assert_eq!(report.succeeded + report.failed + report.rejected, 60);
    assert_eq!(breaker.state(), State::Closed);

    let _ = shutdown.send(());
}

#[tokio::test]
async fn test_unreachable_server_is_an_operation_error() {
    let breaker = build_breaker(&breaker_config());
    // Bind then drop to get a port nobody listens on.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let client = PingClient::new(&format!("http://{}", addr), Duration::from_millis(500)).unwrap();
    let report = driver::run(&breaker, &client, 5, Duration::ZERO).await;

    assert_eq!(report.failed, 3);
    assert_eq!(report.rejected, 2);
    assert_eq!(breaker.state(), State::Open);
}

//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files and
//! every section has defaults, so an empty file is a valid config.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::resilience::policy::{consecutive_failures, failure_ratio};
use crate::resilience::{ReadyToTrip, Settings};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Circuit breaker settings.
    pub breaker: BreakerConfig,

    /// Demo ping server and request driver.
    pub demo: DemoConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BreakerConfig {
    /// Breaker identifier for logging/metrics.
    pub name: String,

    /// Half-open trial requests (concurrent cap and successes to close).
    pub max_requests: u32,

    /// Closed-state counting window in milliseconds (0 = never reset).
    pub interval_ms: u64,

    /// Time spent open before probing, in milliseconds.
    pub timeout_ms: u64,

    /// Policy deciding when the breaker trips.
    pub trip: TripPolicyConfig,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            name: "test-cb".to_string(),
            max_requests: 3,
            interval_ms: 1_000,
            timeout_ms: 3_000,
            trip: TripPolicyConfig::default(),
        }
    }
}

impl BreakerConfig {
    /// Build breaker settings; hooks other than the trip policy stay unset.
    pub fn to_settings<E>(&self) -> Settings<E> {
        Settings {
            name: self.name.clone(),
            max_requests: self.max_requests,
            interval: Duration::from_millis(self.interval_ms),
            timeout: Duration::from_millis(self.timeout_ms),
            ready_to_trip: Some(self.trip.to_policy()),
            ..Settings::default()
        }
    }
}

/// Ready-to-trip policy selection.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TripPolicyConfig {
    /// Trip after `threshold` failures in a row.
    ConsecutiveFailures { threshold: u32 },
    /// Trip once `min_requests` were seen and the failure ratio reaches `ratio`.
    FailureRatio { min_requests: u32, ratio: f64 },
}

impl Default for TripPolicyConfig {
    fn default() -> Self {
        TripPolicyConfig::ConsecutiveFailures { threshold: 3 }
    }
}

impl TripPolicyConfig {
    pub fn to_policy(&self) -> ReadyToTrip {
        match *self {
            TripPolicyConfig::ConsecutiveFailures { threshold } => consecutive_failures(threshold),
            TripPolicyConfig::FailureRatio {
                min_requests,
                ratio,
            } => failure_ratio(min_requests, ratio),
        }
    }
}

/// Demo ping server and driver configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Ping server bind address.
    pub bind_address: String,

    /// How long after startup `/ping` keeps failing, in milliseconds.
    pub failing_for_ms: u64,

    /// Number of requests the driver issues.
    pub requests: u32,

    /// Pause between driver requests in milliseconds.
    pub request_interval_ms: u64,

    /// Per-request client timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
            failing_for_ms: 5_000,
            requests: 100,
            request_interval_ms: 100,
            request_timeout_ms: 1_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

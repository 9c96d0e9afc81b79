//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{AppConfig, TripPolicyConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let breaker = &config.breaker;
    if breaker.name.trim().is_empty() {
        errors.push(ValidationError::new("breaker.name", "must not be empty"));
    }
    if breaker.max_requests == 0 {
        errors.push(ValidationError::new("breaker.max_requests", "must be at least 1"));
    }
    if breaker.timeout_ms == 0 {
        errors.push(ValidationError::new("breaker.timeout_ms", "must be greater than 0"));
    }
    match breaker.trip {
        TripPolicyConfig::ConsecutiveFailures { threshold: 0 } => {
            errors.push(ValidationError::new("breaker.trip.threshold", "must be at least 1"));
        }
        TripPolicyConfig::FailureRatio { ratio, .. } if !(ratio > 0.0 && ratio <= 1.0) => {
            errors.push(ValidationError::new(
                "breaker.trip.ratio",
                format!("must be in (0, 1], got {}", ratio),
            ));
        }
        _ => {}
    }

    if config.demo.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "demo.bind_address",
            format!("invalid socket address '{}'", config.demo.bind_address),
        ));
    }
    if config.demo.requests == 0 {
        errors.push(ValidationError::new("demo.requests", "must be at least 1"));
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", observability.log_level),
        ));
    }
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address '{}'", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Circuit breaker state.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: downstream assumed down, requests fail fast
//! - HalfOpen: a bounded number of trial requests probe recovery
//!
//! # State Transitions
//! ```text
//! Closed → Open: ready_to_trip(counts) after a recorded failure
//! Open → HalfOpen: first admission attempt once the open timeout expired
//! HalfOpen → Closed: consecutive successes reach max_requests
//! HalfOpen → Open: any trial request fails
//! ```

use serde::Serialize;
use std::fmt;

/// Current state of a circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum State {
    Closed,
    HalfOpen,
    Open,
}

impl State {
    pub fn as_str(self) -> &'static str {
        match self {
            State::Closed => "closed",
            State::HalfOpen => "half-open",
            State::Open => "open",
        }
    }

    /// Numeric encoding for gauges (0=closed, 1=half-open, 2=open).
    pub fn as_gauge(self) -> u8 {
        match self {
            State::Closed => 0,
            State::HalfOpen => 1,
            State::Open => 2,
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Caller wraps a remote call:
//!     → circuit_breaker.rs (admission check, outcome recording, transitions)
//!     → counts.rs (per-generation statistics)
//!     → policy.rs (ready-to-trip decision after each failure)
//!     → clock.rs (lazy expiry of open timeout and closed interval)
//!     → settings.rs on_state_change hook (logging, metrics, callers)
//! ```
//!
//! # Design Decisions
//! - The breaker never retries and never backs off
//! - Outcomes are classified only through the `is_successful` predicate
//! - Rejections are distinct from operation errors

pub mod circuit_breaker;
pub mod clock;
pub mod counts;
pub mod error;
pub mod policy;
pub mod settings;
pub mod state;

pub use circuit_breaker::{CircuitBreaker, Permit, Snapshot};
pub use clock::{Clock, ManualClock, SystemClock};
pub use counts::Counts;
pub use error::{BreakerError, Rejected};
pub use settings::{IsSuccessful, OnStateChange, ReadyToTrip, Settings};
pub use state::State;

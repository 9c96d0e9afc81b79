//! Circuit breaker for isolating failures of unreliable operations.
//!
//! A [`CircuitBreaker`] wraps calls to a dependency, trips open when the
//! configured policy says failures are too frequent, fails fast while open,
//! and probes recovery with a bounded number of trial requests before
//! re-admitting traffic.
//!
//! ```
//! use std::time::Duration;
//! use tripwire::resilience::policy::consecutive_failures;
//! use tripwire::{BreakerError, CircuitBreaker, Settings, State};
//!
//! let breaker: CircuitBreaker<&str> = CircuitBreaker::new(Settings {
//!     name: "upstream".into(),
//!     max_requests: 2,
//!     timeout: Duration::from_secs(5),
//!     ready_to_trip: Some(consecutive_failures(2)),
//!     ..Settings::default()
//! });
//!
//! for _ in 0..2 {
//!     let _ = breaker.execute(|| Err::<(), _>("connection refused"));
//! }
//! assert_eq!(breaker.state(), State::Open);
//! assert!(matches!(
//!     breaker.execute(|| Ok::<_, &str>(())),
//!     Err(BreakerError::Rejected(_))
//! ));
//! ```

// Core
pub mod resilience;

// Cross-cutting concerns
pub mod config;
pub mod observability;

// Demo surface
pub mod driver;
pub mod http;

pub use resilience::{
    BreakerError, CircuitBreaker, Clock, Counts, ManualClock, Permit, Rejected, Settings,
    Snapshot, State, SystemClock,
};

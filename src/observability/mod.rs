//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Circuit breaker produces:
//!     → logging.rs (structured log events for transitions, rejections)
//!     → metrics.rs (counters and the state gauge)
//!
//! Consumers:
//!     → Log output (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;

//! Demo HTTP surface.
//!
//! # Data Flow
//! ```text
//! driver → CircuitBreaker::execute_async
//!     → client.rs (GET /ping, non-2xx is a failure)
//!     → server.rs (/ping flaky for a window after startup)
//!
//! monitoring → server.rs (/breaker snapshot)
//! ```

pub mod client;
pub mod server;

pub use client::{ClientError, PingClient};
pub use server::{build_router, serve, AppState};

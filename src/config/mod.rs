//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → BreakerConfig::to_settings → CircuitBreaker::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; breaker settings never change at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::AppConfig;
pub use schema::BreakerConfig;
pub use schema::DemoConfig;
pub use schema::ObservabilityConfig;
pub use schema::TripPolicyConfig;

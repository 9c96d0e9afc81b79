//! Circuit breaker settings.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::resilience::clock::Clock;
use crate::resilience::counts::Counts;
use crate::resilience::state::State;

/// Decides, right after a failure is recorded, whether the breaker opens.
pub type ReadyToTrip = Arc<dyn Fn(&Counts) -> bool + Send + Sync>;

/// Classifies an operation error as success (`true`) or failure (`false`).
pub type IsSuccessful<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Called with `(name, from, to)` after every state transition.
pub type OnStateChange = Arc<dyn Fn(&str, State, State) + Send + Sync>;

/// Open timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Immutable configuration supplied at construction.
///
/// Hooks left as `None` fall back to defaults: trip after more than five
/// consecutive failures, treat every `Err` as a failure, notify nobody.
pub struct Settings<E> {
    /// Identifier used in logs, metrics and state change notifications.
    pub name: String,
    /// Maximum concurrent trial requests in half-open, and the number of
    /// consecutive successes needed to close again. Zero is treated as one.
    pub max_requests: u32,
    /// Closed-state window after which counts are cleared. Zero never clears.
    pub interval: Duration,
    /// Time spent open before probing. Zero falls back to `DEFAULT_TIMEOUT`.
    pub timeout: Duration,
    pub ready_to_trip: Option<ReadyToTrip>,
    pub is_successful: Option<IsSuccessful<E>>,
    pub on_state_change: Option<OnStateChange>,
    /// Time source, the system monotonic clock when unset.
    pub clock: Option<Arc<dyn Clock>>,
}

impl<E> Settings<E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl<E> Default for Settings<E> {
    fn default() -> Self {
        Self {
            name: String::new(),
            max_requests: 1,
            interval: Duration::ZERO,
            timeout: DEFAULT_TIMEOUT,
            ready_to_trip: None,
            is_successful: None,
            on_state_change: None,
            clock: None,
        }
    }
}

impl<E> Clone for Settings<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            max_requests: self.max_requests,
            interval: self.interval,
            timeout: self.timeout,
            ready_to_trip: self.ready_to_trip.clone(),
            is_successful: self.is_successful.clone(),
            on_state_change: self.on_state_change.clone(),
            clock: self.clock.clone(),
        }
    }
}

impl<E> fmt::Debug for Settings<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("name", &self.name)
            .field("max_requests", &self.max_requests)
            .field("interval", &self.interval)
            .field("timeout", &self.timeout)
            .field("ready_to_trip", &self.ready_to_trip.is_some())
            .field("is_successful", &self.is_successful.is_some())
            .field("on_state_change", &self.on_state_change.is_some())
            .field("clock", &self.clock.is_some())
            .finish()
    }
}

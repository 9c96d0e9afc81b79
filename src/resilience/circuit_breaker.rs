//! Circuit breaker for protecting callers from a failing dependency.
//!
//! # Request Flow
//! ```text
//! execute(op)
//!     → before_request (lock): lazy expiry check, admit or reject
//!     → op() runs without the lock
//!     → after_request (lock): record outcome against the admitting generation
//!     → on_state_change hook (lock released)
//! ```
//!
//! # Generations
//! Every transition, and every closed interval rollover, starts a new
//! generation with fresh counts and its own expiry. Outcomes are recorded
//! against the generation that admitted the request; outcomes from an older
//! generation are dropped.
//!
//! # Design Decisions
//! - One mutex guards state, generation, expiry, counts and in-flight
//! - Expiry is checked on admission, never by a background timer
//! - Hooks run after the lock is released, so they may call back in
//! - Half-open caps *in-flight* trial requests at `max_requests`

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::observability::metrics;
use crate::resilience::clock::{Clock, SystemClock};
use crate::resilience::counts::Counts;
use crate::resilience::error::{BreakerError, Rejected};
use crate::resilience::policy::default_ready_to_trip;
use crate::resilience::settings::{
    IsSuccessful, OnStateChange, ReadyToTrip, Settings, DEFAULT_TIMEOUT,
};
use crate::resilience::state::State;

/// A state change produced inside the critical section, reported after it.
#[derive(Debug, Clone, Copy)]
struct Transition {
    from: State,
    to: State,
    generation: u64,
}

/// Mutable breaker state. Only touched while holding `Shared::inner`.
#[derive(Debug)]
struct Inner {
    state: State,
    generation: u64,
    counts: Counts,
    in_flight: u32,
    /// `None` never expires.
    expiry: Option<Instant>,
}

struct Shared<E> {
    name: String,
    max_requests: u32,
    interval: Duration,
    timeout: Duration,
    ready_to_trip: ReadyToTrip,
    is_successful: Option<IsSuccessful<E>>,
    on_state_change: Option<OnStateChange>,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
}

/// Point-in-time view of a breaker for status reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub name: String,
    pub state: State,
    pub generation: u64,
    pub counts: Counts,
    pub in_flight: u32,
}

/// A circuit breaker guarding operations that fail with `E`.
///
/// Cloning is cheap; clones share the same state.
pub struct CircuitBreaker<E> {
    shared: Arc<Shared<E>>,
}

impl<E> Clone for CircuitBreaker<E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<E> fmt::Debug for CircuitBreaker<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("name", &self.shared.name)
            .field("max_requests", &self.shared.max_requests)
            .field("interval", &self.shared.interval)
            .field("timeout", &self.shared.timeout)
            .field("inner", &*self.shared.lock())
            .finish()
    }
}

impl<E> CircuitBreaker<E> {
    /// Create a closed breaker from the given settings.
    pub fn new(settings: Settings<E>) -> Self {
        let clock = settings
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>);
        let timeout = if settings.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            settings.timeout
        };

        let mut shared = Shared {
            name: settings.name,
            max_requests: settings.max_requests.max(1),
            interval: settings.interval,
            timeout,
            ready_to_trip: settings.ready_to_trip.unwrap_or_else(default_ready_to_trip),
            is_successful: settings.is_successful,
            on_state_change: settings.on_state_change,
            clock,
            inner: Mutex::new(Inner {
                state: State::Closed,
                generation: 0,
                counts: Counts::default(),
                in_flight: 0,
                expiry: None,
            }),
        };

        let now = shared.clock.now();
        let expiry = shared.expiry_for(State::Closed, now);
        shared
            .inner
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .expiry = expiry;

        metrics::record_state(&shared.name, State::Closed);
        Self {
            shared: Arc::new(shared),
        }
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Stored state. Does not apply pending expiry; that happens on admission.
    pub fn state(&self) -> State {
        self.shared.lock().state
    }

    /// Counts of the current generation.
    pub fn counts(&self) -> Counts {
        self.shared.lock().counts
    }

    pub fn snapshot(&self) -> Snapshot {
        let inner = self.shared.lock();
        Snapshot {
            name: self.shared.name.clone(),
            state: inner.state,
            generation: inner.generation,
            counts: inner.counts,
            in_flight: inner.in_flight,
        }
    }

    /// Ask for admission without running anything.
    ///
    /// The returned permit must be resolved with [`Permit::success`],
    /// [`Permit::failure`] or [`Permit::record`]; dropping it unresolved
    /// records a failure.
    pub fn allow(&self) -> Result<Permit<E>, Rejected> {
        let generation = self.shared.before_request()?;
        Ok(Permit {
            breaker: self.clone(),
            generation,
            resolved: false,
        })
    }

    /// Run `operation` if the breaker admits it.
    ///
    /// The operation's error is returned unchanged as
    /// [`BreakerError::Operation`]. A panic inside `operation` is recorded as a
    /// failure and keeps unwinding.
    pub fn execute<T, F>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let permit = self.allow()?;
        let result = operation();
        permit.record(self.classify(&result));
        result.map_err(BreakerError::Operation)
    }

    /// Async form of [`execute`](Self::execute).
    ///
    /// If the returned future is dropped before the operation completes the
    /// request is recorded as a failure.
    pub async fn execute_async<T, F, Fut>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let permit = self.allow()?;
        let result = operation().await;
        permit.record(self.classify(&result));
        result.map_err(BreakerError::Operation)
    }

    fn classify<T>(&self, result: &Result<T, E>) -> bool {
        match result {
            Ok(_) => true,
            Err(err) => self
                .shared
                .is_successful
                .as_ref()
                .is_some_and(|is_successful| is_successful(err)),
        }
    }
}

impl<E> Shared<E> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expiry_for(&self, state: State, now: Instant) -> Option<Instant> {
        match state {
            State::Closed if self.interval.is_zero() => None,
            State::Closed => now.checked_add(self.interval),
            State::Open => now.checked_add(self.timeout),
            State::HalfOpen => None,
        }
    }

    fn new_generation(&self, inner: &mut Inner, now: Instant) {
        inner.generation = inner.generation.wrapping_add(1);
        inner.counts.clear();
        inner.in_flight = 0;
        inner.expiry = self.expiry_for(inner.state, now);
    }

    fn set_state(&self, inner: &mut Inner, to: State, now: Instant) -> Option<Transition> {
        if inner.state == to {
            return None;
        }
        let from = inner.state;
        inner.state = to;
        self.new_generation(inner, now);
        Some(Transition {
            from,
            to,
            generation: inner.generation,
        })
    }

    /// Apply any expiry that is due at `now`.
    fn refresh(&self, inner: &mut Inner, now: Instant) -> Option<Transition> {
        let expired = inner.expiry.is_some_and(|expiry| now >= expiry);
        if !expired {
            return None;
        }
        match inner.state {
            State::Closed => {
                self.new_generation(inner, now);
                None
            }
            State::Open => self.set_state(inner, State::HalfOpen, now),
            State::HalfOpen => None,
        }
    }

    fn before_request(&self) -> Result<u64, Rejected> {
        let now = self.clock.now();
        let (admission, transition) = {
            let mut inner = self.lock();
            let transition = self.refresh(&mut inner, now);
            let admission = match inner.state {
                State::Open => Err(Rejected::Open),
                State::HalfOpen if inner.in_flight >= self.max_requests => {
                    Err(Rejected::TooManyRequests)
                }
                State::Closed | State::HalfOpen => {
                    inner.counts.on_request();
                    inner.in_flight = inner.in_flight.saturating_add(1);
                    Ok(inner.generation)
                }
            };
            (admission, transition)
        };

        self.notify(transition);
        if let Err(rejected) = admission {
            tracing::debug!(breaker = %self.name, reason = rejected.as_str(), "Request rejected");
            metrics::record_rejection(&self.name, rejected);
        }
        admission
    }

    fn after_request(&self, generation: u64, success: bool) {
        let now = self.clock.now();
        let (recorded, transition) = {
            let mut inner = self.lock();
            let transition = self.refresh(&mut inner, now);
            if inner.generation == generation {
                inner.in_flight = inner.in_flight.saturating_sub(1);
                let outcome = if success {
                    self.on_success(&mut inner, now)
                } else {
                    self.on_failure(&mut inner, now)
                };
                (true, transition.or(outcome))
            } else {
                (false, transition)
            }
        };

        if recorded {
            metrics::record_outcome(&self.name, success);
        } else {
            tracing::debug!(
                breaker = %self.name,
                generation,
                success,
                "Discarding outcome from stale generation"
            );
            metrics::record_discarded(&self.name);
        }
        self.notify(transition);
    }

    fn on_success(&self, inner: &mut Inner, now: Instant) -> Option<Transition> {
        inner.counts.on_success();
        if inner.state == State::HalfOpen
            && inner.counts.consecutive_successes >= self.max_requests
        {
            return self.set_state(inner, State::Closed, now);
        }
        None
    }

    fn on_failure(&self, inner: &mut Inner, now: Instant) -> Option<Transition> {
        inner.counts.on_failure();
        match inner.state {
            State::Closed if (self.ready_to_trip)(&inner.counts) => {
                self.set_state(inner, State::Open, now)
            }
            State::HalfOpen => self.set_state(inner, State::Open, now),
            _ => None,
        }
    }

    /// Report a transition. Must be called without holding `inner`.
    fn notify(&self, transition: Option<Transition>) {
        let Some(Transition {
            from,
            to,
            generation,
        }) = transition
        else {
            return;
        };

        if to == State::Open {
            tracing::warn!(breaker = %self.name, %from, %to, generation, "Circuit breaker opened");
        } else {
            tracing::info!(breaker = %self.name, %from, %to, generation, "Circuit breaker state changed");
        }
        metrics::record_transition(&self.name, from, to);

        if let Some(on_state_change) = &self.on_state_change {
            on_state_change(&self.name, from, to);
        }
    }
}

/// Admission granted by [`CircuitBreaker::allow`].
#[must_use = "dropping a permit without an outcome records a failure"]
pub struct Permit<E> {
    breaker: CircuitBreaker<E>,
    generation: u64,
    resolved: bool,
}

impl<E> Permit<E> {
    /// Generation that admitted this request.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn success(self) {
        self.record(true);
    }

    pub fn failure(self) {
        self.record(false);
    }

    pub fn record(mut self, success: bool) {
        self.resolved = true;
        self.breaker.shared.after_request(self.generation, success);
    }
}

impl<E> fmt::Debug for Permit<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permit")
            .field("breaker", &self.breaker.shared.name)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<E> Drop for Permit<E> {
    fn drop(&mut self) {
        if !self.resolved {
            tracing::debug!(
                breaker = %self.breaker.shared.name,
                generation = self.generation,
                "Permit dropped without an outcome, recording failure"
            );
            self.breaker.shared.after_request(self.generation, false);
        }
    }
}

//! Ready-to-trip policies.

use std::sync::Arc;

use crate::resilience::counts::Counts;
use crate::resilience::settings::ReadyToTrip;

/// Consecutive failures tolerated by the default policy before tripping.
pub const DEFAULT_CONSECUTIVE_FAILURES: u32 = 5;

/// Trip once `threshold` failures happen in a row.
pub fn consecutive_failures(threshold: u32) -> ReadyToTrip {
    Arc::new(move |counts: &Counts| counts.consecutive_failures >= threshold)
}

/// Trip once at least `min_requests` were admitted and the failure ratio
/// reaches `ratio`.
pub fn failure_ratio(min_requests: u32, ratio: f64) -> ReadyToTrip {
    Arc::new(move |counts: &Counts| {
        counts.requests >= min_requests && counts.failure_ratio() >= ratio
    })
}

/// Trip after more than five consecutive failures.
pub fn default_ready_to_trip() -> ReadyToTrip {
    consecutive_failures(DEFAULT_CONSECUTIVE_FAILURES + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(requests: u32, failures: u32, consecutive_failures: u32) -> Counts {
        Counts {
            requests,
            total_successes: requests - failures,
            total_failures: failures,
            consecutive_successes: 0,
            consecutive_failures,
        }
    }

    #[test]
    fn test_consecutive_failures() {
        let policy = consecutive_failures(3);
        assert!(!policy(&counts(2, 2, 2)));
        assert!(policy(&counts(3, 3, 3)));
    }

    #[test]
    fn test_failure_ratio_needs_volume() {
        let policy = failure_ratio(10, 0.5);
        assert!(!policy(&counts(4, 4, 4)));
        assert!(policy(&counts(10, 5, 1)));
        assert!(!policy(&counts(10, 4, 1)));
    }

    #[test]
    fn test_default_trips_after_five() {
        let policy = default_ready_to_trip();
        assert!(!policy(&counts(5, 5, 5)));
        assert!(policy(&counts(6, 6, 6)));
    }
}

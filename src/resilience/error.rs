//! Errors surfaced by the circuit breaker.

use thiserror::Error;

/// Admission refused by the breaker. The operation was never invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejected {
    /// The breaker is open and the open timeout has not expired.
    #[error("circuit breaker is open")]
    Open,
    /// The breaker is half-open and all trial slots are in flight.
    #[error("too many requests")]
    TooManyRequests,
}

impl Rejected {
    pub fn as_str(self) -> &'static str {
        match self {
            Rejected::Open => "open",
            Rejected::TooManyRequests => "too_many_requests",
        }
    }
}

/// Result of running an operation through the breaker.
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    #[error(transparent)]
    Rejected(#[from] Rejected),
    /// The operation's own error, passed through unchanged.
    #[error("{0}")]
    Operation(E),
}

impl<E> BreakerError<E> {
    pub fn is_rejected(&self) -> bool {
        matches!(self, BreakerError::Rejected(_))
    }

    pub fn operation(&self) -> Option<&E> {
        match self {
            BreakerError::Operation(err) => Some(err),
            BreakerError::Rejected(_) => None,
        }
    }

    pub fn into_operation(self) -> Option<E> {
        match self {
            BreakerError::Operation(err) => Some(err),
            BreakerError::Rejected(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_is_distinguishable() {
        let rejected: BreakerError<String> = Rejected::Open.into();
        assert!(rejected.is_rejected());
        assert!(rejected.operation().is_none());
        assert_eq!(rejected.to_string(), "circuit breaker is open");

        let failed: BreakerError<String> = BreakerError::Operation("bad response".into());
        assert!(!failed.is_rejected());
        assert_eq!(failed.to_string(), "bad response");
        assert_eq!(failed.into_operation().as_deref(), Some("bad response"));
    }
}

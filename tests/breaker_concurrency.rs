//! Circuit breaker behaviour under concurrent callers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Barrier};
use std::thread;

use tripwire::{BreakerError, ManualClock, Rejected, State};

mod common;

#[test]
fn test_half_open_admits_at_most_max_requests_concurrently() {
    let clock = ManualClock::new();
    let cb = common::manual_breaker(&clock, 3, 1);

    let _ = cb.execute(|| Err::<(), _>("boom"));
    assert_eq!(cb.state(), State::Open);
    clock.advance(common::TIMEOUT);

    // Three trial callers plus this thread.
    let inside = Barrier::new(4);
    let release = Barrier::new(4);

    let (cb, inside, release) = (&cb, &inside, &release);
    thread::scope(|s| {
        let handles: Vec<_> = (0..3)
            .map(move |_| {
                s.spawn(move || {
                    cb.execute(move || {
                        inside.wait();
                        release.wait();
                        Ok::<_, &'static str>(())
                    })
                })
            })
            .collect();

        inside.wait();
        assert_eq!(cb.state(), State::HalfOpen);
        assert_eq!(cb.snapshot().in_flight, 3);

        let invoked = AtomicUsize::new(0);
        let extra = cb.execute(|| {
            invoked.fetch_add(1, Ordering::SeqCst);
            Ok::<_, &'static str>(())
        });
        assert!(matches!(
            extra,
            Err(BreakerError::Rejected(Rejected::TooManyRequests))
        ));
        assert_eq!(invoked.load(Ordering::SeqCst), 0);

        release.wait();
        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
    });

    assert_eq!(cb.state(), State::Closed);
    assert_eq!(cb.counts().requests, 0);
}

#[test]
fn test_half_open_failure_discards_sibling_trial() {
    let clock = ManualClock::new();
    let cb = common::manual_breaker(&clock, 2, 1);

    let _ = cb.execute(|| Err::<(), _>("boom"));
    clock.advance(common::TIMEOUT);

    let (admitted_tx, admitted_rx) = mpsc::channel();
    let (finish_tx, finish_rx) = mpsc::channel::<()>();

    thread::scope(|s| {
        let sibling = s.spawn(|| {
            cb.execute(move || {
                admitted_tx.send(()).unwrap();
                finish_rx.recv().unwrap();
                Ok::<_, &'static str>("late success")
            })
        });

        admitted_rx.recv().unwrap();
        assert_eq!(cb.state(), State::HalfOpen);

        let probe = cb.execute(|| Err::<(), _>("still down"));
        assert!(matches!(probe, Err(BreakerError::Operation("still down"))));
        assert_eq!(cb.state(), State::Open);
        let open = cb.snapshot();

        finish_tx.send(()).unwrap();
        // The caller still gets its own result back.
        assert_eq!(sibling.join().unwrap().unwrap(), "late success");

        assert_eq!(cb.snapshot(), open);
    });
}

#[test]
fn test_closed_counts_every_concurrent_request() {
    let clock = ManualClock::new();
    let cb = common::manual_breaker(&clock, 1, u32::MAX);

    thread::scope(|s| {
        for worker in 0..8 {
            let cb = cb.clone();
            s.spawn(move || {
                for i in 0..250 {
                    let _ = cb.execute(|| {
                        if (worker + i) % 2 == 0 {
                            Ok(())
                        } else {
                            Err("boom")
                        }
                    });
                }
            });
        }
    });

    let counts = cb.counts();
    assert_eq!(cb.state(), State::Closed);
    assert_eq!(counts.requests, 2_000);
    assert_eq!(counts.total_successes + counts.total_failures, 2_000);
    assert_eq!(counts.total_failures, 1_000);
    assert_eq!(cb.snapshot().in_flight, 0);
}

#[test]
fn test_open_fast_fails_every_caller() {
    let clock = ManualClock::new();
    let cb = common::manual_breaker(&clock, 1, 1);
    let _ = cb.execute(|| Err::<(), _>("boom"));

    let invoked = AtomicUsize::new(0);
    let rejected = AtomicUsize::new(0);
    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..50 {
                    let result = cb.execute(|| {
                        invoked.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, &'static str>(())
                    });
                    if matches!(result, Err(BreakerError::Rejected(Rejected::Open))) {
                        rejected.fetch_add(1, Ordering::SeqCst);
                    }
                }
            });
        }
    });

    assert_eq!(invoked.load(Ordering::SeqCst), 0);
    assert_eq!(rejected.load(Ordering::SeqCst), 200);
    assert_eq!(cb.state(), State::Open);
}

#[test]
fn test_permit_moves_across_threads() {
    let clock = ManualClock::new();
    let cb = common::manual_breaker(&clock, 1, 1);

    let permit = cb.allow().unwrap();
    thread::spawn(move || permit.failure()).join().unwrap();

    assert_eq!(cb.state(), State::Open);
}

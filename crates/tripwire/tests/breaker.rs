// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `CircuitBreaker` admission and recovery.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tick::ClockControl;
use tokio::sync::Barrier;
use tripwire::{BreakerError, BreakerState, CircuitBreaker};

const OPEN_DURATION: Duration = Duration::from_secs(30);

fn breaker(control: &ClockControl) -> CircuitBreaker<String> {
    CircuitBreaker::builder()
        .name("test")
        .failure_threshold(5)
        .open_duration(OPEN_DURATION)
        .clock(control.to_clock())
        .build()
}

async fn fail(breaker: &CircuitBreaker<String>, calls: &AtomicUsize) -> Result<(), BreakerError<String>> {
    breaker
        .execute(|| async {
            calls.fetch_add(1, Ordering::AcqRel);
            Err("dependency down".to_string())
        })
        .await
}

async fn succeed(breaker: &CircuitBreaker<String>, calls: &AtomicUsize) -> Result<u32, BreakerError<String>> {
    breaker
        .execute(|| async {
            calls.fetch_add(1, Ordering::AcqRel);
            Ok(7)
        })
        .await
}

#[tokio::test]
async fn repeated_success_keeps_breaker_closed() {
    let control = ClockControl::new();
    let breaker = breaker(&control);
    let calls = AtomicUsize::new(0);

    for _ in 0..20 {
        assert_eq!(succeed(&breaker, &calls).await.unwrap(), 7);
        assert_eq!(breaker.state(), BreakerState::Closed);
        assert_eq!(breaker.failure_count(), 0);
    }
    assert_eq!(calls.load(Ordering::Acquire), 20);
}

#[tokio::test]
async fn trips_at_threshold_and_fails_fast() {
    let control = ClockControl::new();
    let breaker = breaker(&control);
    let calls = AtomicUsize::new(0);

    for attempt in 1..=5 {
        let error = fail(&breaker, &calls).await.unwrap_err();
        assert!(matches!(error, BreakerError::Failed(_)), "attempt {attempt} should run the action");
    }
    assert!(breaker.is_open());
    assert_eq!(breaker.failure_count(), 5);
    assert_eq!(breaker.last_failure().as_deref(), Some("dependency down"));

    control.advance(OPEN_DURATION - Duration::from_millis(1));
    let error = fail(&breaker, &calls).await.unwrap_err();
    assert!(error.is_open());
    assert_eq!(error.into_inner().as_deref(), Some("dependency down"));
    assert_eq!(calls.load(Ordering::Acquire), 5, "rejected call must not run the action");
}

#[tokio::test]
async fn success_while_closed_resets_failure_count() {
    let control = ClockControl::new();
    let breaker = breaker(&control);
    let calls = AtomicUsize::new(0);

    for _ in 0..4 {
        let _ = fail(&breaker, &calls).await;
    }
    assert_eq!(breaker.failure_count(), 4);

    succeed(&breaker, &calls).await.unwrap();
    assert_eq!(breaker.failure_count(), 0);

    for _ in 0..4 {
        let _ = fail(&breaker, &calls).await;
    }
    assert!(breaker.is_closed(), "failures are counted consecutively");
}

#[tokio::test]
async fn successful_probe_closes_breaker() {
    let control = ClockControl::new();
    let breaker = breaker(&control);
    let calls = AtomicUsize::new(0);
    for _ in 0..5 {
        let _ = fail(&breaker, &calls).await;
    }

    control.advance(OPEN_DURATION);

    assert_eq!(succeed(&breaker, &calls).await.unwrap(), 7);
    assert_eq!(breaker.state(), BreakerState::Closed);
    assert_eq!(breaker.failure_count(), 0);

    assert_eq!(succeed(&breaker, &calls).await.unwrap(), 7);
    assert_eq!(calls.load(Ordering::Acquire), 7);
}

#[tokio::test]
async fn failed_probe_reopens_immediately() {
    let control = ClockControl::new();
    let breaker = breaker(&control);
    let calls = AtomicUsize::new(0);
    for _ in 0..5 {
        let _ = fail(&breaker, &calls).await;
    }

    control.advance(OPEN_DURATION);

    let probe = breaker
        .execute(|| async { Err::<(), _>("still down".to_string()) })
        .await
        .unwrap_err();
    assert!(matches!(probe, BreakerError::Failed(ref e) if e == "still down"));
    assert_eq!(breaker.state(), BreakerState::Open);

    let rejected = succeed(&breaker, &calls).await.unwrap_err();
    assert!(rejected.is_open());
    assert_eq!(rejected.into_inner().as_deref(), Some("still down"));

    // The failed probe restarted the open window.
    control.advance(OPEN_DURATION);
    assert_eq!(succeed(&breaker, &calls).await.unwrap(), 7);
    assert!(breaker.is_closed());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn only_one_concurrent_caller_probes() {
    const CALLERS: usize = 16;

    let control = ClockControl::new();
    let breaker = Arc::new(breaker(&control));
    let setup_calls = AtomicUsize::new(0);
    for _ in 0..5 {
        let _ = fail(&breaker, &setup_calls).await;
    }
    control.advance(OPEN_DURATION);

    let probes = Arc::new(AtomicUsize::new(0));
    let rejected = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(CALLERS));
    let mut tasks = Vec::with_capacity(CALLERS);

    for _ in 0..CALLERS {
        let breaker = Arc::clone(&breaker);
        let probes = Arc::clone(&probes);
        let rejected = Arc::clone(&rejected);
        let barrier = Arc::clone(&barrier);
        tasks.push(tokio::spawn(async move {
            barrier.wait().await;
            let result = breaker
                .execute(|| async {
                    probes.fetch_add(1, Ordering::AcqRel);
                    // Hold the probe open until every other caller has been turned away.
                    while rejected.load(Ordering::Acquire) < CALLERS - 1 {
                        tokio::task::yield_now().await;
                    }
                    Ok::<_, String>(())
                })
                .await;
            if result.as_ref().is_err_and(BreakerError::is_open) {
                rejected.fetch_add(1, Ordering::AcqRel);
            }
            result
        }));
    }

    for task in tasks {
        let _ = task.await.unwrap();
    }

    assert_eq!(probes.load(Ordering::Acquire), 1);
    assert_eq!(rejected.load(Ordering::Acquire), CALLERS - 1);
    assert!(breaker.is_closed());
    assert_eq!(breaker.failure_count(), 0);
}

#[test]
fn sync_call_follows_the_same_policy() {
    let breaker: CircuitBreaker<String> = CircuitBreaker::builder().failure_threshold(2).build();

    assert_eq!(breaker.call(|| Ok::<_, String>("ok")).unwrap(), "ok");
    let _ = breaker.call(|| Err::<(), _>("a".to_string()));
    let _ = breaker.call(|| Err::<(), _>("b".to_string()));

    let mut ran = false;
    let rejected = breaker.call(|| {
        ran = true;
        Ok::<_, String>(())
    });

    assert!(!ran);
    assert!(rejected.is_err_and(|e| matches!(e, BreakerError::Open { last_failure: Some(ref f) } if f == "b")));
}

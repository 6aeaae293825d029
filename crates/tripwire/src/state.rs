// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Breaker state and the store that records its transitions.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

use parking_lot::Mutex;

/// The admission state of a circuit breaker.
///
/// A breaker cycles through these states indefinitely; none of them is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BreakerState {
    /// Calls pass through and failures are counted.
    Closed,
    /// Calls fail fast without reaching the guarded dependency.
    Open,
    /// A single probe call is testing whether the dependency recovered.
    HalfOpen,
}

impl BreakerState {
    const CLOSED: u8 = 0;
    const OPEN: u8 = 1;
    const HALF_OPEN: u8 = 2;

    /// Returns a stable, lowercase name suitable for logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }

    const fn to_bits(self) -> u8 {
        match self {
            Self::Closed => Self::CLOSED,
            Self::Open => Self::OPEN,
            Self::HalfOpen => Self::HALF_OPEN,
        }
    }

    const fn from_bits(bits: u8) -> Self {
        match bits {
            Self::OPEN => Self::Open,
            Self::HALF_OPEN => Self::HalfOpen,
            _ => Self::Closed,
        }
    }
}

impl fmt::Display for BreakerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
struct Record<E> {
    last_failure: Option<E>,
    last_transition: Instant,
}

/// Holds the state of a single breaker, its most recent failure, and when it last changed.
///
/// The store only records transitions; it never decides whether a transition is legal.
/// That policy belongs to [`CircuitBreaker`](crate::CircuitBreaker), which owns exactly
/// one store. The caller supplies the transition time so the store itself performs no I/O.
///
/// The state is a single atomic byte, so [`is_closed`](Self::is_closed) never blocks.
/// The failure and the timestamp sit behind a short-lived lock that is only contended
/// while the breaker is changing state.
///
/// # Examples
///
/// ```
/// use std::time::Instant;
/// use tripwire::{BreakerState, BreakerStateStore};
///
/// let store = BreakerStateStore::<String>::new(Instant::now());
/// assert!(store.is_closed());
///
/// store.trip("connection refused".to_string(), Instant::now());
/// assert_eq!(store.state(), BreakerState::Open);
/// assert_eq!(store.last_failure().as_deref(), Some("connection refused"));
/// ```
#[derive(Debug)]
pub struct BreakerStateStore<E> {
    state: AtomicU8,
    record: Mutex<Record<E>>,
}

impl<E> BreakerStateStore<E> {
    /// Creates a closed store stamped at `now`.
    #[must_use]
    pub fn new(now: Instant) -> Self {
        Self {
            state: AtomicU8::new(BreakerState::Closed.to_bits()),
            record: Mutex::new(Record {
                last_failure: None,
                last_transition: now,
            }),
        }
    }

    /// Opens the breaker, recording `failure` as the reason.
    pub fn trip(&self, failure: E, now: Instant) {
        let mut record = self.record.lock();
        record.last_failure = Some(failure);
        self.transition(&mut record, BreakerState::Open, now);
    }

    /// Closes the breaker.
    ///
    /// The last failure is kept so it can still be inspected after recovery.
    pub fn reset(&self, now: Instant) {
        let mut record = self.record.lock();
        self.transition(&mut record, BreakerState::Closed, now);
    }

    /// Moves the breaker into the half-open state.
    pub fn half_open(&self, now: Instant) {
        let mut record = self.record.lock();
        self.transition(&mut record, BreakerState::HalfOpen, now);
    }

    /// Returns `true` when the breaker is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state() == BreakerState::Closed
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> BreakerState {
        BreakerState::from_bits(self.state.load(Ordering::Acquire))
    }

    /// Returns when the state was last written.
    #[must_use]
    pub fn last_transition(&self) -> Instant {
        self.record.lock().last_transition
    }

    fn transition(&self, record: &mut Record<E>, state: BreakerState, now: Instant) {
        record.last_transition = now;
        self.state.store(state.to_bits(), Ordering::Release);
    }
}

impl<E: Clone> BreakerStateStore<E> {
    /// Returns the failure recorded by the most recent trip, if any.
    #[must_use]
    pub fn last_failure(&self) -> Option<E> {
        self.record.lock().last_failure.clone()
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The circuit breaker and its admission logic.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};

use tick::Clock;
use tick::runtime::InactiveClock;

use crate::{BreakerError, BreakerOptions, BreakerState, BreakerStateStore, telemetry};

/// Gates calls to an unreliable dependency.
///
/// While closed, every call runs and consecutive failures are counted. Once the count
/// reaches the failure threshold the breaker trips open and every call fails fast with
/// [`BreakerError::Open`] for the open duration. After that window exactly one caller
/// is admitted as a probe: success closes the breaker, failure re-opens it immediately.
/// Callers that lose the race for the probe fail fast instead of waiting.
///
/// The breaker never queues or retries calls; it only decides admission. Trips happen
/// synchronously with the failing call that crosses the threshold, and only the
/// half-open admission takes a lock (a non-blocking flag).
///
/// `E` is the error type of the guarded dependency. It must be [`Clone`] because the
/// failure that trips the breaker is both returned to its caller and recorded for the
/// callers that are subsequently rejected.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tripwire::{BreakerError, CircuitBreaker};
///
/// # futures::executor::block_on(async {
/// let breaker: CircuitBreaker<String> = CircuitBreaker::builder()
///     .failure_threshold(2)
///     .open_duration(Duration::from_secs(10))
///     .build();
///
/// for _ in 0..2 {
///     let result = breaker.execute(|| async { Err::<(), _>("unreachable".to_string()) }).await;
///     assert!(matches!(result, Err(BreakerError::Failed(_))));
/// }
///
/// // The threshold was reached; the next call is not attempted.
/// let result = breaker.execute(|| async { Ok::<_, String>(42) }).await;
/// assert!(result.is_err_and(|e| e.is_open()));
/// # });
/// ```
#[derive(Debug)]
pub struct CircuitBreaker<E> {
    name: &'static str,
    store: BreakerStateStore<E>,
    options: BreakerOptions,
    failure_count: AtomicU32,
    probing: AtomicBool,
    clock: Clock,
}

impl<E> Default for CircuitBreaker<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> CircuitBreaker<E> {
    /// Creates a closed breaker with the default options and the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a closed breaker with the default options that reads time from `clock`.
    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self::builder().clock(clock).build()
    }

    /// Creates a builder for configuring a breaker.
    #[must_use]
    pub fn builder() -> CircuitBreakerBuilder<E> {
        CircuitBreakerBuilder::new()
    }

    /// Returns the name used to identify this breaker in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns `true` when calls are flowing normally.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.store.is_closed()
    }

    /// Returns `true` when the breaker is open or probing.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.is_closed()
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> BreakerState {
        self.store.state()
    }

    /// Returns the number of consecutive failures counted while closed.
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::Acquire)
    }

    /// Returns the number of failures that trips the breaker.
    #[must_use]
    pub fn failure_threshold(&self) -> u32 {
        self.options.failure_threshold
    }

    /// Returns how long the breaker stays open before probing.
    #[must_use]
    pub fn open_duration(&self) -> Duration {
        self.options.open_duration
    }

    /// Returns when the breaker last changed state.
    #[must_use]
    pub fn last_transition(&self) -> Instant {
        self.store.last_transition()
    }

    fn open_window_elapsed(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.store.last_transition()) >= self.options.open_duration
    }
}

impl<E: Clone> CircuitBreaker<E> {
    /// Returns the failure that most recently opened the breaker, if any.
    #[must_use]
    pub fn last_failure(&self) -> Option<E> {
        self.store.last_failure()
    }

    /// Runs an async action if the breaker admits it.
    ///
    /// # Errors
    ///
    /// Returns [`BreakerError::Open`] without running `action` when the breaker is open,
    /// or when another caller is already probing. Returns [`BreakerError::Failed`] when
    /// `action` ran and failed.
    pub async fn execute<T, F, Fut>(&self, action: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let admission = self.admit()?;
        let result = action().await;
        self.settle(admission, result)
    }

    /// Runs a synchronous action if the breaker admits it.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub fn call<T, F>(&self, action: F) -> Result<T, BreakerError<E>>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let admission = self.admit()?;
        let result = action();
        self.settle(admission, result)
    }

    fn admit(&self) -> Result<Admission<'_>, BreakerError<E>> {
        if self.store.is_closed() {
            return Ok(Admission::Normal);
        }

        if !self.open_window_elapsed(self.clock.instant()) {
            return Err(self.reject());
        }

        let Some(gate) = ProbeGate::try_acquire(&self.probing) else {
            return Err(self.reject());
        };

        // Another caller may have finished a probe between the first check and taking the gate.
        let now = self.clock.instant();
        match self.store.state() {
            BreakerState::Closed => Ok(Admission::Normal),
            BreakerState::Open | BreakerState::HalfOpen if self.open_window_elapsed(now) => {
                self.store.half_open(now);
                telemetry::half_opened(self.name);
                Ok(Admission::Probe(gate))
            }
            BreakerState::Open | BreakerState::HalfOpen => Err(self.reject()),
        }
    }

    fn settle<T>(&self, admission: Admission<'_>, result: Result<T, E>) -> Result<T, BreakerError<E>> {
        match (admission, result) {
            (Admission::Normal, Ok(value)) => {
                if self.failure_count.load(Ordering::Acquire) != 0 {
                    self.failure_count.store(0, Ordering::Release);
                }
                Ok(value)
            }
            (Admission::Normal, Err(error)) => {
                let failures = self.record_failure();
                if failures >= self.options.failure_threshold.max(1) {
                    self.store.trip(error.clone(), self.clock.instant());
                    telemetry::tripped(self.name, failures);
                }
                Err(BreakerError::Failed(error))
            }
            (Admission::Probe(gate), Ok(value)) => {
                self.store.reset(self.clock.instant());
                self.failure_count.store(0, Ordering::Release);
                drop(gate);
                telemetry::reset(self.name);
                Ok(value)
            }
            (Admission::Probe(gate), Err(error)) => {
                self.store.trip(error.clone(), self.clock.instant());
                drop(gate);
                telemetry::probe_failed(self.name);
                Err(BreakerError::Failed(error))
            }
        }
    }

    fn record_failure(&self) -> u32 {
        let previous = self
            .failure_count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| Some(count.saturating_add(1)))
            .unwrap_or_else(|count| count);
        previous.saturating_add(1)
    }

    fn reject(&self) -> BreakerError<E> {
        telemetry::rejected(self.name);
        BreakerError::Open {
            last_failure: self.store.last_failure(),
        }
    }
}

enum Admission<'a> {
    Normal,
    Probe(ProbeGate<'a>),
}

/// Exclusive right to run the half-open probe.
///
/// Released on drop, so a probe that is cancelled or panics does not wedge the breaker.
struct ProbeGate<'a>(&'a AtomicBool);

impl<'a> ProbeGate<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then_some(Self(flag))
    }
}

impl Drop for ProbeGate<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Builder for [`CircuitBreaker`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tripwire::CircuitBreaker;
///
/// let breaker: CircuitBreaker<std::io::Error> = CircuitBreaker::builder()
///     .name("shared.read")
///     .failure_threshold(3)
///     .open_duration(Duration::from_secs(5))
///     .build();
///
/// assert_eq!(breaker.failure_threshold(), 3);
/// assert!(breaker.is_closed());
/// ```
#[derive(Debug)]
pub struct CircuitBreakerBuilder<E> {
    name: &'static str,
    options: BreakerOptions,
    clock: Option<Clock>,
    _error: PhantomData<fn() -> E>,
}

impl<E> Clone for CircuitBreakerBuilder<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            options: self.options,
            clock: self.clock.clone(),
            _error: PhantomData,
        }
    }
}

impl<E> Default for CircuitBreakerBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> CircuitBreakerBuilder<E> {
    /// Creates a builder with default options and the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "breaker",
            options: BreakerOptions::default(),
            clock: None,
            _error: PhantomData,
        }
    }

    /// Sets the name reported in logs.
    #[must_use]
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Replaces all options at once.
    #[must_use]
    pub fn options(mut self, options: BreakerOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets how many consecutive failures trip the breaker.
    #[must_use]
    pub fn failure_threshold(mut self, threshold: u32) -> Self {
        self.options.failure_threshold = threshold;
        self
    }

    /// Sets how long the breaker stays open before admitting a probe.
    #[must_use]
    pub fn open_duration(mut self, duration: Duration) -> Self {
        self.options.open_duration = duration;
        self
    }

    /// Sets the clock used to stamp transitions and measure the open window.
    ///
    /// Without one the breaker reads the system's monotonic time.
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds a closed breaker.
    #[must_use]
    pub fn build(self) -> CircuitBreaker<E> {
        let clock = self.clock.unwrap_or_else(system_clock);
        CircuitBreaker {
            name: self.name,
            store: BreakerStateStore::new(clock.instant()),
            options: self.options,
            failure_count: AtomicU32::new(0),
            probing: AtomicBool::new(false),
            clock,
        }
    }
}

// The breaker only reads instants and never registers timers, so the driver can be dropped.
fn system_clock() -> Clock {
    let (clock, _driver) = InactiveClock::default().activate();
    clock
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A circuit breaker that fails fast while a dependency is down and heals itself
//! with a single probe.
//!
//! # States
//!
//! ```text
//! Closed   --(failure count reaches threshold)--> Open
//! Open     --(open duration elapsed, one caller)--> HalfOpen
//! HalfOpen --(probe succeeds)--> Closed
//! HalfOpen --(probe fails)--> Open
//! ```
//!
//! [`CircuitBreaker`] owns the policy: the failure threshold, the open duration, and
//! the exclusive half-open gate. [`BreakerStateStore`] only records transitions.
//!
//! # Quick Start
//!
//! ```
//! use tripwire::{BreakerError, CircuitBreaker};
//!
//! # futures::executor::block_on(async {
//! let breaker = CircuitBreaker::<std::io::Error>::new();
//!
//! let value = breaker.execute(|| async { Ok::<_, std::io::Error>("fresh") }).await?;
//! assert_eq!(value, "fresh");
//! assert_eq!(breaker.failure_count(), 0);
//! # Ok::<(), BreakerError<std::io::Error>>(())
//! # });
//! ```
//!
//! # Features
//!
//! - `logs` (default): emits `tracing` events on trip, half-open, reset, and rejection.
//! - `serde`: derives `Serialize`/`Deserialize` for [`BreakerOptions`].
//! - `test-util`: enables `tick`'s test utilities so a breaker can be driven by a
//!   `tick::ClockControl` instead of waiting out its open duration.

mod breaker;
mod error;
mod options;
mod state;
mod telemetry;

#[doc(inline)]
pub use breaker::{CircuitBreaker, CircuitBreakerBuilder};
#[doc(inline)]
pub use error::BreakerError;
#[doc(inline)]
pub use options::{BreakerOptions, DEFAULT_FAILURE_THRESHOLD, DEFAULT_OPEN_DURATION};
#[doc(inline)]
pub use state::{BreakerState, BreakerStateStore};

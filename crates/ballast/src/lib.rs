// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! A read-through, two-tier cache that keeps working when its shared tier does not.
//!
//! [`TieredCache::get_or_create`] looks a key up in an in-process tier, then in a
//! shared out-of-process tier, and finally asks the caller's factory. The shared tier
//! sits behind two independent circuit breakers, one for reads and one for writes, so
//! an unhealthy shared tier costs at most a handful of failed calls before the cache
//! stops touching it and serves from the factory instead.
//!
//! ```text
//! caller -> in-process tier --miss--> read breaker -> shared get
//!                                         |
//!                                    miss / failed
//!                                         v
//!                                      factory -> write breaker -> shared set (best effort)
//! ```
//!
//! Concurrent misses on one key are coalesced by the in-process tier, so the shared
//! tier and the factory see one call per key at a time. A factory result of `None` is
//! cached and replayed like any value.
//!
//! # Quick Start
//!
//! ```
//! use ballast::TieredCache;
//! use ballast_memory::MemoryTier;
//! use ballast_tier::testing::MockSharedTier;
//!
//! # futures::executor::block_on(async {
//! let shared = MockSharedTier::new();
//! let cache = TieredCache::builder(MemoryTier::new(), shared.clone()).build()?;
//!
//! let missing: Option<u32> = cache.get_or_create("order:7", || async { Ok::<_, std::io::Error>(None) }).await?;
//! assert_eq!(missing, None);
//!
//! // The absent result was written to the shared tier as well.
//! assert_eq!(shared.writes(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```
//!
//! # Features
//!
//! - `logs` (default): `tracing` events for every lookup step and breaker transition.
//! - `memory` (default): re-exports [`MemoryTier`], the moka-backed in-process tier.
//! - `metrics`: an OpenTelemetry counter, `ballast.event.count`, enabled with
//!   [`TelemetryConfig::with_metrics`].
//! - `test-util`: enables `ballast_tier::testing` and `tick::ClockControl`.

mod builder;
mod cache;
mod error;
mod options;
mod telemetry;

#[cfg(feature = "memory")]
#[doc(inline)]
pub use ballast_memory::{MemoryTier, MemoryTierBuilder};
#[doc(inline)]
pub use builder::TieredCacheBuilder;
#[doc(inline)]
pub use cache::{SharedBreaker, TieredCache};
#[doc(inline)]
pub use error::{ConfigError, Error};
#[doc(inline)]
pub use options::{DEFAULT_LOCAL_TTL, DEFAULT_SHARED_TTL, TieredCacheOptions};
#[doc(inline)]
pub use telemetry::TelemetryConfig;

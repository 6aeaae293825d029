// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring a [`TieredCache`].

use std::time::Duration;

use ballast_tier::Codec;
use tick::Clock;
use tripwire::{BreakerOptions, CircuitBreakerBuilder};

use crate::{ConfigError, SharedBreaker, TelemetryConfig, TieredCache, TieredCacheOptions};

const DEFAULT_NAME: &str = "ballast";
const READ_BREAKER_NAME: &str = "shared.read";
const WRITE_BREAKER_NAME: &str = "shared.write";

/// Builder for a [`TieredCache`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use ballast::TieredCache;
/// use ballast_memory::MemoryTier;
/// use ballast_tier::testing::MockSharedTier;
/// use tripwire::BreakerOptions;
///
/// let cache = TieredCache::builder(MemoryTier::with_capacity(10_000), MockSharedTier::new())
///     .name("profiles")
///     .local_ttl(Duration::from_secs(5))
///     .shared_ttl(Duration::from_secs(60))
///     .write_breaker(BreakerOptions {
///         failure_threshold: 3,
///         open_duration: Duration::from_secs(10),
///     })
///     .build()
///     .unwrap();
///
/// assert_eq!(cache.write_breaker().failure_threshold(), 3);
/// assert_eq!(cache.read_breaker().failure_threshold(), 5);
/// ```
#[derive(Debug)]
pub struct TieredCacheBuilder<L, S, C> {
    name: &'static str,
    local: L,
    shared: S,
    codec: C,
    options: TieredCacheOptions,
    clock: Option<Clock>,
    telemetry: TelemetryConfig,
}

impl<L, S, C: Codec + Default> TieredCacheBuilder<L, S, C> {
    pub(crate) fn new(local: L, shared: S) -> Self {
        Self {
            name: DEFAULT_NAME,
            local,
            shared,
            codec: C::default(),
            options: TieredCacheOptions::default(),
            clock: None,
            telemetry: default_telemetry(),
        }
    }
}

impl<L, S, C> TieredCacheBuilder<L, S, C> {
    /// Sets the name reported in telemetry.
    #[must_use]
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Replaces all options at once.
    #[must_use]
    pub fn options(mut self, options: TieredCacheOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets the absolute expiration of in-process entries. Defaults to 10 seconds.
    #[must_use]
    pub fn local_ttl(mut self, ttl: Duration) -> Self {
        self.options.local_ttl = ttl;
        self
    }

    /// Sets the expiration of shared tier writes. Defaults to 30 seconds.
    #[must_use]
    pub fn shared_ttl(mut self, ttl: Duration) -> Self {
        self.options.shared_ttl = ttl;
        self
    }

    /// Configures the breaker guarding shared tier reads.
    #[must_use]
    pub fn read_breaker(mut self, options: BreakerOptions) -> Self {
        self.options.read_breaker = options;
        self
    }

    /// Configures the breaker guarding shared tier writes.
    #[must_use]
    pub fn write_breaker(mut self, options: BreakerOptions) -> Self {
        self.options.write_breaker = options;
        self
    }

    /// Replaces the codec used to encode cached values.
    #[must_use]
    pub fn codec<C2: Codec>(self, codec: C2) -> TieredCacheBuilder<L, S, C2> {
        TieredCacheBuilder {
            name: self.name,
            local: self.local,
            shared: self.shared,
            codec,
            options: self.options,
            clock: self.clock,
            telemetry: self.telemetry,
        }
    }

    /// Sets the clock the breakers use to time their open window.
    ///
    /// Without one the breakers read the system's monotonic time.
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Selects the logs and metrics the cache emits.
    ///
    /// Defaults to logs only when the `logs` feature is enabled, and nothing otherwise.
    #[must_use]
    pub fn telemetry(mut self, telemetry: TelemetryConfig) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Validates the options and builds the cache.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the options fail [`TieredCacheOptions::validate`].
    pub fn build(self) -> Result<TieredCache<L, S, C>, ConfigError> {
        self.options.validate()?;

        let breaker = |name: &'static str, options: BreakerOptions| -> SharedBreaker {
            let builder = CircuitBreakerBuilder::new().name(name).options(options);
            match &self.clock {
                Some(clock) => builder.clock(clock.clone()).build(),
                None => builder.build(),
            }
        };

        Ok(TieredCache {
            read_breaker: breaker(READ_BREAKER_NAME, self.options.read_breaker),
            write_breaker: breaker(WRITE_BREAKER_NAME, self.options.write_breaker),
            telemetry: self.telemetry.build(),
            name: self.name,
            local: self.local,
            shared: self.shared,
            codec: self.codec,
            local_ttl: self.options.local_ttl,
            shared_ttl: self.options.shared_ttl,
        })
    }
}

fn default_telemetry() -> TelemetryConfig {
    let telemetry = TelemetryConfig::new();
    #[cfg(feature = "logs")]
    let telemetry = telemetry.with_logs();
    telemetry
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Logs and metrics for tiered cache lookups.
//!
//! Every lookup step is reported as a [`CacheActivity`]. With the `logs` feature the
//! activity becomes a `tracing` event at a level matching its severity; with the
//! `metrics` feature it increments the `ballast.event.count` counter.

#[cfg(any(feature = "metrics", test))]
use opentelemetry::KeyValue;
#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::{Counter, Meter, MeterProvider};

pub(crate) mod attributes;
#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(test)]
pub(crate) mod testing;

/// Selects which telemetry a [`TieredCache`](crate::TieredCache) emits.
///
/// Starts with everything disabled. The cache builder enables logs by default when the
/// `logs` feature is on.
///
/// # Examples
///
/// ```
/// use ballast::TelemetryConfig;
///
/// let logs_only = TelemetryConfig::new().with_logs();
/// # let _ = logs_only;
/// ```
#[derive(Clone, Debug, Default)]
pub struct TelemetryConfig {
    #[cfg(any(feature = "logs", test))]
    logs_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    meter: Option<Meter>,
}

impl TelemetryConfig {
    /// Creates a configuration with logs and metrics disabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a `tracing` event for every lookup step.
    #[cfg(any(feature = "logs", test))]
    #[must_use]
    pub fn with_logs(mut self) -> Self {
        self.logs_enabled = true;
        self
    }

    /// Counts lookup steps with an OpenTelemetry counter created from `provider`.
    #[cfg(any(feature = "metrics", test))]
    #[must_use]
    pub fn with_metrics(mut self, provider: &dyn MeterProvider) -> Self {
        self.meter = Some(metrics::create_meter(provider));
        self
    }

    pub(crate) fn build(&self) -> CacheTelemetry {
        CacheTelemetry {
            #[cfg(any(feature = "logs", test))]
            logs_enabled: self.logs_enabled,
            #[cfg(any(feature = "metrics", test))]
            event_counter: self.meter.as_ref().map(metrics::create_event_counter),
        }
    }
}

/// A step of a tiered lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CacheActivity {
    /// Served from the in-process tier.
    Hit,
    /// Missed the in-process tier; this caller populates it.
    Miss,
    SharedHit,
    SharedMiss,
    /// The shared read ran and failed.
    SharedReadFailed,
    /// The read breaker is open; the shared tier was not consulted.
    SharedReadRejected,
    /// The shared tier held a payload that does not decode as the requested type.
    SharedPayloadInvalid,
    FactoryInvoked,
    SharedWritten,
    SharedWriteFailed,
    SharedWriteRejected,
    /// The write was not attempted because the read did not succeed or the read breaker is not closed.
    SharedWriteSkipped,
}

impl CacheActivity {
    #[cfg_attr(
        not(any(feature = "logs", feature = "metrics", test)),
        expect(dead_code, reason = "names are only reported by enabled telemetry")
    )]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache.hit",
            Self::Miss => "cache.miss",
            Self::SharedHit => "cache.shared_hit",
            Self::SharedMiss => "cache.shared_miss",
            Self::SharedReadFailed => "cache.shared_read_failed",
            Self::SharedReadRejected => "cache.shared_read_rejected",
            Self::SharedPayloadInvalid => "cache.shared_payload_invalid",
            Self::FactoryInvoked => "cache.factory_invoked",
            Self::SharedWritten => "cache.shared_written",
            Self::SharedWriteFailed => "cache.shared_write_failed",
            Self::SharedWriteRejected => "cache.shared_write_rejected",
            Self::SharedWriteSkipped => "cache.shared_write_skipped",
        }
    }

    #[cfg(any(feature = "logs", test))]
    fn level(self) -> tracing::Level {
        match self {
            Self::Hit | Self::Miss | Self::SharedHit | Self::SharedMiss | Self::FactoryInvoked | Self::SharedWritten => {
                tracing::Level::DEBUG
            }
            Self::SharedReadRejected | Self::SharedWriteRejected | Self::SharedWriteSkipped => tracing::Level::INFO,
            Self::SharedReadFailed | Self::SharedPayloadInvalid | Self::SharedWriteFailed => tracing::Level::WARN,
        }
    }
}

/// Records [`CacheActivity`] as configured by a [`TelemetryConfig`].
#[derive(Clone, Debug, Default)]
pub(crate) struct CacheTelemetry {
    #[cfg(any(feature = "logs", test))]
    logs_enabled: bool,
    #[cfg(any(feature = "metrics", test))]
    event_counter: Option<Counter<u64>>,
}

impl CacheTelemetry {
    pub(crate) fn record(&self, cache_name: &'static str, activity: CacheActivity) {
        self.record_inner(cache_name, activity, None);
    }

    pub(crate) fn record_error(&self, cache_name: &'static str, activity: CacheActivity, error: &(dyn std::error::Error + 'static)) {
        self.record_inner(cache_name, activity, Some(error));
    }

    #[cfg_attr(
        not(any(feature = "logs", test)),
        expect(unused_variables, reason = "the error is only consumed by log events")
    )]
    fn record_inner(&self, cache_name: &'static str, activity: CacheActivity, error: Option<&(dyn std::error::Error + 'static)>) {
        #[cfg(any(feature = "metrics", test))]
        if let Some(counter) = &self.event_counter {
            counter.add(
                1,
                &[
                    KeyValue::new(attributes::CACHE_NAME, cache_name),
                    KeyValue::new(attributes::CACHE_ACTIVITY, activity.as_str()),
                ],
            );
        }

        #[cfg(any(feature = "logs", test))]
        if self.logs_enabled {
            Self::emit(cache_name, activity, error);
        }
    }

    #[cfg(any(feature = "logs", test))]
    fn emit(cache_name: &'static str, activity: CacheActivity, error: Option<&(dyn std::error::Error + 'static)>) {
        let activity_name = activity.as_str();
        let error = error.map(tracing::field::display);

        // Field names must match the constants in attributes.rs.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    cache.name = cache_name,
                    cache.activity = activity_name,
                    cache.error = error,
                    "cache.event"
                )
            };
        }

        match activity.level() {
            tracing::Level::WARN => emit_event!(warn),
            tracing::Level::INFO => emit_event!(info),
            _ => emit_event!(debug),
        }
    }
}

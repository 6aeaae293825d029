// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

/// The default number of consecutive failures that trips a breaker.
pub const DEFAULT_FAILURE_THRESHOLD: u32 = 5;

/// The default time a tripped breaker stays open before admitting a probe.
pub const DEFAULT_OPEN_DURATION: Duration = Duration::from_secs(30);

/// Tuning knobs for a [`CircuitBreaker`](crate::CircuitBreaker).
///
/// With the `serde` feature enabled the options can be loaded from configuration.
/// Missing fields fall back to their defaults.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tripwire::BreakerOptions;
///
/// let options = BreakerOptions::default();
/// assert_eq!(options.failure_threshold, 5);
/// assert_eq!(options.open_duration, Duration::from_secs(30));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BreakerOptions {
    /// Consecutive failures while closed that open the breaker. Values below 1 are treated as 1.
    pub failure_threshold: u32,

    /// How long the breaker fails fast before letting a single probe through.
    pub open_duration: Duration,
}

impl Default for BreakerOptions {
    fn default() -> Self {
        Self {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            open_duration: DEFAULT_OPEN_DURATION,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn deserialize_fills_missing_fields_with_defaults() {
        let options: BreakerOptions = serde_json::from_str(r#"{ "failure_threshold": 2 }"#).unwrap();

        assert_eq!(options.failure_threshold, 2);
        assert_eq!(options.open_duration, DEFAULT_OPEN_DURATION);
    }

    #[test]
    fn open_duration_uses_serde_duration_layout() {
        let options: BreakerOptions = serde_json::from_str(r#"{ "open_duration": { "secs": 3, "nanos": 0 } }"#).unwrap();

        assert_eq!(options.open_duration, Duration::from_secs(3));
        assert_eq!(options.failure_threshold, DEFAULT_FAILURE_THRESHOLD);
    }
}

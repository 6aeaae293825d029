// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tripwire::BreakerOptions;

use crate::ConfigError;

/// The default time an entry lives in the in-process tier.
pub const DEFAULT_LOCAL_TTL: Duration = Duration::from_secs(10);

/// The default time an entry lives in the shared tier.
pub const DEFAULT_SHARED_TTL: Duration = Duration::from_secs(30);

/// Settings for a [`TieredCache`](crate::TieredCache).
///
/// The options can be loaded from any serde format; missing fields take their defaults.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ballast::TieredCacheOptions;
///
/// let options: TieredCacheOptions = serde_json::from_str(
///     r#"{ "local_ttl": { "secs": 5, "nanos": 0 }, "write_breaker": { "failure_threshold": 2 } }"#,
/// )
/// .unwrap();
///
/// assert_eq!(options.local_ttl, Duration::from_secs(5));
/// assert_eq!(options.shared_ttl, Duration::from_secs(30));
/// assert_eq!(options.write_breaker.failure_threshold, 2);
/// assert_eq!(options.read_breaker.failure_threshold, 5);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TieredCacheOptions {
    /// Absolute expiration of entries in the in-process tier.
    pub local_ttl: Duration,

    /// Relative expiration of entries written to the shared tier. Must exceed `local_ttl`.
    pub shared_ttl: Duration,

    /// Breaker guarding shared tier reads.
    pub read_breaker: BreakerOptions,

    /// Breaker guarding shared tier writes.
    pub write_breaker: BreakerOptions,
}

impl Default for TieredCacheOptions {
    fn default() -> Self {
        Self {
            local_ttl: DEFAULT_LOCAL_TTL,
            shared_ttl: DEFAULT_SHARED_TTL,
            read_breaker: BreakerOptions::default(),
            write_breaker: BreakerOptions::default(),
        }
    }
}

impl TieredCacheOptions {
    /// Checks that the options describe a working cache.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.local_ttl.is_zero() {
            return Err(ConfigError::ZeroLocalTtl);
        }

        if self.shared_ttl <= self.local_ttl {
            return Err(ConfigError::SharedTtlNotLonger {
                local: self.local_ttl,
                shared: self.shared_ttl,
            });
        }

        for (breaker, options) in [("read", &self.read_breaker), ("write", &self.write_breaker)] {
            if options.failure_threshold == 0 {
                return Err(ConfigError::ZeroFailureThreshold { breaker });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        TieredCacheOptions::default().validate().unwrap();
    }

    #[test]
    fn shared_ttl_must_exceed_local_ttl() {
        let options = TieredCacheOptions {
            shared_ttl: DEFAULT_LOCAL_TTL,
            ..TieredCacheOptions::default()
        };

        assert_eq!(
            options.validate(),
            Err(ConfigError::SharedTtlNotLonger {
                local: DEFAULT_LOCAL_TTL,
                shared: DEFAULT_LOCAL_TTL,
            })
        );
    }

    #[test]
    fn zero_local_ttl_is_rejected() {
        let options = TieredCacheOptions {
            local_ttl: Duration::ZERO,
            ..TieredCacheOptions::default()
        };

        assert_eq!(options.validate(), Err(ConfigError::ZeroLocalTtl));
    }

    #[test]
    fn zero_threshold_names_the_breaker() {
        let mut options = TieredCacheOptions::default();
        options.write_breaker.failure_threshold = 0;

        assert_eq!(options.validate(), Err(ConfigError::ZeroFailureThreshold { breaker: "write" }));
    }

    #[test]
    fn empty_document_yields_defaults() {
        let options: TieredCacheOptions = serde_json::from_str("{}").unwrap();

        assert_eq!(options, TieredCacheOptions::default());
    }
}

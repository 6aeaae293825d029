// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types returned by the tiered cache.

use std::sync::Arc;
use std::time::Duration;

/// An error from [`TieredCache::get_or_create`](crate::TieredCache::get_or_create).
///
/// Shared tier failures never show up here; they are absorbed by the cache. What
/// remains is either the factory's own error or a fault in the in-process tier.
#[derive(Debug, thiserror::Error)]
pub enum Error<E> {
    /// The value factory failed.
    ///
    /// Callers that were waiting on the same miss all receive the same error, hence
    /// the [`Arc`]. Display and source are those of the factory error itself.
    #[error(transparent)]
    Factory(Arc<E>),

    /// The value could not be encoded, or the in-process copy could not be decoded.
    #[error("cached payload could not be processed")]
    Codec(#[from] ballast_tier::Error),
}

impl<E> Error<E> {
    /// Returns the factory error, if this is one.
    #[must_use]
    pub fn factory_error(&self) -> Option<&E> {
        match self {
            Self::Factory(error) => Some(error),
            Self::Codec(_) => None,
        }
    }

    /// Returns `true` if the factory failed.
    #[must_use]
    pub fn is_factory(&self) -> bool {
        matches!(self, Self::Factory(_))
    }
}

impl<E> Clone for Error<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Factory(error) => Self::Factory(Arc::clone(error)),
            Self::Codec(error) => Self::Codec(error.clone()),
        }
    }
}

/// A tiered cache configuration that cannot work as intended.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The shared tier would drop entries before the in-process tier refreshes them.
    #[error("shared tier ttl ({shared:?}) must be longer than the local tier ttl ({local:?})")]
    SharedTtlNotLonger {
        /// The configured in-process ttl.
        local: Duration,
        /// The configured shared tier ttl.
        shared: Duration,
    },

    /// The in-process ttl is zero, so nothing would ever be cached locally.
    #[error("local tier ttl must be greater than zero")]
    ZeroLocalTtl,

    /// A breaker would trip before the first failure is counted.
    #[error("{breaker} breaker failure threshold must be at least 1")]
    ZeroFailureThreshold {
        /// Which breaker is misconfigured, `read` or `write`.
        breaker: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use super::*;

    #[test]
    fn factory_error_is_transparent() {
        let error: Error<io::Error> = Error::Factory(Arc::new(io::Error::other("database offline")));

        assert_eq!(error.to_string(), "database offline");
        assert!(error.is_factory());
        assert_eq!(error.factory_error().map(io::Error::kind), Some(io::ErrorKind::Other));
    }

    #[test]
    fn codec_error_exposes_cause_as_source() {
        let error: Error<io::Error> = ballast_tier::Error::from_message("trailing characters").into();

        assert_eq!(error.to_string(), "cached payload could not be processed");
        assert_eq!(error.source().map(ToString::to_string).as_deref(), Some("trailing characters"));
        assert!(error.factory_error().is_none());
    }

    #[test]
    fn clone_shares_factory_error() {
        let error: Error<io::Error> = Error::Factory(Arc::new(io::Error::other("x")));
        let Error::Factory(original) = &error else { unreachable!() };
        let Error::Factory(cloned) = error.clone() else { unreachable!() };

        assert!(Arc::ptr_eq(original, &cloned));
    }

    #[test]
    fn config_error_messages() {
        let error = ConfigError::SharedTtlNotLonger {
            local: Duration::from_secs(10),
            shared: Duration::from_secs(5),
        };
        assert_eq!(error.to_string(), "shared tier ttl (5s) must be longer than the local tier ttl (10s)");

        let error = ConfigError::ZeroFailureThreshold { breaker: "write" };
        assert_eq!(error.to_string(), "write breaker failure threshold must be at least 1");
    }
}

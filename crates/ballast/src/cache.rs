// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The tiered read-through cache.

use std::sync::Arc;
use std::time::Duration;

use ballast_tier::{Bytes, Codec, Envelope, JsonCodec, LocalEntry, LocalTier, SharedTier};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tripwire::{BreakerError, CircuitBreaker};

use crate::telemetry::{CacheActivity, CacheTelemetry};
use crate::{Error, TieredCacheBuilder};

/// Breaker type guarding the shared tier.
pub type SharedBreaker = CircuitBreaker<ballast_tier::Error>;

/// A read-through cache over an in-process tier and a shared tier.
///
/// [`get_or_create`](Self::get_or_create) serves a key from the in-process tier when it
/// can. On a miss, exactly one caller per key consults the shared tier through a read
/// breaker, falls back to the caller's factory if the shared tier has nothing (or is
/// unreachable), writes the new value back through a write breaker, and populates the
/// in-process tier for everyone waiting on that key.
///
/// Shared tier failures never reach the caller. They only trip the breakers, after
/// which the cache stops touching the shared tier until a probe succeeds.
///
/// Factory results of `None` are cached and replayed like any other value.
///
/// # Examples
///
/// ```
/// use ballast::TieredCache;
/// use ballast_memory::MemoryTier;
/// use ballast_tier::testing::MockSharedTier;
///
/// # futures::executor::block_on(async {
/// let cache = TieredCache::builder(MemoryTier::new(), MockSharedTier::new()).build().unwrap();
///
/// let color = cache
///     .get_or_create("user:42:color", || async { Ok::<_, std::io::Error>(Some("teal".to_string())) })
///     .await
///     .unwrap();
/// assert_eq!(color.as_deref(), Some("teal"));
///
/// // Served in-process; the factory is not called again.
/// let color: Option<String> = cache
///     .get_or_create("user:42:color", || async { Err(std::io::Error::other("not called")) })
///     .await
///     .unwrap();
/// assert_eq!(color.as_deref(), Some("teal"));
/// # });
/// ```
#[derive(Debug)]
pub struct TieredCache<L, S, C = JsonCodec> {
    pub(crate) name: &'static str,
    pub(crate) local: L,
    pub(crate) shared: S,
    pub(crate) codec: C,
    pub(crate) read_breaker: SharedBreaker,
    pub(crate) write_breaker: SharedBreaker,
    pub(crate) local_ttl: Duration,
    pub(crate) shared_ttl: Duration,
    pub(crate) telemetry: CacheTelemetry,
}

impl<L, S> TieredCache<L, S, JsonCodec> {
    /// Creates a builder for a cache over `local` and `shared`.
    #[must_use]
    pub fn builder(local: L, shared: S) -> TieredCacheBuilder<L, S, JsonCodec> {
        TieredCacheBuilder::new(local, shared)
    }
}

impl<L, S, C> TieredCache<L, S, C> {
    /// Returns the name reported in telemetry.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the breaker guarding shared tier reads.
    #[must_use]
    pub fn read_breaker(&self) -> &SharedBreaker {
        &self.read_breaker
    }

    /// Returns the breaker guarding shared tier writes.
    #[must_use]
    pub fn write_breaker(&self) -> &SharedBreaker {
        &self.write_breaker
    }

    /// Returns the in-process tier.
    #[must_use]
    pub fn local(&self) -> &L {
        &self.local
    }

    /// Returns the shared tier.
    #[must_use]
    pub fn shared(&self) -> &S {
        &self.shared
    }

    /// Returns how long values stay in the in-process tier.
    #[must_use]
    pub fn local_ttl(&self) -> Duration {
        self.local_ttl
    }

    /// Returns the expiration requested for shared tier writes.
    #[must_use]
    pub fn shared_ttl(&self) -> Duration {
        self.shared_ttl
    }
}

impl<L: LocalTier, S, C> TieredCache<L, S, C> {
    /// Drops the in-process copy of `key`, so the next lookup consults the shared tier.
    pub async fn evict_local(&self, key: &str) {
        self.local.invalidate(key).await;
    }

    /// Drops every in-process entry.
    pub fn clear_local(&self) {
        self.local.clear();
    }

    /// Returns the approximate number of in-process entries.
    #[must_use]
    pub fn local_len(&self) -> u64 {
        self.local.len()
    }
}

impl<L, S, C> TieredCache<L, S, C>
where
    L: LocalTier,
    S: SharedTier,
    C: Codec,
{
    /// Returns the value for `key`, creating it with `factory` if no tier has it.
    ///
    /// `factory` runs at most once per call, and only when neither tier holds the key.
    /// A `None` from the factory is cached like a value. Concurrent callers that miss
    /// the same key share a single lookup and receive the same result.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Factory`] when the factory fails; nothing is cached in that case.
    /// Returns [`Error::Codec`] when the value cannot be encoded or the in-process copy
    /// cannot be decoded as `T`.
    pub async fn get_or_create<T, E, F, Fut>(&self, key: &str, factory: F) -> Result<Option<T>, Error<E>>
    where
        T: Serialize + DeserializeOwned + Send,
        E: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<Option<T>, E>> + Send,
    {
        // Set only when this call populated the entry, so its value needs no second decode.
        let mut loaded: Option<Option<T>> = None;
        let populate = async {
            self.telemetry.record(self.name, CacheActivity::Miss);
            let (payload, value) = self.load::<T, E, F, Fut>(key, factory).await?;
            loaded = Some(value);
            Ok::<_, Error<E>>(LocalEntry::new(payload, self.local_ttl))
        };

        let entry = self
            .local
            .get_or_populate(key, populate)
            .await
            .map_err(|error: Arc<Error<E>>| (*error).clone())?;

        if let Some(value) = loaded {
            return Ok(value);
        }

        self.telemetry.record(self.name, CacheActivity::Hit);
        let envelope: Envelope<T> = self.codec.decode(entry.payload())?;
        Ok(envelope.into_option())
    }

    /// Produces the encoded envelope and its value for a key that missed the in-process tier.
    async fn load<T, E, F, Fut>(&self, key: &str, factory: F) -> Result<(Bytes, Option<T>), Error<E>>
    where
        T: Serialize + DeserializeOwned + Send,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
    {
        let read_succeeded = match self.read_breaker.execute(|| self.shared.get(key)).await {
            Ok(Some(payload)) => {
                match self.codec.decode::<Envelope<T>>(&payload) {
                    Ok(envelope) => {
                        self.telemetry.record(self.name, CacheActivity::SharedHit);
                        return Ok((payload, envelope.into_option()));
                    }
                    // The stored payload is unusable; treat it as a miss and overwrite it.
                    Err(error) => self.telemetry.record_error(self.name, CacheActivity::SharedPayloadInvalid, &error),
                }
                true
            }
            Ok(None) => {
                self.telemetry.record(self.name, CacheActivity::SharedMiss);
                true
            }
            Err(error) => {
                self.record_breaker_error(&error, CacheActivity::SharedReadRejected, CacheActivity::SharedReadFailed);
                false
            }
        };

        self.telemetry.record(self.name, CacheActivity::FactoryInvoked);
        let value = factory().await.map_err(|error| Error::Factory(Arc::new(error)))?;
        let envelope = Envelope::from(value);
        let payload = self.codec.encode(&envelope)?;

        if read_succeeded && self.read_breaker.is_closed() {
            match self
                .write_breaker
                .execute(|| self.shared.set(key, payload.clone(), self.shared_ttl))
                .await
            {
                Ok(()) => self.telemetry.record(self.name, CacheActivity::SharedWritten),
                Err(error) => {
                    self.record_breaker_error(&error, CacheActivity::SharedWriteRejected, CacheActivity::SharedWriteFailed);
                }
            }
        } else {
            self.telemetry.record(self.name, CacheActivity::SharedWriteSkipped);
        }

        Ok((payload, envelope.into_option()))
    }

    fn record_breaker_error(&self, error: &BreakerError<ballast_tier::Error>, rejected: CacheActivity, failed: CacheActivity) {
        match error {
            BreakerError::Open { .. } => self.telemetry.record(self.name, rejected),
            BreakerError::Failed(cause) => self.telemetry.record_error(self.name, failed, cause),
        }
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-process tier backed by moka.

use std::sync::Arc;
use std::time::{Duration, Instant};

use ballast_tier::{LocalEntry, LocalTier};
use moka::Expiry;
use moka::future::Cache;

use crate::MemoryTierBuilder;

/// An in-process [`LocalTier`] backed by a moka concurrent cache.
///
/// Every entry expires [`LocalEntry::ttl`] after it was inserted; reads do not extend
/// its life. Concurrent misses on the same key are coalesced by moka, so the populate
/// future runs once and every waiter receives its result.
///
/// Clones share the same storage.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use ballast_memory::MemoryTier;
/// use ballast_tier::{Bytes, LocalEntry, LocalTier};
///
/// # futures::executor::block_on(async {
/// let tier = MemoryTier::new();
/// let entry = tier
///     .get_or_populate("k", async {
///         Ok::<_, std::io::Error>(LocalEntry::new(Bytes::from_static(b"v"), Duration::from_secs(10)))
///     })
///     .await
///     .unwrap();
///
/// assert_eq!(entry.payload(), &Bytes::from_static(b"v"));
/// assert!(tier.get("k").await.is_some());
/// # });
/// ```
#[derive(Clone, Debug)]
pub struct MemoryTier {
    cache: Cache<String, LocalEntry>,
}

impl Default for MemoryTier {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTier {
    /// Creates an unbounded tier.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a tier holding at most `max_capacity` entries.
    #[must_use]
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self::builder().max_capacity(max_capacity).build()
    }

    /// Creates a builder for configuring a tier.
    #[must_use]
    pub fn builder() -> MemoryTierBuilder {
        MemoryTierBuilder::new()
    }

    pub(crate) fn from_builder(builder: &MemoryTierBuilder) -> Self {
        let mut moka_builder = Cache::builder().expire_after(EntryTtl);

        if let Some(capacity) = builder.max_capacity {
            moka_builder = moka_builder.max_capacity(capacity);
        }

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        if let Some(name) = builder.name.as_deref() {
            moka_builder = moka_builder.name(name);
        }

        Self {
            cache: moka_builder.build(),
        }
    }

    /// Returns the name given to the tier, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.cache.name()
    }

    /// Applies pending evictions and expirations so [`len`](LocalTier::len) is exact.
    pub async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

impl LocalTier for MemoryTier {
    async fn get_or_populate<F, E>(&self, key: &str, populate: F) -> Result<LocalEntry, Arc<E>>
    where
        F: Future<Output = Result<LocalEntry, E>> + Send,
        E: Send + Sync + 'static,
    {
        self.cache.try_get_with_by_ref(key, populate).await
    }

    async fn get(&self, key: &str) -> Option<LocalEntry> {
        self.cache.get(key).await
    }

    async fn invalidate(&self, key: &str) {
        self.cache.invalidate(key).await;
    }

    fn clear(&self) {
        self.cache.invalidate_all();
    }

    fn len(&self) -> u64 {
        self.cache.entry_count()
    }
}

/// Expires each entry `ttl` after it was created or last replaced.
struct EntryTtl;

impl Expiry<String, LocalEntry> for EntryTtl {
    fn expire_after_create(&self, _key: &String, value: &LocalEntry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl())
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &LocalEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl())
    }
}

#[cfg(test)]
mod tests {
    use ballast_tier::Bytes;

    use super::*;

    fn entry(ttl: Duration) -> LocalEntry {
        LocalEntry::new(Bytes::from_static(b"payload"), ttl)
    }

    #[test]
    fn expiry_uses_entry_ttl_on_create_and_update() {
        let now = Instant::now();
        let key = "k".to_owned();

        assert_eq!(
            EntryTtl.expire_after_create(&key, &entry(Duration::from_secs(3)), now),
            Some(Duration::from_secs(3))
        );
        assert_eq!(
            EntryTtl.expire_after_update(&key, &entry(Duration::from_secs(7)), now, Some(Duration::from_secs(1))),
            Some(Duration::from_secs(7))
        );
    }

    #[test]
    fn expiry_does_not_slide_on_read() {
        let now = Instant::now();
        let key = "k".to_owned();
        let remaining = Some(Duration::from_secs(2));

        assert_eq!(
            EntryTtl.expire_after_read(&key, &entry(Duration::from_secs(10)), now, remaining, now),
            remaining
        );
    }

    #[test]
    fn builder_name_is_reported() {
        let tier = MemoryTier::builder().name("users").build();

        assert_eq!(tier.name(), Some("users"));
        assert_eq!(MemoryTier::new().name(), None);
    }
}

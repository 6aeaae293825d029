// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The in-process tier that fronts the shared tier.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

/// An encoded payload held by a [`LocalTier`], with its time to live.
///
/// Expiration is absolute: the entry expires `ttl` after it was inserted, no matter how
/// often it is read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalEntry {
    payload: Bytes,
    ttl: Duration,
}

impl LocalEntry {
    /// Creates an entry that expires `ttl` after insertion.
    #[must_use]
    pub fn new(payload: Bytes, ttl: Duration) -> Self {
        Self { payload, ttl }
    }

    /// Returns the encoded payload.
    #[must_use]
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Returns the time to live measured from insertion.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Consumes the entry and returns its payload.
    #[must_use]
    pub fn into_payload(self) -> Bytes {
        self.payload
    }
}

/// A thread-safe, in-process key-value store with per-key single flight.
///
/// Lookup and population are atomic per key: when several callers miss on the same key
/// at once, exactly one of them runs `populate` and the others wait for its result.
/// Callers on different keys never wait for each other.
///
/// Operations on a local tier are infallible; the only error `get_or_populate` reports
/// is the one produced by `populate`, shared with every caller that waited on it.
pub trait LocalTier: Send + Sync {
    /// Returns the entry for `key`, running `populate` to create it on a miss.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `populate`. Nothing is stored in that case, so the
    /// next caller runs its own `populate`.
    fn get_or_populate<F, E>(&self, key: &str, populate: F) -> impl Future<Output = Result<LocalEntry, Arc<E>>> + Send
    where
        F: Future<Output = Result<LocalEntry, E>> + Send,
        E: Send + Sync + 'static;

    /// Returns the entry for `key` without populating it.
    fn get(&self, key: &str) -> impl Future<Output = Option<LocalEntry>> + Send;

    /// Removes the entry for `key`.
    fn invalidate(&self, key: &str) -> impl Future<Output = ()> + Send;

    /// Removes every entry.
    fn clear(&self);

    /// Returns the number of live entries.
    ///
    /// The count may lag behind very recent writes and evictions.
    fn len(&self) -> u64;

    /// Returns `true` if the tier holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

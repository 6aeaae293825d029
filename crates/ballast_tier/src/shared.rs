// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The out-of-process tier shared between cache instances.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::Result;

/// A shared, out-of-process key-value store such as a remote cache cluster.
///
/// Implementations wrap a client library. Any failure, including a client-side
/// timeout, is reported as an [`Error`](crate::Error); the caching layer counts these
/// failures against a circuit breaker and never surfaces them to its callers.
///
/// Keys are compared byte for byte with no normalization.
pub trait SharedTier: Send + Sync {
    /// Reads the payload stored under `key`, or `None` when nothing is stored.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Bytes>>> + Send;

    /// Stores `payload` under `key`, expiring `ttl` after the write.
    fn set(&self, key: &str, payload: Bytes, ttl: Duration) -> impl Future<Output = Result<()>> + Send;
}

impl<S: SharedTier> SharedTier for Arc<S> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Bytes>>> + Send {
        (**self).get(key)
    }

    fn set(&self, key: &str, payload: Bytes, ttl: Duration) -> impl Future<Output = Result<()>> + Send {
        (**self).set(key, payload, ttl)
    }
}

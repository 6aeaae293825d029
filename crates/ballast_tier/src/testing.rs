// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock shared tier for testing.
//!
//! [`MockSharedTier`] stores payloads in memory, records every operation, and supports
//! failure injection for exercising the error paths of code built on [`SharedTier`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::{Error, Result, SharedTier};

/// A recorded shared tier operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SharedOp {
    /// A read of the given key.
    Get(String),
    /// A write of the given key.
    Set {
        /// The key that was written.
        key: String,
        /// The payload that was written.
        payload: Bytes,
        /// The relative expiration requested for the write.
        ttl: Duration,
    },
}

impl SharedOp {
    /// Returns the key the operation targeted.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Get(key) | Self::Set { key, .. } => key,
        }
    }
}

type FailPredicate = Box<dyn Fn(&SharedOp) -> bool + Send + Sync>;

/// A configurable in-memory [`SharedTier`] for tests.
///
/// Clones share the same storage, operation log, and failure predicate, so a test can
/// hand one clone to the code under test and inspect another. Stored payloads never
/// expire; the requested TTL is only recorded.
///
/// Failed operations are recorded too, which lets a test count attempts that reached
/// the tier separately from attempts that a circuit breaker rejected.
///
/// # Examples
///
/// ```
/// use ballast_tier::SharedTier;
/// use ballast_tier::testing::{MockSharedTier, SharedOp};
///
/// # futures::executor::block_on(async {
/// let tier = MockSharedTier::new();
/// tier.fail_when(|op| matches!(op, SharedOp::Set { .. }));
///
/// assert!(tier.get("k").await.unwrap().is_none());
/// assert!(tier.set("k", "v".into(), std::time::Duration::from_secs(1)).await.is_err());
/// assert_eq!((tier.reads(), tier.writes()), (1, 1));
/// # });
/// ```
#[derive(Clone, Default)]
pub struct MockSharedTier {
    data: Arc<Mutex<HashMap<String, Bytes>>>,
    operations: Arc<Mutex<Vec<SharedOp>>>,
    fail_when: Arc<Mutex<Option<FailPredicate>>>,
}

impl std::fmt::Debug for MockSharedTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSharedTier")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl MockSharedTier {
    /// Creates an empty mock tier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a payload directly, without recording an operation.
    pub fn seed(&self, key: impl Into<String>, payload: impl Into<Bytes>) {
        self.data.lock().insert(key.into(), payload.into());
    }

    /// Returns the payload stored under `key`.
    #[must_use]
    pub fn payload(&self, key: &str) -> Option<Bytes> {
        self.data.lock().get(key).cloned()
    }

    /// Returns the number of stored payloads.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Sets a predicate that decides which operations fail.
    ///
    /// Replaces any previous predicate.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&SharedOp) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Removes the failure predicate so every operation succeeds.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns every recorded operation in order.
    #[must_use]
    pub fn operations(&self) -> Vec<SharedOp> {
        self.operations.lock().clone()
    }

    /// Forgets the recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    /// Returns the number of recorded reads, failed ones included.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.count(|op| matches!(op, SharedOp::Get(_)))
    }

    /// Returns the number of recorded writes, failed ones included.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.count(|op| matches!(op, SharedOp::Set { .. }))
    }

    fn count(&self, predicate: impl Fn(&SharedOp) -> bool) -> usize {
        self.operations.lock().iter().filter(|op| predicate(op)).count()
    }

    /// Records `op` and reports whether it should fail.
    fn record(&self, op: SharedOp) -> bool {
        let fail = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op));
        self.operations.lock().push(op);
        fail
    }
}

impl SharedTier for MockSharedTier {
    async fn get(&self, key: &str) -> Result<Option<Bytes>> {
        if self.record(SharedOp::Get(key.to_owned())) {
            return Err(Error::from_message("mock: get failed"));
        }
        Ok(self.payload(key))
    }

    async fn set(&self, key: &str, payload: Bytes, ttl: Duration) -> Result<()> {
        let op = SharedOp::Set {
            key: key.to_owned(),
            payload: payload.clone(),
            ttl,
        };
        if self.record(op) {
            return Err(Error::from_message("mock: set failed"));
        }
        self.data.lock().insert(key.to_owned(), payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips_and_records() {
        let tier = MockSharedTier::new();

        tier.set("a", Bytes::from_static(b"1"), Duration::from_secs(30)).await.unwrap();
        assert_eq!(tier.get("a").await.unwrap(), Some(Bytes::from_static(b"1")));

        assert_eq!(
            tier.operations(),
            vec![
                SharedOp::Set {
                    key: "a".to_owned(),
                    payload: Bytes::from_static(b"1"),
                    ttl: Duration::from_secs(30),
                },
                SharedOp::Get("a".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn failed_set_is_recorded_but_not_stored() {
        let tier = MockSharedTier::new();
        tier.fail_when(|op| matches!(op, SharedOp::Set { .. }));

        let error = tier.set("a", Bytes::from_static(b"1"), Duration::from_secs(1)).await.unwrap_err();

        assert!(error.to_string().contains("mock: set failed"));
        assert_eq!(tier.writes(), 1);
        assert_eq!(tier.entry_count(), 0);
    }

    #[tokio::test]
    async fn predicate_can_target_one_key() {
        let tier = MockSharedTier::new();
        tier.seed("good", "g");
        tier.seed("bad", "b");
        tier.fail_when(|op| op.key() == "bad");

        assert!(tier.get("good").await.is_ok());
        assert!(tier.get("bad").await.is_err());

        tier.clear_failures();
        assert_eq!(tier.get("bad").await.unwrap(), Some(Bytes::from_static(b"b")));
    }

    #[tokio::test]
    async fn clones_share_state() {
        let tier = MockSharedTier::new();
        let clone = tier.clone();

        clone.set("k", Bytes::from_static(b"v"), Duration::from_secs(1)).await.unwrap();
        assert_eq!(tier.payload("k"), Some(Bytes::from_static(b"v")));

        tier.clear_operations();
        assert!(clone.operations().is_empty());
    }
}

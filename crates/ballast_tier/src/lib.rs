// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Tier abstractions for a resilient read-through cache.
//!
//! A cache built on this crate has two tiers:
//!
//! - a [`LocalTier`]: in-process, fast, infallible, with per-key single flight;
//! - a [`SharedTier`]: out-of-process, shared between instances, and allowed to fail.
//!
//! Both tiers store encoded [`Envelope`]s so that "the value is absent" can be cached
//! and replayed just like a present value. A [`Codec`] turns envelopes into bytes;
//! [`JsonCodec`] is the default.
//!
//! # Implementing a Shared Tier
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Mutex;
//! use std::time::Duration;
//!
//! use ballast_tier::{Bytes, Error, SharedTier};
//!
//! struct MapTier(Mutex<HashMap<String, Bytes>>);
//!
//! impl SharedTier for MapTier {
//!     async fn get(&self, key: &str) -> Result<Option<Bytes>, Error> {
//!         let map = self.0.lock().map_err(|e| Error::from_message(e.to_string()))?;
//!         Ok(map.get(key).cloned())
//!     }
//!
//!     async fn set(&self, key: &str, payload: Bytes, _ttl: Duration) -> Result<(), Error> {
//!         let mut map = self.0.lock().map_err(|e| Error::from_message(e.to_string()))?;
//!         map.insert(key.to_owned(), payload);
//!         Ok(())
//!     }
//! }
//! ```
//!
//! # Features
//!
//! - `test-util`: enables the [`testing`] module with [`MockSharedTier`](testing::MockSharedTier).

mod codec;
mod envelope;
pub mod error;
mod local;
mod shared;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(no_inline)]
pub use bytes::Bytes;
#[doc(inline)]
pub use codec::{Codec, JsonCodec};
#[doc(inline)]
pub use envelope::Envelope;
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use local::{LocalEntry, LocalTier};
#[doc(inline)]
pub use shared::SharedTier;

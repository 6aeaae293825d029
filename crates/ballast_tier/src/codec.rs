// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Value serialization for cached payloads.

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Converts cached values to and from bytes.
///
/// Both tiers store encoded payloads, so a codec must round-trip every value it
/// encodes, including an [`Envelope::Absent`](crate::Envelope::Absent).
pub trait Codec: Send + Sync {
    /// Encodes a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be represented in this format.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Bytes>;

    /// Decodes a value previously produced by [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns an error if `payload` is not a valid encoding of `T`.
    fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T>;
}

/// A [`Codec`] that stores values as JSON.
///
/// # Examples
///
/// ```
/// use ballast_tier::{Codec, Envelope, JsonCodec};
///
/// let payload = JsonCodec.encode(&Envelope::Present("blue")).unwrap();
/// let decoded: Envelope<String> = JsonCodec.decode(&payload).unwrap();
/// assert_eq!(decoded, Envelope::Present("blue".to_string()));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Bytes> {
        serde_json::to_vec(value).map(Bytes::from).map_err(Error::caused_by)
    }

    fn decode<T: DeserializeOwned>(&self, payload: &[u8]) -> Result<T> {
        serde_json::from_slice(payload).map_err(Error::caused_by)
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use serde::{Deserialize, Serialize};

/// A cached result that distinguishes "the value is absent" from "nothing is cached".
///
/// A tier that returns no entry means the key was never populated (or expired). A tier
/// that returns an encoded [`Envelope::Absent`] means the factory ran and found nothing,
/// and that answer is itself cached.
///
/// The serialized form carries an explicit discriminant:
///
/// ```
/// use ballast_tier::Envelope;
///
/// let present = serde_json::to_string(&Envelope::Present(42)).unwrap();
/// assert_eq!(present, r#"{"kind":"present","data":42}"#);
///
/// let absent = serde_json::to_string(&Envelope::<i32>::Absent).unwrap();
/// assert_eq!(absent, r#"{"kind":"absent"}"#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Envelope<T> {
    /// The factory produced a value.
    Present(T),
    /// The factory produced no value.
    Absent,
}

impl<T> Envelope<T> {
    /// Returns `true` if the envelope holds a value.
    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Converts the envelope into the value it carries, if any.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for Envelope<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

impl<T> From<Envelope<T>> for Option<T> {
    fn from(envelope: Envelope<T>) -> Self {
        envelope.into_option()
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring a [`MemoryTier`].

use crate::MemoryTier;

/// Builder for a [`MemoryTier`].
///
/// Keeps moka's configuration types out of the public API.
///
/// # Examples
///
/// ```
/// use ballast_memory::MemoryTier;
///
/// let tier = MemoryTier::builder()
///     .max_capacity(10_000)
///     .initial_capacity(256)
///     .name("profiles")
///     .build();
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryTierBuilder {
    pub(crate) max_capacity: Option<u64>,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) name: Option<String>,
}

impl MemoryTierBuilder {
    /// Creates a builder for an unbounded tier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of entries.
    ///
    /// Once full, the tier evicts entries using moka's `TinyLFU` policy. Without a cap
    /// the tier is bounded only by memory and by each entry's time to live.
    #[must_use]
    pub fn max_capacity(mut self, capacity: u64) -> Self {
        self.max_capacity = Some(capacity);
        self
    }

    /// Pre-allocates room for `capacity` entries.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Sets a name that moka reports in its debug output.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builds the tier.
    #[must_use]
    pub fn build(self) -> MemoryTier {
        MemoryTier::from_builder(&self)
    }
}

// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! In-process cache tier backed by moka.
//!
//! [`MemoryTier`] implements [`LocalTier`](ballast_tier::LocalTier) on top of a moka
//! concurrent cache: per-key single flight for population, and absolute per-entry
//! expiration taken from each [`LocalEntry`](ballast_tier::LocalEntry). Use
//! [`MemoryTierBuilder`] to bound its capacity without exposing moka types.

pub mod builder;
pub mod tier;

#[doc(inline)]
pub use builder::MemoryTierBuilder;
#[doc(inline)]
pub use tier::MemoryTier;

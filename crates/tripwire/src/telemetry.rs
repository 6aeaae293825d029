// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured log events for breaker transitions.
//!
//! Every function compiles to nothing when the `logs` feature is disabled.

#![cfg_attr(
    not(feature = "logs"),
    expect(unused_variables, reason = "arguments are only consumed by log events")
)]

pub(crate) fn tripped(name: &'static str, failures: u32) {
    #[cfg(feature = "logs")]
    tracing::warn!(breaker.name = name, breaker.failures = failures, "breaker.tripped");
}

pub(crate) fn half_opened(name: &'static str) {
    #[cfg(feature = "logs")]
    tracing::info!(breaker.name = name, "breaker.half_opened");
}

pub(crate) fn reset(name: &'static str) {
    #[cfg(feature = "logs")]
    tracing::info!(breaker.name = name, "breaker.reset");
}

pub(crate) fn probe_failed(name: &'static str) {
    #[cfg(feature = "logs")]
    tracing::warn!(breaker.name = name, "breaker.probe_failed");
}

pub(crate) fn rejected(name: &'static str) {
    #[cfg(feature = "logs")]
    tracing::debug!(breaker.name = name, "breaker.rejected");
}

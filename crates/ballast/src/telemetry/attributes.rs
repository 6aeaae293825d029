// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#[cfg(any(feature = "metrics", test))]
pub(crate) const CACHE_NAME: &str = "cache.name";

#[cfg(any(feature = "metrics", test))]
pub(crate) const CACHE_ACTIVITY: &str = "cache.activity";

#[cfg(test)]
pub(crate) const CACHE_ERROR: &str = "cache.error";

#[cfg(test)]
pub(crate) const CACHE_EVENT: &str = "cache.event";

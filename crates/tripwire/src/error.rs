// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Errors returned by [`CircuitBreaker`](crate::CircuitBreaker).

/// The outcome of a call that did not succeed.
///
/// The two variants separate "the dependency was never called" from "the dependency
/// was called and failed", so callers can react to each without inspecting the
/// underlying error type.
///
/// # Examples
///
/// ```
/// use tripwire::{BreakerError, CircuitBreaker};
///
/// let breaker = CircuitBreaker::<String>::builder().failure_threshold(1).build();
///
/// let failed = breaker.call(|| Err::<(), _>("timeout".to_string()));
/// assert!(matches!(failed, Err(BreakerError::Failed(_))));
///
/// let rejected = breaker.call(|| Ok::<_, String>(()));
/// assert!(rejected.is_err_and(|e| e.is_open()));
/// ```
#[derive(Clone, Debug, thiserror::Error)]
pub enum BreakerError<E> {
    /// The breaker is open and the call was not attempted.
    #[error("circuit is open, the call was not attempted")]
    Open {
        /// The failure that most recently tripped the breaker.
        #[source]
        last_failure: Option<E>,
    },

    /// The call was attempted and failed.
    #[error(transparent)]
    Failed(E),
}

impl<E> BreakerError<E> {
    /// Returns `true` if the call was rejected without being attempted.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    /// Returns the underlying failure: the action's error for [`Failed`](Self::Failed),
    /// or the tripping failure for [`Open`](Self::Open).
    #[must_use]
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Open { last_failure } => last_failure,
            Self::Failed(error) => Some(error),
        }
    }
}

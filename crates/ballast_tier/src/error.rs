// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Error types for tier and codec operations.

/// An error from a shared tier or a codec.
///
/// This is an opaque error that wraps whatever the underlying client or serializer
/// reported. Use [`std::error::Error::source()`] to reach the underlying cause. It is
/// cheap to clone, which lets a circuit breaker record it as the last failure while
/// also handing it back to the caller that observed it.
///
/// # Examples
///
/// ```
/// use ballast_tier::Error;
///
/// let error = Error::from_message("connection reset");
/// assert!(error.to_string().contains("connection reset"));
/// ```
#[ohno::error]
#[derive(Clone)]
pub struct Error {}

impl Error {
    /// Creates an error from a message or any type that converts into an error.
    ///
    /// # Examples
    ///
    /// ```
    /// use ballast_tier::Error;
    ///
    /// let error = Error::from_message("shard unavailable");
    /// ```
    pub fn from_message(cause: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::caused_by(cause)
    }
}

/// A specialized [`Result`] type for tier and codec operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use super::*;

    #[test]
    fn display_contains_the_cause_message() {
        let error = Error::from_message("shard unavailable");
        let display = format!("{error}");
        assert!(display.contains("shard unavailable"), "got: {display}");
    }

    #[test]
    fn source_can_be_downcast() {
        let error = Error::caused_by(io::Error::new(io::ErrorKind::TimedOut, "read timed out"));

        let io_error = error
            .source()
            .and_then(|source| source.downcast_ref::<io::Error>())
            .expect("source should be an io::Error");
        assert_eq!(io_error.kind(), io::ErrorKind::TimedOut);
    }

    #[test]
    fn clones_keep_the_message() {
        let error = Error::from_message("boom");
        let clone = error.clone();

        assert!(format!("{clone}").contains("boom"));
        assert!(format!("{clone:?}").contains("boom"));
    }
}

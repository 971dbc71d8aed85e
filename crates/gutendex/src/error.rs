//! Lookup Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A lookup error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for lookup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The response body could not be decoded into search results.
    #[display("malformed JSON response: {_0}")]
    MalformedJson(#[error(not(source))] String),
    /// The request never produced a response (DNS, TLS, timeout...).
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// The service answered with a non-success status code.
    #[display("lookup service responded with HTTP {_0}")]
    Status(#[error(not(source))] u16),
    /// The client could not be constructed from the supplied settings.
    #[display("invalid lookup configuration: {_0}")]
    Configuration(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Nothing in this workspace retries automatically; this is a hint for
    /// whoever owns the retry policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Status(status) => *status == 429 || *status >= 500,
            Self::MalformedJson(_) | Self::Configuration(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::Network("timed out".to_string()), true)]
    #[case(ErrorKind::Status(429), true)]
    #[case(ErrorKind::Status(503), true)]
    #[case(ErrorKind::Status(404), false)]
    #[case(ErrorKind::MalformedJson("eof".to_string()), false)]
    fn test_is_retryable(#[case] kind: ErrorKind, #[case] expected: bool) {
        assert_eq!(kind.is_retryable(), expected);
    }
}

//! Error types for the [`query`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};

/// A query error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies why a catalog query was refused or failed.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A year outside of `min..=max` (the current year being the upper bound).
    #[display("year {year} is outside {min}..={max}")]
    InvalidYear {
        year: i32,
        min: i32,
        max: i32,
    },
    /// A range whose start comes after its end.
    #[display("invalid range: {start} is after {end}")]
    InvalidRange {
        start: i32,
        end: i32,
    },
    /// Comparing languages needs at least two distinct ones in the catalog.
    #[display("the catalog holds {_0} distinct language(s), at least 2 are needed")]
    InsufficientLanguages(#[error(not(source))] usize),
    /// Both sides of a comparison name the same language.
    #[display("cannot compare language {_0:?} with itself")]
    IdenticalLanguages(#[error(not(source))] String),
    /// Reading from the [catalog](folio_catalog::Repository) failed.
    #[display("catalog error")]
    Catalog,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Catalog)
    }
}

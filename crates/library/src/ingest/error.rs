//! Error types for the [`ingest`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};

/// An ingestion error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies why a candidate could not be catalogued.
///
/// All validation failures are raised before anything is written.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The candidate lacks an id or a usable title.
    #[display("invalid book: {_0}")]
    InvalidBook(#[error(not(source))] String),
    /// The candidate's first author has a blank name or an impossible lifespan.
    #[display("invalid author: {_0}")]
    InvalidAuthor(#[error(not(source))] String),
    /// The candidate credits no author at all.
    #[display("book {_0} has no author")]
    MissingAuthor(#[error(not(source))] u64),
    /// Reading from or writing to the [catalog](folio_catalog::Repository) failed.
    #[display("catalog error")]
    Catalog,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Catalog)
    }
}

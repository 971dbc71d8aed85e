//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Ingestion and queries have their own
//! error kinds in [`ingest`](crate::ingest) and [`query`](crate::query); this
//! covers the plain catalog pass-through operations of the
//! [`Librarian`](crate::Librarian).

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reading from or writing to the [catalog](folio_catalog::Repository) failed.
    #[display("catalog error")]
    Catalog,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Catalog => true,
        }
    }
}

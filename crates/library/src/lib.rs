//! Cataloguing and querying books.
//!
//! - [`ingest`] turns lookup candidates into catalogued books, resolving
//!   author identity along the way.
//! - [`query`] answers read-only questions: who was alive when, and how the
//!   catalog splits across languages.
//! - [`Librarian`] bundles both behind one handle.

pub mod error;
pub mod ingest;
mod librarian;
pub mod query;

pub use crate::ingest::{Ingest, Ingestor};
pub use crate::librarian::Librarian;

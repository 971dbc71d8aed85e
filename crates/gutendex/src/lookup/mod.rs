//! Lookup trait and implementations.
//!
//! A [`Lookup`] answers one question: which candidate book records match a
//! free-text title? The catalog only ever looks at the first answer.

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "http")]
pub use self::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, GutendexClient};
#[cfg(feature = "mock")]
pub use self::mock::MockLookup;

use crate::error::Result;
use crate::models::Candidate;
use async_trait::async_trait;
use std::sync::Arc;

pub type LookupHandle = Arc<dyn Lookup + Send + Sync>;

/// Source of candidate book records.
///
/// # Examples
///
/// ```
/// use folio_gutendex::{Lookup, error::Result, models::Candidate};
///
/// async fn best_match(lookup: &dyn Lookup, title: &str) -> Result<Option<Candidate>> {
///     Ok(lookup.search(title).await?.into_iter().next())
/// }
/// ```
#[async_trait]
pub trait Lookup: Send + Sync {
    /// Name of the lookup (used for logging only).
    fn name(&self) -> &str;

    /// Search for candidate records by title, in the source's relevance
    /// order. An empty list is a valid answer, not an error.
    async fn search(&self, title: &str) -> Result<Vec<Candidate>>;
}

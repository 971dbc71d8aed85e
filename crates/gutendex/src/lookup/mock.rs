//! In-memory lookup for testing.

use super::Lookup;
use crate::error::{ErrorKind, Result};
use crate::models::Candidate;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory lookup for testing.
///
/// Matches candidates whose title contains the search text, ignoring case,
/// in the order they were given. Can also be made to fail every search.
///
/// # Examples
///
/// ```
/// use folio_gutendex::{Lookup, lookup::MockLookup, models::Candidate};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let lookup = MockLookup::with_candidates([Candidate::new(1342, "Pride and Prejudice")]);
/// assert_eq!(lookup.search("pride").await?.len(), 1);
/// assert!(lookup.search("emma").await?.is_empty());
/// assert_eq!(lookup.calls(), 2);
/// # Ok(())
/// # }
/// ```
pub struct MockLookup {
    candidates: Vec<Candidate>,
    failure: Option<ErrorKind>,
    calls: AtomicUsize,
}

impl MockLookup {
    pub fn with_candidates(candidates: impl IntoIterator<Item = Candidate>) -> Self {
        Self {
            candidates: candidates.into_iter().collect(),
            failure: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A lookup whose every search fails with a network error.
    pub fn unavailable() -> Self {
        Self::failing(ErrorKind::Network("connection refused".to_string()))
    }

    pub fn failing(kind: ErrorKind) -> Self {
        Self {
            candidates: Vec::new(),
            failure: Some(kind),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of searches performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Lookup for MockLookup {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, title: &str) -> Result<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = &self.failure {
            exn::bail!(kind.clone());
        }
        let needle = title.trim().to_lowercase();
        Ok(self
            .candidates
            .iter()
            .filter(|candidate| {
                candidate.title.as_deref().is_some_and(|title| title.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let lookup = MockLookup::with_candidates([
            Candidate::new(1342, "Pride and Prejudice"),
            Candidate::new(158, "Emma"),
            Candidate::default(),
        ]);
        let found = lookup.search("PREJUDICE").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, Some(1342));
    }

    #[tokio::test]
    async fn test_unavailable() {
        let lookup = MockLookup::unavailable();
        let err = lookup.search("anything").await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(lookup.calls(), 1);
    }
}

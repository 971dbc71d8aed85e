//! Turning lookup candidates into catalogued books.
//!
//! Ingestion is idempotent on the external book id: cataloguing the same book
//! twice leaves one record and reports the second attempt as
//! [`Ingest::AlreadyCataloged`].

pub(crate) mod error;
mod resolve;

pub use self::error::{Error, ErrorKind, Result};
pub use self::resolve::{resolve_author, validate_author};
use exn::{OptionExt, ResultExt};
use folio_catalog::Repository;
use folio_catalog::models::{Book, Insert, NewAuthor, NewBook};
use folio_gutendex::LookupHandle;
use folio_gutendex::models::Candidate;
use tracing::instrument;

/// Outcome of an ingestion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ingest {
    /// The book was new and is now in the catalog.
    Cataloged(Book),
    /// A book with the same external id was already catalogued; it is
    /// returned unchanged.
    AlreadyCataloged(Book),
    /// The lookup had nothing matching the title (or could not be reached).
    NotFound,
}
impl Ingest {
    pub fn book(&self) -> Option<&Book> {
        match self {
            Self::Cataloged(book) | Self::AlreadyCataloged(book) => Some(book),
            Self::NotFound => None,
        }
    }
}

/// A candidate that passed validation, normalized and ready to write.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Prepared {
    id: u64,
    title: String,
    author: NewAuthor,
    language: Option<String>,
    download_count: Option<u64>,
    download_url: Option<String>,
}
impl Prepared {
    fn into_book(self, author_id: i64) -> NewBook {
        NewBook {
            id: self.id,
            title: self.title,
            author_id,
            language: self.language,
            download_count: self.download_count,
            download_url: self.download_url,
        }
    }
}

fn require_id(candidate: &Candidate) -> Result<u64> {
    candidate.id.ok_or_raise(|| ErrorKind::InvalidBook("missing id".to_string()))
}

fn require_title(id: u64, candidate: &Candidate) -> Result<&str> {
    let title = candidate.title.as_deref().map(str::trim).unwrap_or_default();
    if title.is_empty() {
        exn::bail!(ErrorKind::InvalidBook(format!("book {id} has a blank title")));
    }
    Ok(title)
}

/// Validate and normalize everything about a candidate that doesn't need the
/// catalog. Only the first author and the first language are kept.
fn prepare(id: u64, candidate: &Candidate) -> Result<Prepared> {
    let title = require_title(id, candidate)?;
    let person = candidate.first_author().ok_or_raise(|| ErrorKind::MissingAuthor(id))?;
    Ok(Prepared {
        id,
        title: title.to_string(),
        author: validate_author(person)?,
        language: candidate.first_language().map(|lang| lang.code),
        // The source occasionally reports negative counts.
        download_count: candidate.download_count.map(|count| count.max(0).unsigned_abs()),
        download_url: candidate.download_url().map(str::to_string),
    })
}

/// Coordinates lookup, validation, author resolution and persistence.
#[derive(Clone)]
pub struct Ingestor {
    repo: Repository,
    lookup: LookupHandle,
}

impl Ingestor {
    pub fn new(repo: Repository, lookup: LookupHandle) -> Self {
        Self { repo, lookup }
    }

    /// Search the lookup by title and catalogue the first candidate.
    ///
    /// Lookup failures are logged and reported as [`Ingest::NotFound`]; they
    /// are never retried here.
    #[instrument(skip(self), fields(lookup = self.lookup.name()))]
    pub async fn ingest(&self, title: &str) -> Result<Ingest> {
        let candidates = match self.lookup.search(title).await {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::warn!(retryable = err.is_retryable(), error = ?err, "lookup failed; treating as no match");
                return Ok(Ingest::NotFound);
            },
        };
        match candidates.into_iter().next() {
            Some(candidate) => self.ingest_candidate(&candidate).await,
            None => {
                tracing::info!("no candidates found");
                Ok(Ingest::NotFound)
            },
        }
    }

    /// Catalogue a single candidate record.
    ///
    /// Author resolution and the book insert share one transaction: if the
    /// insert fails, a newly created author is rolled back with it. If another
    /// ingestion catalogued the same id in the meantime, its book is returned
    /// as [`Ingest::AlreadyCataloged`].
    #[instrument(skip_all, fields(id = ?candidate.id))]
    pub async fn ingest_candidate(&self, candidate: &Candidate) -> Result<Ingest> {
        let id = require_id(candidate)?;
        require_title(id, candidate)?;
        if let Some(existing) = self.repo.get_book(id).await.or_raise(|| ErrorKind::Catalog)? {
            tracing::info!(id, title = %existing.title, "already catalogued");
            return Ok(Ingest::AlreadyCataloged(existing));
        }
        let prepared = prepare(id, candidate)?;

        let mut tx = self.repo.begin().await.or_raise(|| ErrorKind::Catalog)?;
        let author = resolve_author(&mut tx, &prepared.author).await?;
        let author_created = author.is_created();
        let author = author.into_inner();
        let book = prepared.into_book(author.id);
        match tx.insert_book(&book).await.or_raise(|| ErrorKind::Catalog)? {
            Insert::Created(book) => {
                tx.commit().await.or_raise(|| ErrorKind::Catalog)?;
                tracing::info!(id, title = %book.title, author = %author.name, author_created, "catalogued book");
                Ok(Ingest::Cataloged(book))
            },
            Insert::AlreadyExists(existing) => {
                tx.rollback().await.or_raise(|| ErrorKind::Catalog)?;
                tracing::info!(id, "lost race to a concurrent ingestion");
                Ok(Ingest::AlreadyCataloged(existing))
            },
        }
    }
}

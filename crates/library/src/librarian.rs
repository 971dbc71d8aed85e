use crate::error::{ErrorKind, Result};
use crate::ingest::{self, Ingest, Ingestor};
use crate::query::{
    self, AliveGroup, CenturyGroup, Comparison, Criterion, LanguageBooks, LanguageBreakdown, LanguageShare,
    LanguageSummary, Statistics, TemporalQueries,
};
use exn::ResultExt;
use folio_catalog::Repository;
use folio_catalog::models::{Author, AuthorOrder, AuthorWithBooks, Book, BookOrder, IntegrityReport};
use folio_gutendex::LookupHandle;
use std::ops::RangeInclusive;

/// One handle for everything a user can ask of the catalog.
///
/// # Examples
///
/// ```no_run
/// use folio_catalog::{Database, Repository};
/// use folio_gutendex::lookup::GutendexClient;
/// use folio_library::{Ingest, Librarian};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let db = Database::connect("catalog.sqlite").await?;
/// let librarian = Librarian::new(Repository::from(&db), Arc::new(GutendexClient::public()?));
/// if let Ingest::Cataloged(book) = librarian.ingest("Frankenstein").await? {
///     println!("catalogued {}", book.title);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Librarian {
    repo: Repository,
    ingestor: Ingestor,
    temporal: TemporalQueries,
    stats: Statistics,
}

impl Librarian {
    pub fn new(repo: Repository, lookup: LookupHandle) -> Self {
        Self {
            ingestor: Ingestor::new(repo.clone(), lookup),
            temporal: TemporalQueries::new(repo.clone()),
            stats: Statistics::new(repo.clone()),
            repo,
        }
    }

    /// Whether writes are rolled back instead of committed.
    pub fn is_dry_run(&self) -> bool {
        self.repo.is_dry_run()
    }

    /// Pin the year that temporal queries treat as "now".
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.temporal = self.temporal.with_current_year(year);
        self
    }

    // =========================================================================
    // Ingestion
    // =========================================================================

    pub async fn ingest(&self, title: &str) -> ingest::Result<Ingest> {
        self.ingestor.ingest(title).await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub async fn list_books(&self, order: BookOrder) -> Result<Vec<Book>> {
        self.repo.list_books(order).await.or_raise(|| ErrorKind::Catalog)
    }

    pub async fn list_authors(&self) -> Result<Vec<Author>> {
        self.repo.list_authors(AuthorOrder::Name).await.or_raise(|| ErrorKind::Catalog)
    }

    pub async fn books_by_author(&self, author_id: i64) -> Result<Vec<Book>> {
        self.repo.books_by_author(author_id).await.or_raise(|| ErrorKind::Catalog)
    }

    pub async fn get_book(&self, id: u64) -> Result<Option<Book>> {
        self.repo.get_book(id).await.or_raise(|| ErrorKind::Catalog)
    }

    pub async fn get_author(&self, id: i64) -> Result<Option<Author>> {
        self.repo.get_author(id).await.or_raise(|| ErrorKind::Catalog)
    }

    /// Delete a book; its author goes too if it has no other books.
    pub async fn delete_book(&self, id: u64) -> Result<bool> {
        self.repo.delete_book(id).await.or_raise(|| ErrorKind::Catalog)
    }

    pub async fn integrity_check(&self) -> Result<IntegrityReport> {
        self.repo.integrity_check().await.or_raise(|| ErrorKind::Catalog)
    }

    pub async fn delete_orphaned_authors(&self) -> Result<u64> {
        self.repo.delete_orphaned_authors().await.or_raise(|| ErrorKind::Catalog)
    }

    // =========================================================================
    // Temporal
    // =========================================================================

    pub fn current_year(&self) -> i32 {
        self.temporal.current_year()
    }

    pub async fn query_alive_in_year(&self, year: i32) -> query::Result<Vec<AuthorWithBooks>> {
        self.temporal.alive_in_year(year).await
    }

    pub async fn alive_group_stats(&self, year: i32) -> query::Result<AliveGroup> {
        self.temporal.alive_group_stats(year).await
    }

    pub async fn query_born_or_died_in_year(
        &self,
        criterion: Criterion,
        year: i32,
    ) -> query::Result<Vec<AuthorWithBooks>> {
        self.temporal.born_or_died_in_year(criterion, year).await
    }

    pub async fn query_born_between(&self, start: i32, end: i32) -> query::Result<Vec<CenturyGroup>> {
        self.temporal.born_between(start, end).await
    }

    pub async fn birth_year_range(&self) -> query::Result<Option<RangeInclusive<i32>>> {
        self.temporal.birth_year_range().await
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    pub async fn language_stats(&self, code: &str) -> query::Result<LanguageSummary> {
        self.stats.summary_by_language(code).await
    }

    pub async fn books_in_language(&self, code: &str) -> query::Result<LanguageBooks> {
        self.stats.books_by_language(code).await
    }

    pub async fn all_language_stats(&self) -> query::Result<Vec<LanguageBreakdown>> {
        self.stats.full_language_breakdown().await
    }

    pub async fn compare_languages(&self, a: &str, b: &str) -> query::Result<Comparison> {
        self.stats.compare(a, b).await
    }

    pub async fn language_distribution(&self) -> query::Result<Vec<LanguageShare>> {
        self.stats.language_distribution().await
    }

    pub async fn available_languages(&self) -> query::Result<Vec<String>> {
        self.stats.available_languages().await
    }

    pub async fn top_by_downloads(&self, n: usize) -> query::Result<Vec<Book>> {
        self.stats.top_n_by_downloads(n).await
    }
}

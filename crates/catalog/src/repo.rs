//! Repository for Book and Author entities.
//!
//! They're tightly coupled: a book can't exist without its author, and an
//! author is only kept around while at least one book references it. The
//! author's list of books is never stored; it's a query on `books.author_id`.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{
    Author, AuthorCountRow, AuthorOrder, AuthorRow, AuthorWithBooks, Book, BookOrder, BookRow, Insert,
    IntegrityReport, NewAuthor, NewBook, Upsert,
};
use crate::transaction::{Transaction, fetch_author, fetch_book};
use exn::ResultExt;
use sqlx::SqlitePool;
use tracing::instrument;

/// Repository for managing Book and Author records in the catalog database.
///
/// # Relationships
///
/// - Every book references exactly one author
/// - Many books can reference the same author
/// - Authors are identified by exact name (case and whitespace sensitive)
/// - Deleting an author's last book deletes the author
#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    dry_run: bool,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone(), dry_run: false }
    }
}
impl Repository {
    /// Create a new repository with the given connection pool.
    ///
    /// In dry-run mode every write is performed inside a transaction that is
    /// then rolled back.
    pub fn new(pool: SqlitePool, dry_run: bool) -> Self {
        Self { pool, dry_run }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Start a transaction for several writes that must land together.
    pub async fn begin(&self) -> Result<Transaction> {
        let tx = self.pool.begin().await.or_raise(|| ErrorKind::Database)?;
        Ok(Transaction::new(tx, self.dry_run))
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Find an author by exact name, or create it.
    #[instrument(level = "debug", skip(self, author), fields(name = %author.name))]
    pub async fn upsert_author(&self, author: &NewAuthor) -> Result<Upsert<Author>> {
        let mut tx = self.begin().await?;
        let upsert = tx.upsert_author(author).await?;
        tx.commit().await?;
        Ok(upsert)
    }

    /// Insert a book unless its external id is already catalogued.
    #[instrument(level = "debug", skip(self, book), fields(id = book.id))]
    pub async fn insert_book(&self, book: &NewBook) -> Result<Insert<Book>> {
        let mut tx = self.begin().await?;
        let insert = tx.insert_book(book).await?;
        tx.commit().await?;
        Ok(insert)
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    /// Ids too large for the catalog's keys can't be stored and are reported
    /// as unknown.
    pub async fn get_book(&self, id: u64) -> Result<Option<Book>> {
        let Ok(id) = i64::try_from(id) else {
            return Ok(None);
        };
        fetch_book(&self.pool, id).await
    }

    pub async fn get_author(&self, id: i64) -> Result<Option<Author>> {
        fetch_author(&self.pool, id).await
    }

    // =========================================================================
    // Listing
    // =========================================================================

    pub async fn list_books(&self, order: BookOrder) -> Result<Vec<Book>> {
        let query = match order {
            BookOrder::Title => include_str!("../queries/list_books_by_title.sql"),
            BookOrder::Downloads => include_str!("../queries/list_books_by_downloads.sql"),
            BookOrder::Cataloged => include_str!("../queries/list_books_by_cataloged.sql"),
        };
        let rows: Vec<BookRow> = sqlx::query_as(query)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Book::try_from).collect()
    }

    pub async fn list_authors(&self, order: AuthorOrder) -> Result<Vec<Author>> {
        let query = match order {
            AuthorOrder::Name => include_str!("../queries/list_authors_by_name.sql"),
        };
        let rows: Vec<AuthorRow> = sqlx::query_as(query)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Author::try_from).collect()
    }

    /// Books referencing the given author, by title.
    pub async fn books_by_author(&self, author_id: i64) -> Result<Vec<Book>> {
        let rows: Vec<BookRow> = sqlx::query_as(include_str!("../queries/list_books_by_author.sql"))
            .bind(author_id)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Book::try_from).collect()
    }

    /// Books in one stored language code, most downloaded first. Unknown
    /// counts come last, ties keep insertion order.
    pub async fn books_by_language(&self, code: &str) -> Result<Vec<Book>> {
        let rows: Vec<BookRow> = sqlx::query_as(include_str!("../queries/list_books_by_language.sql"))
            .bind(code)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(Book::try_from).collect()
    }

    /// Every author with the number of books referencing it, by name, in a
    /// single consistent read.
    pub async fn list_authors_with_book_counts(&self) -> Result<Vec<AuthorWithBooks>> {
        let rows: Vec<AuthorCountRow> = sqlx::query_as(include_str!("../queries/list_authors_with_book_counts.sql"))
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        rows.into_iter().map(AuthorWithBooks::try_from).collect()
    }

    // =========================================================================
    // Counts
    // =========================================================================

    pub async fn count_books(&self) -> Result<u64> {
        self.count(include_str!("../queries/count_books.sql")).await
    }

    pub async fn count_authors(&self) -> Result<u64> {
        self.count(include_str!("../queries/count_authors.sql")).await
    }

    async fn count(&self, query: &'static str) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(query)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("count"))
    }

    /// Count records breaking the book/author relationship. Read-only.
    #[instrument(level = "debug", skip(self))]
    pub async fn integrity_check(&self) -> Result<IntegrityReport> {
        Ok(IntegrityReport {
            books_without_author: self.count(include_str!("../queries/count_books_without_author.sql")).await?,
            authors_without_books: self.count(include_str!("../queries/count_authors_without_books.sql")).await?,
        })
    }

    // =========================================================================
    // Delete
    // =========================================================================

    /// Delete a book by its external id, cascading to its author if the
    /// author has no other books. Both deletions happen in one transaction.
    ///
    /// Returns `true` if a book was deleted, `false` if the id was unknown.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete_book(&self, id: u64) -> Result<bool> {
        let mut tx = self.begin().await?;
        let Some(author_removed) = tx.delete_book(id).await? else {
            tx.rollback().await?;
            return Ok(false);
        };
        tx.commit().await?;
        tracing::info!(id, author_removed, dry_run = self.dry_run, "deleted book");
        Ok(true)
    }

    /// Delete every author no book references any more.
    ///
    /// A healthy catalog never has any (deletion cascades already); this is
    /// for repairing one that an [`integrity_check`](Self::integrity_check)
    /// flagged.
    pub async fn delete_orphaned_authors(&self) -> Result<u64> {
        let mut tx = self.begin().await?;
        let deleted = tx.delete_orphaned_authors().await?;
        tx.commit().await?;
        if deleted > 0 {
            tracing::info!(deleted, dry_run = self.dry_run, "deleted orphaned authors");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    async fn repo() -> Repository {
        let db = Database::connect_in_memory().await.unwrap();
        Repository::from(&db)
    }

    async fn author(repo: &Repository, name: &str) -> Author {
        repo.upsert_author(&NewAuthor::new(name, None, None)).await.unwrap().into_inner()
    }

    #[tokio::test]
    async fn test_upsert_author_is_exact_match() {
        let repo = repo().await;
        let first = repo.upsert_author(&NewAuthor::new("Austen, Jane", Some(1775), Some(1817))).await.unwrap();
        assert!(first.is_created());
        let second = repo.upsert_author(&NewAuthor::new("Austen, Jane", None, None)).await.unwrap();
        assert!(!second.is_created());
        let (first, second) = (first.into_inner(), second.into_inner());
        assert_eq!(first.id, second.id);
        // The original lifespan is kept.
        assert_eq!(second.birth_year, Some(1775));

        let lowercase = author(&repo, "austen, jane").await;
        assert_ne!(lowercase.id, first.id);
        let padded = author(&repo, "Austen, Jane ").await;
        assert_ne!(padded.id, first.id);
        assert_eq!(repo.count_authors().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_upsert_author_rejects_invalid() {
        let repo = repo().await;
        let err = repo.upsert_author(&NewAuthor::new("  ", None, None)).await.unwrap_err();
        assert!(matches!(*err, ErrorKind::Constraint(_)));
        let err = repo.upsert_author(&NewAuthor::new("Backwards", Some(1900), Some(1800))).await.unwrap_err();
        assert!(matches!(*err, ErrorKind::Constraint(_)));
        assert_eq!(repo.count_authors().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_book_and_get() {
        let repo = repo().await;
        let author = author(&repo, "Shelley, Mary Wollstonecraft").await;
        let book = NewBook::new(84, "Frankenstein", author.id).with_language("en").with_downloads(100);
        let inserted = repo.insert_book(&book).await.unwrap();
        assert!(inserted.is_created());
        let stored = repo.get_book(84).await.unwrap().unwrap();
        assert_eq!(stored.title, "Frankenstein");
        assert_eq!(stored.author_id, author.id);
        assert_eq!(stored.language.as_deref(), Some("en"));
        assert_eq!(repo.books_by_author(author.id).await.unwrap(), vec![stored]);
    }

    #[tokio::test]
    async fn test_insert_book_twice_returns_existing() {
        let repo = repo().await;
        let author = author(&repo, "Shelley, Mary Wollstonecraft").await;
        let first = repo.insert_book(&NewBook::new(84, "Frankenstein", author.id)).await.unwrap().into_inner();
        let again = repo.insert_book(&NewBook::new(84, "Something Else", author.id)).await.unwrap();
        assert_eq!(again, Insert::AlreadyExists(first));
        assert_eq!(repo.count_books().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_book_requires_author() {
        let repo = repo().await;
        let err = repo.insert_book(&NewBook::new(1, "Nobody's Book", 999)).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Database);
        assert_eq!(repo.count_books().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_books_orders() {
        let repo = repo().await;
        let author = author(&repo, "Various").await;
        for book in [
            NewBook::new(3, "Charlie", author.id).with_downloads(10),
            NewBook::new(1, "Alpha", author.id),
            NewBook::new(2, "Bravo", author.id).with_downloads(30),
            NewBook::new(4, "Delta", author.id).with_downloads(10),
        ] {
            repo.insert_book(&book).await.unwrap();
        }
        let ids = |books: Vec<Book>| books.into_iter().map(|b| b.id).collect::<Vec<_>>();
        assert_eq!(ids(repo.list_books(BookOrder::Title).await.unwrap()), vec![1, 2, 3, 4]);
        assert_eq!(ids(repo.list_books(BookOrder::Cataloged).await.unwrap()), vec![3, 1, 2, 4]);
        // Nulls last, ties (3 and 4 both at 10) in insertion order.
        assert_eq!(ids(repo.list_books(BookOrder::Downloads).await.unwrap()), vec![2, 3, 4, 1]);
    }

    #[tokio::test]
    async fn test_cataloged_seq_is_increasing() {
        let repo = repo().await;
        let author = author(&repo, "Various").await;
        let a = repo.insert_book(&NewBook::new(10, "A", author.id)).await.unwrap().into_inner();
        let b = repo.insert_book(&NewBook::new(5, "B", author.id)).await.unwrap().into_inner();
        assert!(a.cataloged_seq < b.cataloged_seq);
    }

    #[tokio::test]
    async fn test_delete_book_cascades_to_orphaned_author() {
        let repo = repo().await;
        let austen = author(&repo, "Austen, Jane").await;
        let shelley = author(&repo, "Shelley, Mary Wollstonecraft").await;
        repo.insert_book(&NewBook::new(1342, "Pride and Prejudice", austen.id)).await.unwrap();
        repo.insert_book(&NewBook::new(158, "Emma", austen.id)).await.unwrap();
        repo.insert_book(&NewBook::new(84, "Frankenstein", shelley.id)).await.unwrap();

        assert!(repo.delete_book(1342).await.unwrap());
        assert!(repo.get_author(austen.id).await.unwrap().is_some(), "Emma still references Austen");

        assert!(repo.delete_book(158).await.unwrap());
        assert!(repo.get_author(austen.id).await.unwrap().is_none());

        assert!(!repo.delete_book(158).await.unwrap());
        assert_eq!(repo.count_books().await.unwrap(), 1);
        assert_eq!(repo.count_authors().await.unwrap(), 1);
        assert!(repo.integrity_check().await.unwrap().is_healthy());
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let db = Database::connect_in_memory().await.unwrap();
        let live = Repository::from(&db);
        let dry = Repository::new(db.pool().clone(), true);
        assert!(dry.is_dry_run());

        let created = dry.upsert_author(&NewAuthor::new("Austen, Jane", None, None)).await.unwrap();
        assert!(created.is_created());
        assert_eq!(live.count_authors().await.unwrap(), 0);

        let austen = author(&live, "Austen, Jane").await;
        live.insert_book(&NewBook::new(158, "Emma", austen.id)).await.unwrap();
        assert!(dry.delete_book(158).await.unwrap());
        assert!(live.get_book(158).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_integrity_check_and_orphan_cleanup() {
        let repo = repo().await;
        let lonely = author(&repo, "Lonely, Author").await;
        let busy = author(&repo, "Busy, Author").await;
        repo.insert_book(&NewBook::new(1, "Busy Work", busy.id)).await.unwrap();

        let report = repo.integrity_check().await.unwrap();
        assert_eq!(report, IntegrityReport { books_without_author: 0, authors_without_books: 1 });
        // Checking is read-only.
        assert_eq!(repo.integrity_check().await.unwrap(), report);
        assert_eq!(repo.count_authors().await.unwrap(), 2);

        assert_eq!(repo.delete_orphaned_authors().await.unwrap(), 1);
        assert!(repo.get_author(lonely.id).await.unwrap().is_none());
        assert!(repo.integrity_check().await.unwrap().is_healthy());
    }

    #[tokio::test]
    async fn test_list_authors_with_book_counts() {
        let repo = repo().await;
        let b = author(&repo, "B").await;
        let a = author(&repo, "A").await;
        repo.insert_book(&NewBook::new(1, "One", b.id)).await.unwrap();
        repo.insert_book(&NewBook::new(2, "Two", b.id)).await.unwrap();
        let counts = repo.list_authors_with_book_counts().await.unwrap();
        assert_eq!(
            counts,
            vec![AuthorWithBooks { author: a, books: 0 }, AuthorWithBooks { author: b, books: 2 }]
        );
    }

    #[tokio::test]
    async fn test_transaction_rolls_back_on_drop() {
        let repo = repo().await;
        {
            let mut tx = repo.begin().await.unwrap();
            let author = tx.upsert_author(&NewAuthor::new("Ghost", None, None)).await.unwrap().into_inner();
            tx.insert_book(&NewBook::new(1, "Never Written", author.id)).await.unwrap();
            assert!(tx.get_book(1).await.unwrap().is_some());
        }
        assert_eq!(repo.count_books().await.unwrap(), 0);
        assert_eq!(repo.count_authors().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unstorable_id_is_unknown() {
        let repo = repo().await;
        assert!(repo.get_book(u64::MAX).await.unwrap().is_none());
        assert!(!repo.delete_book(u64::MAX).await.unwrap());
    }

    #[tokio::test]
    async fn test_books_by_language() {
        let repo = repo().await;
        let author = author(&repo, "Various").await;
        for book in [
            NewBook::new(1, "Uno", author.id).with_language("es").with_downloads(5),
            NewBook::new(2, "One", author.id).with_language("en").with_downloads(50),
            NewBook::new(3, "Dos", author.id).with_language("es"),
            NewBook::new(4, "Tres", author.id).with_language("es").with_downloads(20),
            NewBook::new(5, "Cuatro", author.id).with_language("es").with_downloads(5),
        ] {
            repo.insert_book(&book).await.unwrap();
        }
        let ids = repo.books_by_language("es").await.unwrap().into_iter().map(|b| b.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![4, 1, 5, 3]);
        assert!(repo.books_by_language("fr").await.unwrap().is_empty());
    }

    async fn catalogue(repo: &Repository, id: u64) -> Result<()> {
        let mut tx = repo.begin().await?;
        let author = tx.upsert_author(&NewAuthor::new("Austen, Jane", Some(1775), Some(1817))).await?.into_inner();
        tx.insert_book(&NewBook::new(id, format!("Volume {id}"), author.id)).await?;
        tx.commit().await
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_deletes_and_inserts_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::connect(dir.path().join("catalog.sqlite")).await.unwrap();
        let repo = Repository::from(&db);
        for id in 1..=8 {
            catalogue(&repo, id).await.unwrap();
        }

        let mut deletes = Vec::new();
        let mut inserts = Vec::new();
        for id in 1..=8 {
            let deleting = repo.clone();
            deletes.push(tokio::spawn(async move { deleting.delete_book(id).await }));
            let inserting = repo.clone();
            inserts.push(tokio::spawn(async move { catalogue(&inserting, 100 + id).await }));
        }
        for task in deletes {
            assert!(task.await.unwrap().unwrap());
        }
        for task in inserts {
            task.await.unwrap().unwrap();
        }

        assert_eq!(repo.count_books().await.unwrap(), 8);
        assert_eq!(repo.count_authors().await.unwrap(), 1);
        assert!(repo.integrity_check().await.unwrap().is_healthy());
        db.close().await;
    }
}

//! Catalog transactions.
//!
//! Every write in the catalog goes through a [`Transaction`], so several
//! writes (resolve an author, then insert their book) either all land or
//! none do.

use crate::error::{ErrorKind, Result};
use crate::models::{Author, AuthorRow, Book, BookRow, Insert, NewAuthor, NewBook, NewBookRow, Upsert};
use exn::{OptionExt, ResultExt};
use sqlx::{Sqlite, SqliteExecutor};

pub(crate) async fn fetch_author<'e>(executor: impl SqliteExecutor<'e>, id: i64) -> Result<Option<Author>> {
    let row: Option<AuthorRow> = sqlx::query_as(include_str!("../queries/get_author.sql"))
        .bind(id)
        .fetch_optional(executor)
        .await
        .or_raise(|| ErrorKind::Database)?;
    row.map(Author::try_from).transpose()
}

async fn fetch_author_by_name<'e>(executor: impl SqliteExecutor<'e>, name: &str) -> Result<Option<Author>> {
    let row: Option<AuthorRow> = sqlx::query_as(include_str!("../queries/get_author_by_name.sql"))
        .bind(name)
        .fetch_optional(executor)
        .await
        .or_raise(|| ErrorKind::Database)?;
    row.map(Author::try_from).transpose()
}

pub(crate) async fn fetch_book<'e>(executor: impl SqliteExecutor<'e>, id: i64) -> Result<Option<Book>> {
    let row: Option<BookRow> = sqlx::query_as(include_str!("../queries/get_book.sql"))
        .bind(id)
        .fetch_optional(executor)
        .await
        .or_raise(|| ErrorKind::Database)?;
    row.map(Book::try_from).transpose()
}

/// An open catalog transaction.
///
/// Dropping it without calling [`commit`](Self::commit) rolls everything
/// back. On a dry-run repository, `commit` rolls back as well, so callers
/// see the outcome of their writes without anything being persisted.
pub struct Transaction {
    tx: sqlx::Transaction<'static, Sqlite>,
    dry_run: bool,
}

impl Transaction {
    pub(crate) fn new(tx: sqlx::Transaction<'static, Sqlite>, dry_run: bool) -> Self {
        Self { tx, dry_run }
    }

    /// Find an author by exact name, or create it.
    ///
    /// The stored lifespan of an existing author is never touched, even if
    /// the supplied one differs.
    pub async fn upsert_author(&mut self, author: &NewAuthor) -> Result<Upsert<Author>> {
        if author.name.trim().is_empty() {
            exn::bail!(ErrorKind::Constraint("author name must not be empty"));
        }
        if let (Some(birth), Some(death)) = (author.birth_year, author.death_year)
            && birth > death
        {
            exn::bail!(ErrorKind::Constraint("birth year must not be after death year"));
        }
        let result = sqlx::query(include_str!("../queries/upsert_author.sql"))
            .bind(&author.name)
            .bind(author.birth_year)
            .bind(author.death_year)
            .execute(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let stored = fetch_author_by_name(&mut *self.tx, &author.name)
            .await?
            .ok_or_raise(|| ErrorKind::Database)?;
        Ok(match result.rows_affected() {
            0 => Upsert::Existing(stored),
            _ => Upsert::Created(stored),
        })
    }

    /// Insert a book unless its external id is already catalogued.
    ///
    /// An existing book is returned untouched as [`Insert::AlreadyExists`].
    pub async fn insert_book(&mut self, book: &NewBook) -> Result<Insert<Book>> {
        let row = NewBookRow::try_from(book)?;
        let id = row.id;
        let result = sqlx::query(include_str!("../queries/insert_book.sql"))
            .bind(row.id)
            .bind(row.title)
            .bind(row.author_id)
            .bind(row.language)
            .bind(row.download_count)
            .bind(row.download_url)
            .bind(row.cataloged_at)
            .execute(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let stored = fetch_book(&mut *self.tx, id).await?.ok_or_raise(|| ErrorKind::Database)?;
        Ok(match result.rows_affected() {
            0 => Insert::AlreadyExists(stored),
            _ => Insert::Created(stored),
        })
    }

    /// Ids that don't fit the catalog's integer keys can't be stored, so
    /// they're reported as unknown.
    pub async fn get_book(&mut self, id: u64) -> Result<Option<Book>> {
        let Ok(id) = i64::try_from(id) else {
            return Ok(None);
        };
        fetch_book(&mut *self.tx, id).await
    }

    /// Delete a book, and its author too if no other book references it.
    ///
    /// Returns `None` if no book has this id, otherwise whether the author
    /// was removed along with it.
    ///
    /// The first statement is the delete itself: a transaction that starts
    /// with a read can't take the write lock once another connection has
    /// committed in the meantime.
    pub async fn delete_book(&mut self, id: u64) -> Result<Option<bool>> {
        let Ok(id) = i64::try_from(id) else {
            return Ok(None);
        };
        let author_id: Option<i64> = sqlx::query_scalar(include_str!("../queries/delete_book.sql"))
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let Some(author_id) = author_id else {
            return Ok(None);
        };
        let removed = sqlx::query(include_str!("../queries/delete_author_if_orphaned.sql"))
            .bind(author_id)
            .execute(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(Some(removed.rows_affected() > 0))
    }

    pub async fn delete_orphaned_authors(&mut self) -> Result<u64> {
        let result = sqlx::query(include_str!("../queries/delete_orphaned_authors.sql"))
            .execute(&mut *self.tx)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(result.rows_affected())
    }

    /// Persist every write made through this transaction (or, on a dry-run
    /// repository, discard them).
    pub async fn commit(self) -> Result<()> {
        if self.dry_run {
            tracing::debug!("dry run: rolling back instead of committing");
            return self.rollback().await;
        }
        self.tx.commit().await.or_raise(|| ErrorKind::Database)
    }

    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await.or_raise(|| ErrorKind::Database)
    }
}

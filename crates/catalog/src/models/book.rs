use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use time::UtcDateTime;

/// A catalogued book.
///
/// Identified by the id the upstream source assigned it. Never updated in
/// place: the only way to change a book is to delete and re-ingest it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// External id (Project Gutenberg ebook number).
    pub id: u64,
    pub title: String,
    pub author_id: i64,
    /// Lowercase language code, if the source listed one.
    pub language: Option<String>,
    pub download_count: Option<u64>,
    pub download_url: Option<String>,
    /// Position in insertion order; strictly increasing across the catalog.
    pub cataloged_seq: i64,
    pub cataloged_at: UtcDateTime,
}

/// A normalized book, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub id: u64,
    pub title: String,
    pub author_id: i64,
    pub language: Option<String>,
    pub download_count: Option<u64>,
    pub download_url: Option<String>,
}

impl NewBook {
    pub fn new(id: u64, title: impl Into<String>, author_id: i64) -> Self {
        Self {
            id,
            title: title.into(),
            author_id,
            language: None,
            download_count: None,
            download_url: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_downloads(mut self, download_count: u64) -> Self {
        self.download_count = Some(download_count);
        self
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct BookRow {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) author_id: i64,
    #[sqlx(default)]
    pub(crate) language: Option<String>,
    #[sqlx(default)]
    pub(crate) download_count: Option<i64>,
    #[sqlx(default)]
    pub(crate) download_url: Option<String>,
    pub(crate) cataloged_seq: i64,
    pub(crate) cataloged_at: i64,
}
impl TryFrom<BookRow> for Book {
    type Error = Error;
    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: u64::try_from(row.id).or_raise(|| ErrorKind::InvalidData("book id"))?,
            title: row.title,
            author_id: row.author_id,
            language: row.language,
            download_count: row
                .download_count
                .map(u64::try_from)
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("download count"))?,
            download_url: row.download_url,
            cataloged_seq: row.cataloged_seq,
            cataloged_at: UtcDateTime::from_unix_timestamp(row.cataloged_at)
                .or_raise(|| ErrorKind::InvalidData("cataloged at"))?,
        })
    }
}

/// Column values for an insert; `cataloged_seq` is assigned by the database.
pub(crate) struct NewBookRow {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) author_id: i64,
    pub(crate) language: Option<String>,
    pub(crate) download_count: Option<i64>,
    pub(crate) download_url: Option<String>,
    pub(crate) cataloged_at: i64,
}
impl TryFrom<&NewBook> for NewBookRow {
    type Error = Error;
    fn try_from(book: &NewBook) -> Result<Self, Self::Error> {
        if book.title.trim().is_empty() {
            exn::bail!(ErrorKind::Constraint("book title must not be empty"));
        }
        Ok(Self {
            id: i64::try_from(book.id).or_raise(|| ErrorKind::InvalidData("book id"))?,
            title: book.title.clone(),
            author_id: book.author_id,
            language: book.language.clone(),
            download_count: book
                .download_count
                .map(i64::try_from)
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("download count"))?,
            download_url: book.download_url.clone(),
            cataloged_at: UtcDateTime::now().unix_timestamp(),
        })
    }
}

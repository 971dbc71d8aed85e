mod author;
mod book;

pub use self::author::{Author, AuthorWithBooks, NewAuthor};
pub(crate) use self::author::{AuthorCountRow, AuthorRow};
pub use self::book::{Book, NewBook};
pub(crate) use self::book::{BookRow, NewBookRow};

/// Outcome of find-or-create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert<T> {
    /// Nothing matched, a new record was written.
    Created(T),
    /// A record with the same identity already existed and was returned as-is.
    Existing(T),
}
impl<T> Upsert<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Created(inner) | Self::Existing(inner) => inner,
        }
    }
}

/// Outcome of insert-if-absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Insert<T> {
    Created(T),
    /// The identity was already taken; carries the stored record, untouched.
    AlreadyExists(T),
}
impl<T> Insert<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created(_))
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Created(inner) | Self::AlreadyExists(inner) => inner,
        }
    }
}

/// Sort order for full book listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookOrder {
    #[default]
    Title,
    /// Most downloaded first, unknown counts last, ties in insertion order.
    Downloads,
    /// Insertion order.
    Cataloged,
}

/// Sort order for full author listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthorOrder {
    #[default]
    Name,
}

/// Referential health of the catalog. Both counts are zero in a healthy catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    pub books_without_author: u64,
    pub authors_without_books: u64,
}
impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.books_without_author == 0 && self.authors_without_books == 0
    }
}

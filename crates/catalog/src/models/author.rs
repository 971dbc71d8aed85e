use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A catalogued author.
///
/// Created the first time a book by this exact name is catalogued and never
/// modified afterwards. Deleted together with its last book.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Author {
    /// Surrogate id assigned by the catalog.
    pub id: i64,
    pub name: String,
    pub birth_year: Option<i32>,
    /// `None` when the author is alive or the year is unknown.
    pub death_year: Option<i32>,
}

impl Author {
    /// Age the author had (or would have had) in `year`, if the birth year is known.
    pub fn age_in(&self, year: i32) -> Option<i32> {
        self.birth_year.map(|birth| year - birth)
    }
}

impl Display for Author {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match (self.birth_year, self.death_year) {
            (None, None) => write!(f, "{}", self.name),
            (birth, death) => {
                let birth = birth.map_or_else(|| "?".to_string(), |y| y.to_string());
                let death = death.map_or_else(String::new, |y| y.to_string());
                write!(f, "{} ({birth}-{death})", self.name)
            },
        }
    }
}

/// Author details as they arrive from ingestion, before the catalog assigns an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
}

impl NewAuthor {
    pub fn new(name: impl Into<String>, birth_year: Option<i32>, death_year: Option<i32>) -> Self {
        Self {
            name: name.into(),
            birth_year,
            death_year,
        }
    }
}

/// An author alongside the number of books currently referencing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorWithBooks {
    pub author: Author,
    pub books: u64,
}

#[derive(sqlx::FromRow)]
pub(crate) struct AuthorRow {
    pub(crate) id: i64,
    pub(crate) name: String,
    #[sqlx(default)]
    pub(crate) birth_year: Option<i64>,
    #[sqlx(default)]
    pub(crate) death_year: Option<i64>,
}
impl TryFrom<AuthorRow> for Author {
    type Error = Error;
    fn try_from(row: AuthorRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            birth_year: row
                .birth_year
                .map(i32::try_from)
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("birth year"))?,
            death_year: row
                .death_year
                .map(i32::try_from)
                .transpose()
                .or_raise(|| ErrorKind::InvalidData("death year"))?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct AuthorCountRow {
    #[sqlx(flatten)]
    pub(crate) author: AuthorRow,
    pub(crate) book_count: i64,
}
impl TryFrom<AuthorCountRow> for AuthorWithBooks {
    type Error = Error;
    fn try_from(row: AuthorCountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            author: Author::try_from(row.author)?,
            books: u64::try_from(row.book_count).or_raise(|| ErrorKind::InvalidData("book count"))?,
        })
    }
}

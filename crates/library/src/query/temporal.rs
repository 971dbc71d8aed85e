//! Questions about when authors lived.
//!
//! Every query is one [`Lifespan`] predicate over a snapshot of the authors
//! (with their book counts), plus a sort key.

use crate::query::error::{ErrorKind, Result};
use exn::ResultExt;
use folio_catalog::Repository;
use folio_catalog::models::{Author, AuthorWithBooks};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::RangeInclusive;
use time::UtcDateTime;
use tracing::instrument;

/// Earliest year a query may ask about.
pub const MIN_YEAR: i32 = 1;

/// Which end of a lifespan to match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criterion {
    Born,
    Died,
}

/// A predicate over an author's (possibly partial) lifespan.
///
/// Authors with an unknown birth year never match a predicate involving
/// birth, including [`AliveIn`](Self::AliveIn). An unknown death year means
/// "still alive" for `AliveIn` and "never matches" for `DiedIn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifespan {
    AliveIn(i32),
    BornIn(i32),
    DiedIn(i32),
    /// Inclusive on both ends.
    BornBetween(i32, i32),
}

impl Lifespan {
    pub fn matches(&self, author: &Author) -> bool {
        match *self {
            Self::AliveIn(year) => {
                author.birth_year.is_some_and(|birth| birth <= year)
                    && author.death_year.is_none_or(|death| death >= year)
            },
            Self::BornIn(year) => author.birth_year == Some(year),
            Self::DiedIn(year) => author.death_year == Some(year),
            Self::BornBetween(start, end) => author.birth_year.is_some_and(|birth| (start..=end).contains(&birth)),
        }
    }

    fn of(criterion: Criterion, year: i32) -> Self {
        match criterion {
            Criterion::Born => Self::BornIn(year),
            Criterion::Died => Self::DiedIn(year),
        }
    }
}

/// A century, numbered as `floor(year / 100) + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Century(pub i32);
impl Century {
    pub fn of(year: i32) -> Self {
        Self(year.div_euclid(100) + 1)
    }
}
impl Display for Century {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let suffix = match (self.0.rem_euclid(100), self.0.rem_euclid(10)) {
            (11..=13, _) => "th",
            (_, 1) => "st",
            (_, 2) => "nd",
            (_, 3) => "rd",
            _ => "th",
        };
        write!(f, "{}{suffix} century", self.0)
    }
}

/// Authors born within one century, by birth year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CenturyGroup {
    pub century: Century,
    pub authors: Vec<AuthorWithBooks>,
}

/// Aggregate view of the authors alive in a given year.
#[derive(Debug, Clone, PartialEq)]
pub struct AliveGroup {
    pub year: i32,
    pub authors: Vec<AuthorWithBooks>,
    /// Mean of `year - birth_year`; `None` for an empty group.
    pub average_age: Option<f64>,
    /// First author encountered with the lowest age.
    pub youngest: Option<AuthorWithBooks>,
    /// First author encountered with the highest age.
    pub oldest: Option<AuthorWithBooks>,
    /// Books written by the whole group.
    pub total_books: u64,
}

impl AliveGroup {
    fn new(year: i32, authors: Vec<AuthorWithBooks>) -> Self {
        let mut youngest: Option<(&AuthorWithBooks, i32)> = None;
        let mut oldest: Option<(&AuthorWithBooks, i32)> = None;
        let mut ages = Vec::with_capacity(authors.len());
        for entry in &authors {
            let Some(age) = entry.author.age_in(year) else {
                continue;
            };
            ages.push(f64::from(age));
            // Strict comparisons: on a tie the first one encountered stays.
            if youngest.is_none_or(|(_, min)| age < min) {
                youngest = Some((entry, age));
            }
            if oldest.is_none_or(|(_, max)| age > max) {
                oldest = Some((entry, age));
            }
        }
        let average_age = (!ages.is_empty()).then(|| ages.iter().sum::<f64>() / ages.len() as f64);
        let youngest = youngest.map(|(entry, _)| entry.clone());
        let oldest = oldest.map(|(entry, _)| entry.clone());
        let total_books = authors.iter().map(|entry| entry.books).sum();
        Self { year, authors, average_age, youngest, oldest, total_books }
    }
}

/// Read-only lifespan queries over the catalogued authors.
#[derive(Debug, Clone)]
pub struct TemporalQueries {
    repo: Repository,
    current_year: Option<i32>,
}

impl TemporalQueries {
    pub fn new(repo: Repository) -> Self {
        Self { repo, current_year: None }
    }

    /// Pin "now" to a fixed year instead of reading the system clock.
    pub fn with_current_year(mut self, year: i32) -> Self {
        self.current_year = Some(year);
        self
    }

    pub fn current_year(&self) -> i32 {
        self.current_year.unwrap_or_else(|| UtcDateTime::now().year())
    }

    /// Accept years from [`MIN_YEAR`] up to and including the current year.
    pub fn validate_year(&self, year: i32) -> Result<i32> {
        let max = self.current_year();
        if !(MIN_YEAR..=max).contains(&year) {
            exn::bail!(ErrorKind::InvalidYear { year, min: MIN_YEAR, max });
        }
        Ok(year)
    }

    /// Authors matching the predicate, in name order.
    #[instrument(level = "debug", skip(self))]
    pub async fn matching(&self, lifespan: Lifespan) -> Result<Vec<AuthorWithBooks>> {
        let authors = self.repo.list_authors_with_book_counts().await.or_raise(|| ErrorKind::Catalog)?;
        Ok(authors.into_iter().filter(|entry| lifespan.matches(&entry.author)).collect())
    }

    /// Authors born in or before `year` and not known to have died before it.
    pub async fn alive_in_year(&self, year: i32) -> Result<Vec<AuthorWithBooks>> {
        let year = self.validate_year(year)?;
        self.matching(Lifespan::AliveIn(year)).await
    }

    pub async fn born_in_year(&self, year: i32) -> Result<Vec<AuthorWithBooks>> {
        self.born_or_died_in_year(Criterion::Born, year).await
    }

    pub async fn died_in_year(&self, year: i32) -> Result<Vec<AuthorWithBooks>> {
        self.born_or_died_in_year(Criterion::Died, year).await
    }

    pub async fn born_or_died_in_year(&self, criterion: Criterion, year: i32) -> Result<Vec<AuthorWithBooks>> {
        let year = self.validate_year(year)?;
        self.matching(Lifespan::of(criterion, year)).await
    }

    /// Authors born between `start` and `end` (inclusive), grouped by century
    /// in ascending order. Within a group, authors are sorted by birth year,
    /// then name.
    pub async fn born_between(&self, start: i32, end: i32) -> Result<Vec<CenturyGroup>> {
        self.validate_year(start)?;
        self.validate_year(end)?;
        if start > end {
            exn::bail!(ErrorKind::InvalidRange { start, end });
        }
        let mut authors = self.matching(Lifespan::BornBetween(start, end)).await?;
        // Stable sort: equal birth years keep their name order.
        authors.sort_by_key(|entry| entry.author.birth_year);
        let mut groups: Vec<CenturyGroup> = Vec::new();
        for entry in authors {
            let Some(birth) = entry.author.birth_year else {
                continue;
            };
            let century = Century::of(birth);
            match groups.last_mut() {
                Some(group) if group.century == century => group.authors.push(entry),
                _ => groups.push(CenturyGroup { century, authors: vec![entry] }),
            }
        }
        Ok(groups)
    }

    /// Group statistics over [`alive_in_year`](Self::alive_in_year).
    pub async fn alive_group_stats(&self, year: i32) -> Result<AliveGroup> {
        let authors = self.alive_in_year(year).await?;
        Ok(AliveGroup::new(year, authors))
    }

    /// Earliest and latest known birth years, if any author has one.
    pub async fn birth_year_range(&self) -> Result<Option<RangeInclusive<i32>>> {
        let authors = self.repo.list_authors_with_book_counts().await.or_raise(|| ErrorKind::Catalog)?;
        let years = authors.iter().filter_map(|entry| entry.author.birth_year);
        let range = years.fold(None, |range: Option<(i32, i32)>, year| match range {
            None => Some((year, year)),
            Some((min, max)) => Some((min.min(year), max.max(year))),
        });
        Ok(range.map(|(min, max)| min..=max))
    }
}

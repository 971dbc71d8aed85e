//! Per-language statistics over the catalogued books.
//!
//! Download figures only ever consider books with a known download count, so
//! a language can have books but no download data.

use crate::query::error::{ErrorKind, Result};
use exn::ResultExt;
use folio_catalog::Repository;
use folio_catalog::models::{Book, BookOrder};
use folio_gutendex::models::Language;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet};
use tracing::instrument;

/// Count, sum and extrema of the known download counts of a set of books.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadSummary {
    /// Books that had a download count.
    pub count: u64,
    pub total: u64,
    pub average: f64,
    pub max: u64,
    pub min: u64,
}

impl DownloadSummary {
    /// `None` when none of the books has a known download count.
    pub fn of<'a>(books: impl IntoIterator<Item = &'a Book>) -> Option<Self> {
        let mut summary: Option<Self> = None;
        for downloads in books.into_iter().filter_map(|book| book.download_count) {
            summary = Some(match summary {
                None => Self { count: 1, total: downloads, average: 0.0, max: downloads, min: downloads },
                Some(s) => Self {
                    count: s.count + 1,
                    total: s.total + downloads,
                    average: 0.0,
                    max: s.max.max(downloads),
                    min: s.min.min(downloads),
                },
            });
        }
        summary.map(|s| Self { average: s.total as f64 / s.count as f64, ..s })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LanguageSummary {
    pub language: String,
    pub books: u64,
    /// `None` means "no download data", not zero downloads.
    pub downloads: Option<DownloadSummary>,
}

/// One row of the full per-language table.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageBreakdown {
    /// `None` groups the books without a language.
    pub language: Option<String>,
    pub count: u64,
    pub total_downloads: u64,
    pub average_downloads: Option<f64>,
    pub max_downloads: Option<u64>,
}

/// The books of one language, most downloaded first.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageBooks {
    pub language: String,
    pub books: Vec<Book>,
    /// How many of `books` have a known download count.
    pub with_downloads: u64,
}

/// A language's share of the whole catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageShare {
    pub language: Option<String>,
    pub count: u64,
    /// `100 * count / total_books`
    pub percentage: f64,
}

/// Side-by-side figures for two languages.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub first: String,
    pub second: String,
    pub count_a: u64,
    pub count_b: u64,
    pub avg_downloads_a: Option<f64>,
    pub avg_downloads_b: Option<f64>,
    /// Language with more books; `None` on a tie.
    pub winner_by_count: Option<String>,
}

/// English display name of a language code, or the uppercased code.
pub fn language_display_name(code: &str) -> String {
    Language::new(code).display_name()
}

/// Group books by language (unset languages under `None`), keeping each
/// group in the input order.
fn group_by_language(books: &[Book]) -> BTreeMap<Option<&str>, Vec<&Book>> {
    let mut groups: BTreeMap<Option<&str>, Vec<&Book>> = BTreeMap::new();
    for book in books {
        groups.entry(book.language.as_deref()).or_default().push(book);
    }
    groups
}

/// Read-only statistics over the catalogued books.
#[derive(Debug, Clone)]
pub struct Statistics {
    repo: Repository,
}

impl Statistics {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    async fn snapshot(&self, order: BookOrder) -> Result<Vec<Book>> {
        self.repo.list_books(order).await.or_raise(|| ErrorKind::Catalog)
    }

    /// Books in the given language (the code is case-insensitive).
    pub async fn count_by_language(&self, code: &str) -> Result<u64> {
        Ok(self.summary_by_language(code).await?.books)
    }

    /// Books in the given language (the code is case-insensitive), most
    /// downloaded first. Unknown counts come last, ties keep insertion order.
    #[instrument(level = "debug", skip(self))]
    pub async fn books_by_language(&self, code: &str) -> Result<LanguageBooks> {
        let language = Language::new(code).code;
        let books = self.repo.books_by_language(&language).await.or_raise(|| ErrorKind::Catalog)?;
        let with_downloads = books.iter().filter(|book| book.download_count.is_some()).count() as u64;
        Ok(LanguageBooks { language, books, with_downloads })
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn summary_by_language(&self, code: &str) -> Result<LanguageSummary> {
        let language = Language::new(code).code;
        let books = self.snapshot(BookOrder::Cataloged).await?;
        let matching = books.iter().filter(|book| book.language.as_deref() == Some(language.as_str()));
        let matching = matching.collect::<Vec<_>>();
        Ok(LanguageSummary {
            books: matching.len() as u64,
            downloads: DownloadSummary::of(matching),
            language,
        })
    }

    /// Every language (and the no-language bucket), most books first, ties by
    /// code. The no-language bucket sorts after every code on a tie.
    pub async fn full_language_breakdown(&self) -> Result<Vec<LanguageBreakdown>> {
        let books = self.snapshot(BookOrder::Cataloged).await?;
        let mut breakdown = group_by_language(&books)
            .into_iter()
            .map(|(language, books)| {
                let downloads = DownloadSummary::of(books.iter().copied());
                LanguageBreakdown {
                    language: language.map(str::to_string),
                    count: books.len() as u64,
                    total_downloads: downloads.map_or(0, |d| d.total),
                    average_downloads: downloads.map(|d| d.average),
                    max_downloads: downloads.map(|d| d.max),
                }
            })
            .collect::<Vec<_>>();
        breakdown.sort_by(|a, b| {
            let key = |row: &LanguageBreakdown| (Reverse(row.count), row.language.is_none(), row.language.clone());
            key(a).cmp(&key(b))
        });
        Ok(breakdown)
    }

    /// Each language's percentage of all books, in the same order as
    /// [`full_language_breakdown`](Self::full_language_breakdown). Empty for
    /// an empty catalog; otherwise the percentages sum to 100.
    pub async fn language_distribution(&self) -> Result<Vec<LanguageShare>> {
        let breakdown = self.full_language_breakdown().await?;
        let total: u64 = breakdown.iter().map(|row| row.count).sum();
        if total == 0 {
            return Ok(Vec::new());
        }
        Ok(breakdown
            .into_iter()
            .map(|row| LanguageShare {
                percentage: 100.0 * row.count as f64 / total as f64,
                language: row.language,
                count: row.count,
            })
            .collect())
    }

    /// Distinct language codes in the catalog, ascending.
    pub async fn available_languages(&self) -> Result<Vec<String>> {
        let books = self.snapshot(BookOrder::Cataloged).await?;
        let languages = books.iter().filter_map(|book| book.language.clone()).collect::<BTreeSet<_>>();
        Ok(languages.into_iter().collect())
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn compare(&self, a: &str, b: &str) -> Result<Comparison> {
        let (first, second) = (Language::new(a).code, Language::new(b).code);
        if first == second {
            exn::bail!(ErrorKind::IdenticalLanguages(first));
        }
        let available = self.available_languages().await?;
        if available.len() < 2 {
            exn::bail!(ErrorKind::InsufficientLanguages(available.len()));
        }
        let summary_a = self.summary_by_language(&first).await?;
        let summary_b = self.summary_by_language(&second).await?;
        let winner_by_count = match summary_a.books.cmp(&summary_b.books) {
            std::cmp::Ordering::Greater => Some(first.clone()),
            std::cmp::Ordering::Less => Some(second.clone()),
            std::cmp::Ordering::Equal => None,
        };
        Ok(Comparison {
            count_a: summary_a.books,
            count_b: summary_b.books,
            avg_downloads_a: summary_a.downloads.map(|d| d.average),
            avg_downloads_b: summary_b.downloads.map(|d| d.average),
            winner_by_count,
            first,
            second,
        })
    }

    /// The `n` most downloaded books. Unknown counts come last, ties keep
    /// insertion order.
    pub async fn top_n_by_downloads(&self, n: usize) -> Result<Vec<Book>> {
        let mut books = self.snapshot(BookOrder::Downloads).await?;
        books.truncate(n);
        Ok(books)
    }
}

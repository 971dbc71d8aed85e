//! Read-only questions over the catalog: author lifespans and per-language
//! statistics.

pub(crate) mod error;
mod stats;
mod temporal;

pub use self::error::{Error, ErrorKind, Result};
pub use self::stats::{
    Comparison, DownloadSummary, LanguageBooks, LanguageBreakdown, LanguageShare, LanguageSummary, Statistics,
    language_display_name,
};
pub use self::temporal::{AliveGroup, Century, CenturyGroup, Criterion, Lifespan, MIN_YEAR, TemporalQueries};

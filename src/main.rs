//! folio: catalogue books from a Gutendex-style search service and query them.

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use folio_catalog::models::BookOrder;
use folio_config::Config;
use folio_library::query::Criterion;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Error kinds that know whether trying again could help.
pub(crate) trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for folio_catalog::error::ErrorKind {
    fn is_retryable(&self) -> bool {
        self.is_retryable()
    }
}

impl Retryable for folio_config::error::ErrorKind {
    fn is_retryable(&self) -> bool {
        self.is_retryable()
    }
}

impl Retryable for folio_gutendex::error::ErrorKind {
    fn is_retryable(&self) -> bool {
        self.is_retryable()
    }
}

impl Retryable for folio_library::error::ErrorKind {
    fn is_retryable(&self) -> bool {
        self.is_retryable()
    }
}

impl Retryable for folio_library::ingest::ErrorKind {
    fn is_retryable(&self) -> bool {
        self.is_retryable()
    }
}

impl Retryable for folio_library::query::ErrorKind {
    fn is_retryable(&self) -> bool {
        self.is_retryable()
    }
}

/// Render any crate's error tree through miette.
pub(crate) fn report<E>(err: exn::Exn<E>) -> miette::Report
where
    E: std::error::Error + Retryable + Send + Sync + 'static,
{
    let message = format!("{err:?}");
    if Retryable::is_retryable(&*err) {
        miette::miette!(help = "this may be temporary; try again", "{message}")
    } else {
        miette::miette!("{message}")
    }
}

/// Parse a year that must fit in the catalog's range.
fn parse_year(s: &str) -> Result<i32, String> {
    let year: i32 = s.parse().map_err(|_| format!("'{s}' is not a valid year"))?;
    if year < folio_library::query::MIN_YEAR {
        Err(format!("years start at {}", folio_library::query::MIN_YEAR))
    } else {
        Ok(year)
    }
}

#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file, layered over the user's folio.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Roll back every write instead of committing it
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortBy {
    Title,
    Downloads,
    Cataloged,
}

impl From<SortBy> for BookOrder {
    fn from(sort: SortBy) -> Self {
        match sort {
            SortBy::Title => BookOrder::Title,
            SortBy::Downloads => BookOrder::Downloads,
            SortBy::Cataloged => BookOrder::Cataloged,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Look a title up and catalogue the first match
    Search {
        /// Title, or part of one
        title: String,
    },

    /// List catalogued books
    Books {
        #[arg(long, value_enum, default_value = "title")]
        by: SortBy,

        /// Only books in this language, most downloaded first
        #[arg(long, conflicts_with = "by")]
        lang: Option<String>,
    },

    /// List authors with their catalogued books
    Authors,

    /// Authors alive in a given year, with group statistics
    Alive {
        #[arg(value_parser = parse_year)]
        year: i32,
    },

    /// Authors born in a given year
    Born {
        #[arg(value_parser = parse_year)]
        year: i32,
    },

    /// Authors who died in a given year
    Died {
        #[arg(value_parser = parse_year)]
        year: i32,
    },

    /// Authors born within an inclusive range, grouped by century
    BornBetween {
        #[arg(value_parser = parse_year)]
        start: i32,
        #[arg(value_parser = parse_year)]
        end: i32,
    },

    /// Book and download statistics for one language
    Lang {
        /// Language code, e.g. "en"
        code: String,
    },

    /// Breakdown of every language in the catalog
    Langs,

    /// Compare two languages by book count and average downloads
    Compare { first: String, second: String },

    /// Share of the catalog per language
    Distribution,

    /// Most downloaded books
    Top {
        #[arg(default_value_t = 10)]
        n: usize,
    },

    /// Delete a book (and its author, if it was their last book)
    Delete { id: u64 },

    /// Check catalog integrity
    Check {
        /// Also delete authors that have no books
        #[arg(long)]
        fix: bool,
    },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "folio=info,folio_library=info,folio_catalog=warn,folio_gutendex=warn",
        1 => "folio=debug,folio_library=debug,folio_catalog=debug,folio_gutendex=debug,folio_config=debug",
        _ => "folio=trace,folio_library=trace,folio_catalog=trace,folio_gutendex=trace,folio_config=trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load(cli.config.as_deref()).map_err(report)?;
    config.dry_run |= cli.dry_run;
    let librarian = commands::open(&config).await?;

    match cli.command {
        Commands::Search { title } => commands::search(&librarian, &title).await,
        Commands::Books { lang: Some(code), .. } => commands::books_in_language(&librarian, &code).await,
        Commands::Books { by, lang: None } => commands::books(&librarian, by.into()).await,
        Commands::Authors => commands::authors(&librarian).await,
        Commands::Alive { year } => commands::alive(&librarian, year).await,
        Commands::Born { year } => commands::born_or_died(&librarian, Criterion::Born, year).await,
        Commands::Died { year } => commands::born_or_died(&librarian, Criterion::Died, year).await,
        Commands::BornBetween { start, end } => commands::born_between(&librarian, start, end).await,
        Commands::Lang { code } => commands::lang(&librarian, &code).await,
        Commands::Langs => commands::langs(&librarian).await,
        Commands::Compare { first, second } => commands::compare(&librarian, &first, &second).await,
        Commands::Distribution => commands::distribution(&librarian).await,
        Commands::Top { n } => commands::top(&librarian, n).await,
        Commands::Delete { id } => commands::delete(&librarian, id).await,
        Commands::Check { fix } => commands::check(&librarian, fix).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_hints_at_retry_for_transient_errors() {
        let busy = report(exn::Exn::from(folio_catalog::error::ErrorKind::Database));
        assert!(busy.help().is_some());

        let invalid = report(exn::Exn::from(folio_config::error::ErrorKind::Invalid("timeout")));
        assert!(invalid.help().is_none());
        assert!(format!("{invalid:?}").contains("timeout"));
    }
}

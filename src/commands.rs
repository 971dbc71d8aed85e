//! One function per subcommand. Everything printed here goes to stdout; logs go
//! to stderr.

use crate::report;
use folio_catalog::models::{AuthorWithBooks, Book, BookOrder};
use folio_catalog::{Database, Repository};
use folio_config::Config;
use folio_gutendex::lookup::GutendexClient;
use folio_library::query::{Criterion, language_display_name};
use folio_library::{Ingest, Librarian};
use miette::{IntoDiagnostic, Result};
use std::sync::Arc;

pub async fn open(config: &Config) -> Result<Librarian> {
    if let Some(parent) = config.database.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    let db = Database::connect(&config.database).await.map_err(report)?;
    let repo = Repository::new(db.pool().clone(), config.dry_run);
    let lookup = GutendexClient::new(&config.lookup.base_url, &config.lookup.user_agent, config.lookup.timeout())
        .map_err(report)?;
    let librarian = Librarian::new(repo, Arc::new(lookup));
    if librarian.is_dry_run() {
        tracing::info!("dry run: no changes will be committed");
    }
    Ok(librarian)
}

fn language(code: Option<&str>) -> String {
    code.map_or_else(|| "unknown".to_string(), language_display_name)
}

fn print_book(book: &Book) {
    let downloads = book.download_count.map_or_else(|| "-".to_string(), |n| n.to_string());
    println!(
        "{:>8}  {}  [{}]  downloads: {}",
        book.id,
        book.title,
        language(book.language.as_deref()),
        downloads
    );
}

fn print_authors(authors: &[AuthorWithBooks]) {
    if authors.is_empty() {
        println!("No matching authors.");
    }
    for entry in authors {
        println!("{}  ({} book(s))", entry.author, entry.books);
    }
}

pub async fn search(librarian: &Librarian, title: &str) -> Result<()> {
    match librarian.ingest(title).await.map_err(report)? {
        Ingest::Cataloged(book) => {
            println!("Catalogued:");
            print_book(&book);
        },
        Ingest::AlreadyCataloged(book) => {
            println!("Already in the catalog:");
            print_book(&book);
        },
        Ingest::NotFound => println!("No book found for \"{title}\"."),
    }
    Ok(())
}

pub async fn books(librarian: &Librarian, order: BookOrder) -> Result<()> {
    let books = librarian.list_books(order).await.map_err(report)?;
    if books.is_empty() {
        println!("The catalog is empty.");
    }
    books.iter().for_each(print_book);
    Ok(())
}

pub async fn books_in_language(librarian: &Librarian, code: &str) -> Result<()> {
    let listing = librarian.books_in_language(code).await.map_err(report)?;
    let name = language_display_name(&listing.language);
    if listing.books.is_empty() {
        println!("No books in {name}.");
        return Ok(());
    }
    listing.books.iter().for_each(print_book);
    println!(
        "{} book(s) in {name}, {} with download data.",
        listing.books.len(),
        listing.with_downloads
    );
    Ok(())
}

pub async fn authors(librarian: &Librarian) -> Result<()> {
    let authors = librarian.list_authors().await.map_err(report)?;
    if authors.is_empty() {
        println!("No authors catalogued.");
    }
    for author in authors {
        println!("{author}");
        for book in librarian.books_by_author(author.id).await.map_err(report)? {
            println!("    - {}", book.title);
        }
    }
    Ok(())
}

pub async fn alive(librarian: &Librarian, year: i32) -> Result<()> {
    let group = librarian.alive_group_stats(year).await.map_err(report)?;
    println!("Authors alive in {}:", group.year);
    print_authors(&group.authors);
    if let Some(average) = group.average_age {
        println!("Average age: {average:.1}");
    }
    if let Some(youngest) = &group.youngest {
        println!("Youngest: {}", youngest.author);
    }
    if let Some(oldest) = &group.oldest {
        println!("Oldest: {}", oldest.author);
    }
    println!("Books by these authors: {}", group.total_books);
    Ok(())
}

pub async fn born_or_died(librarian: &Librarian, criterion: Criterion, year: i32) -> Result<()> {
    let authors = librarian.query_born_or_died_in_year(criterion, year).await.map_err(report)?;
    print_authors(&authors);
    Ok(())
}

pub async fn born_between(librarian: &Librarian, start: i32, end: i32) -> Result<()> {
    let groups = librarian.query_born_between(start, end).await.map_err(report)?;
    if groups.is_empty() {
        println!("No authors born between {start} and {end}.");
    }
    for group in groups {
        println!("{}:", group.century);
        for entry in &group.authors {
            println!("    {}", entry.author);
        }
    }
    if let Some(range) = librarian.birth_year_range().await.map_err(report)? {
        println!("Catalogued birth years span {}-{}.", range.start(), range.end());
    }
    Ok(())
}

pub async fn lang(librarian: &Librarian, code: &str) -> Result<()> {
    let summary = librarian.language_stats(code).await.map_err(report)?;
    println!("{} ({}): {} book(s)", language_display_name(&summary.language), summary.language, summary.books);
    if let Some(downloads) = summary.downloads {
        println!(
            "Downloads: total {}, average {:.1}, max {}, min {}",
            downloads.total, downloads.average, downloads.max, downloads.min
        );
    }
    Ok(())
}

pub async fn langs(librarian: &Librarian) -> Result<()> {
    let breakdown = librarian.all_language_stats().await.map_err(report)?;
    if breakdown.is_empty() {
        println!("The catalog is empty.");
    }
    for entry in breakdown {
        let average = entry.average_downloads.map_or_else(|| "-".to_string(), |avg| format!("{avg:.1}"));
        let max = entry.max_downloads.map_or_else(|| "-".to_string(), |max| max.to_string());
        println!(
            "{:<20} {:>5} book(s)  downloads: total {}, average {average}, max {max}",
            language(entry.language.as_deref()),
            entry.count,
            entry.total_downloads
        );
    }
    Ok(())
}

pub async fn compare(librarian: &Librarian, first: &str, second: &str) -> Result<()> {
    let comparison = librarian.compare_languages(first, second).await.map_err(report)?;
    for (code, count, average) in [
        (&comparison.first, comparison.count_a, comparison.avg_downloads_a),
        (&comparison.second, comparison.count_b, comparison.avg_downloads_b),
    ] {
        let average = average.map_or_else(|| "-".to_string(), |avg| format!("{avg:.1}"));
        println!("{:<20} {count:>5} book(s)  average downloads: {average}", language_display_name(code));
    }
    match &comparison.winner_by_count {
        Some(winner) => println!("More books in {}.", language_display_name(winner)),
        None => println!("Both languages have the same number of books."),
    }
    Ok(())
}

pub async fn distribution(librarian: &Librarian) -> Result<()> {
    let shares = librarian.language_distribution().await.map_err(report)?;
    if shares.is_empty() {
        println!("The catalog is empty.");
    }
    for share in shares {
        println!("{:<20} {:>5} book(s)  {:>5.1}%", language(share.language.as_deref()), share.count, share.percentage);
    }
    let available = librarian.available_languages().await.map_err(report)?;
    if !available.is_empty() {
        println!("Languages: {}", available.join(", "));
    }
    Ok(())
}

pub async fn top(librarian: &Librarian, n: usize) -> Result<()> {
    let books = librarian.top_by_downloads(n).await.map_err(report)?;
    for (rank, book) in books.iter().enumerate() {
        print!("{:>3}. ", rank + 1);
        print_book(book);
    }
    Ok(())
}

pub async fn delete(librarian: &Librarian, id: u64) -> Result<()> {
    let title = librarian.get_book(id).await.map_err(report)?.map(|book| book.title);
    if librarian.delete_book(id).await.map_err(report)? {
        println!("Deleted {id}: {}", title.unwrap_or_default());
    } else {
        println!("No book with id {id}.");
    }
    Ok(())
}

pub async fn check(librarian: &Librarian, fix: bool) -> Result<()> {
    let integrity = librarian.integrity_check().await.map_err(report)?;
    println!("Books without an author: {}", integrity.books_without_author);
    println!("Authors without books: {}", integrity.authors_without_books);
    if integrity.is_healthy() {
        println!("Catalog is healthy.");
    } else if fix {
        let removed = librarian.delete_orphaned_authors().await.map_err(report)?;
        println!("Removed {removed} orphaned author(s).");
    }
    Ok(())
}

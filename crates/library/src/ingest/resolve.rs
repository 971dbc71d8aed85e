//! Author identity resolution.
//!
//! Identity is the exact name string. "Jane Austen", "jane austen" and
//! "Jane Austen " are three different authors, and that is intended.

use crate::ingest::error::{ErrorKind, Result};
use exn::ResultExt;
use folio_catalog::Transaction;
use folio_catalog::models::{Author, NewAuthor, Upsert};
use folio_gutendex::models::Person;

/// Check a person is fit to become a catalogued author.
///
/// The name is passed through untouched: no trimming, no case folding.
pub fn validate_author(person: &Person) -> Result<NewAuthor> {
    if person.name.trim().is_empty() {
        exn::bail!(ErrorKind::InvalidAuthor(format!("blank name {:?}", person.name)));
    }
    if let (Some(birth), Some(death)) = (person.birth_year, person.death_year)
        && birth > death
    {
        exn::bail!(ErrorKind::InvalidAuthor(format!(
            "{} was born in {birth}, after dying in {death}",
            person.name
        )));
    }
    Ok(NewAuthor::new(person.name.clone(), person.birth_year, person.death_year))
}

/// Find the author with exactly this name, or create it, inside the caller's
/// transaction.
pub async fn resolve_author(tx: &mut Transaction, author: &NewAuthor) -> Result<Upsert<Author>> {
    let upsert = tx.upsert_author(author).await.or_raise(|| ErrorKind::Catalog)?;
    if upsert.is_created() {
        tracing::debug!(name = %author.name, "created author");
    }
    Ok(upsert)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_catalog::{Database, Repository};
    use rstest::rstest;

    #[rstest]
    #[case(Person::new(""))]
    #[case(Person::new("   "))]
    #[case(Person::new("\t\n"))]
    #[case(Person::from(("Backwards, Benjamin", Some(1900), Some(1850))))]
    fn test_validate_rejects(#[case] person: Person) {
        let err = validate_author(&person).unwrap_err();
        assert!(matches!(*err, ErrorKind::InvalidAuthor(_)));
    }

    #[rstest]
    #[case(Person::new("Homer"))]
    #[case(Person::from(("Austen, Jane", Some(1775), Some(1817))))]
    #[case(Person::from(("Keats, John", Some(1795), Some(1795))))]
    #[case(Person::from(("Atwood, Margaret", Some(1939), None)))]
    fn test_validate_accepts(#[case] person: Person) {
        let author = validate_author(&person).unwrap();
        assert_eq!(author.name, person.name);
        assert_eq!(author.birth_year, person.birth_year);
    }

    #[tokio::test]
    async fn test_resolve_is_case_sensitive() {
        let db = Database::connect_in_memory().await.unwrap();
        let repo = Repository::from(&db);
        let mut tx = repo.begin().await.unwrap();
        let first = resolve_author(&mut tx, &NewAuthor::new("Jane Austen", None, None)).await.unwrap();
        let second = resolve_author(&mut tx, &NewAuthor::new("Jane Austen", Some(1775), None)).await.unwrap();
        let lower = resolve_author(&mut tx, &NewAuthor::new("jane austen", None, None)).await.unwrap();
        tx.commit().await.unwrap();

        assert!(first.is_created());
        assert!(!second.is_created());
        assert!(lower.is_created());
        let (first, second, lower) = (first.into_inner(), second.into_inner(), lower.into_inner());
        assert_eq!(first.id, second.id);
        assert_ne!(first.id, lower.id);
    }
}

use super::{Language, Person, null_as_default};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Download formats in order of preference when picking a single URL.
const PREFERRED_FORMATS: [&str; 3] = ["text/html", "text/plain; charset=utf-8", "application/epub+zip"];

/// A raw book record as returned by the lookup, before any validation.
///
/// Every field is optional or defaulted: the source is trusted for shape only,
/// and it's the ingestion step that decides what is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Candidate {
    /// External identifier assigned by the source (Project Gutenberg ebook number).
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    /// Credited authors, in source order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub authors: Vec<Person>,
    /// Language codes, in source order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<String>,
    #[serde(default)]
    pub download_count: Option<i64>,
    /// MIME type to URL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub formats: BTreeMap<String, String>,
}

impl Candidate {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<Person>) -> Self {
        self.authors.push(author.into());
        self
    }

    pub fn with_language(mut self, code: impl Into<String>) -> Self {
        self.languages.push(code.into());
        self
    }

    pub fn with_downloads(mut self, download_count: i64) -> Self {
        self.download_count = Some(download_count);
        self
    }

    pub fn with_format(mut self, mime: impl Into<String>, url: impl Into<String>) -> Self {
        self.formats.insert(mime.into(), url.into());
        self
    }

    /// Only the first credited author is ever catalogued.
    pub fn first_author(&self) -> Option<&Person> {
        self.authors.first()
    }

    /// Only the first listed language is ever catalogued. Blank codes count
    /// as no language at all.
    pub fn first_language(&self) -> Option<Language> {
        self.languages.first().map(Language::new).filter(|lang| !lang.is_empty())
    }

    /// Picks one download link out of the formats map.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_gutendex::models::Candidate;
    /// let candidate = Candidate::new(1342, "Pride and Prejudice")
    ///     .with_format("application/epub+zip", "https://example.org/1342.epub")
    ///     .with_format("text/html", "https://example.org/1342.html");
    /// assert_eq!(candidate.download_url(), Some("https://example.org/1342.html"));
    /// ```
    pub fn download_url(&self) -> Option<&str> {
        PREFERRED_FORMATS
            .iter()
            .find_map(|mime| self.formats.get(*mime))
            .or_else(|| self.formats.values().next())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_gutendex_record() {
        let json = r#"{
            "id": 84,
            "title": "Frankenstein; Or, The Modern Prometheus",
            "authors": [{"name": "Shelley, Mary Wollstonecraft", "birth_year": 1797, "death_year": 1851}],
            "summaries": ["ignored"],
            "languages": ["en"],
            "copyright": false,
            "media_type": "Text",
            "formats": {
                "application/epub+zip": "https://www.gutenberg.org/ebooks/84.epub3.images",
                "text/plain; charset=us-ascii": "https://www.gutenberg.org/ebooks/84.txt.utf-8"
            },
            "download_count": 104505
        }"#;
        let candidate: Candidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.id, Some(84));
        assert_eq!(candidate.first_author().unwrap().name, "Shelley, Mary Wollstonecraft");
        assert_eq!(candidate.first_author().unwrap().death_year, Some(1851));
        assert_eq!(candidate.first_language(), Some(Language::new("en")));
        assert_eq!(candidate.download_count, Some(104505));
        assert_eq!(candidate.download_url(), Some("https://www.gutenberg.org/ebooks/84.epub3.images"));
    }

    #[test]
    fn test_deserialize_sparse_record() {
        let candidate: Candidate =
            serde_json::from_str(r#"{"id": null, "authors": null, "languages": [], "formats": null}"#).unwrap();
        assert_eq!(candidate, Candidate::default());
        assert_eq!(candidate.first_author(), None);
        assert_eq!(candidate.first_language(), None);
        assert_eq!(candidate.download_url(), None);
    }

    #[test]
    fn test_only_first_author_and_language() {
        let candidate = Candidate::new(1, "Good Omens")
            .with_author(Person::new("Pratchett, Terry"))
            .with_author(Person::new("Gaiman, Neil"))
            .with_language("EN")
            .with_language("fr");
        assert_eq!(candidate.first_author().unwrap().name, "Pratchett, Terry");
        assert_eq!(candidate.first_language().unwrap().code, "en");
    }

    #[test]
    fn test_blank_language_is_unset() {
        let candidate = Candidate::new(1, "Untitled").with_language("  ");
        assert_eq!(candidate.first_language(), None);
    }

    #[test]
    fn test_download_url_fallback_is_first_key() {
        let candidate = Candidate::new(1, "Untitled")
            .with_format("image/jpeg", "https://example.org/cover.jpg")
            .with_format("application/rdf+xml", "https://example.org/1.rdf");
        assert_eq!(candidate.download_url(), Some("https://example.org/1.rdf"));
    }
}

//! Language code normalization and display names.
//!
//! The source lists languages as ISO-639 codes (mostly two letters). Codes are
//! stored lowercase; display names are only used for presentation.

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::LazyLock;

/// A normalized (trimmed, lowercase) language code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Language {
    pub code: String,
}
impl Language {
    pub fn new(code: impl AsRef<str>) -> Self {
        Self {
            code: code.as_ref().trim().to_lowercase(),
        }
    }

    /// Human readable name, falling back to the uppercased code.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_gutendex::models::Language;
    /// assert_eq!(Language::new("EN").display_name(), "English");
    /// assert_eq!(Language::new("tl").display_name(), "TL");
    /// ```
    pub fn display_name(&self) -> String {
        match Self::code_to_name(&self.code) {
            Some(name) => name.to_string(),
            None => self.code.to_uppercase(),
        }
    }

    /// Returns the English display name for a given ISO-639 code.
    ///
    /// # Examples
    ///
    /// ```
    /// use folio_gutendex::models::Language;
    /// assert_eq!(Language::code_to_name("es"), Some("Spanish"));
    /// assert_eq!(Language::code_to_name("Unknown"), None);
    /// ```
    pub fn code_to_name(code: &str) -> Option<&'static str> {
        LANGUAGES.get(code).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}
impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.code)
    }
}

/// Codes that show up in Project Gutenberg metadata often enough to be worth
/// naming.
static LANGUAGES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("ar", "Arabic"),
        ("ca", "Catalan"),
        ("cs", "Czech"),
        ("cy", "Welsh"),
        ("da", "Danish"),
        ("de", "German"),
        ("el", "Greek"),
        ("en", "English"),
        ("eo", "Esperanto"),
        ("es", "Spanish"),
        ("fi", "Finnish"),
        ("fr", "French"),
        ("ga", "Irish"),
        ("he", "Hebrew"),
        ("hu", "Hungarian"),
        ("is", "Icelandic"),
        ("it", "Italian"),
        ("ja", "Japanese"),
        ("ko", "Korean"),
        ("la", "Latin"),
        ("nl", "Dutch"),
        ("no", "Norwegian"),
        ("pl", "Polish"),
        ("pt", "Portuguese"),
        ("ro", "Romanian"),
        ("ru", "Russian"),
        ("sv", "Swedish"),
        ("tr", "Turkish"),
        ("uk", "Ukrainian"),
        ("zh", "Chinese"),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_normalized() {
        assert_eq!(Language::new(" EN ").code, "en");
        assert_eq!(Language::new("Es"), Language::new("es"));
        assert!(Language::new("   ").is_empty());
    }

    #[test]
    fn code_returns_name() {
        assert_eq!(Language::code_to_name("en"), Some("English"));
        assert_eq!(Language::code_to_name("de"), Some("German"));
        assert_eq!(Language::code_to_name("English"), None);
        assert_eq!(Language::code_to_name(""), None);
    }
}

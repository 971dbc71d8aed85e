use super::null_as_default;
use serde::Deserialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::{convert::Infallible, str::FromStr};

/// A person credited as an author of a candidate book.
///
/// The name is kept exactly as the source spelled it: identity resolution
/// downstream depends on byte-for-byte equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct Person {
    /// Display name, usually "Surname, Forenames"
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub birth_year: Option<i32>,
    /// Absent when the person is alive or the year is unknown.
    #[serde(default)]
    pub death_year: Option<i32>,
}
impl Person {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            birth_year: None,
            death_year: None,
        }
    }

    pub fn with_lifespan(mut self, birth_year: Option<i32>, death_year: Option<i32>) -> Self {
        self.birth_year = birth_year;
        self.death_year = death_year;
        self
    }
}

impl FromStr for Person {
    type Err = Infallible;
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(name))
    }
}
impl From<String> for Person {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}
impl<N: Into<String>> From<(N, Option<i32>, Option<i32>)> for Person {
    fn from((name, birth_year, death_year): (N, Option<i32>, Option<i32>)) -> Self {
        Self::new(name).with_lifespan(birth_year, death_year)
    }
}

impl Display for Person {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match (self.birth_year, self.death_year) {
            (None, None) => write!(f, "{}", self.name),
            (birth, death) => {
                let birth = birth.map_or_else(|| "?".to_string(), |y| y.to_string());
                let death = death.map_or_else(|| "present".to_string(), |y| y.to_string());
                write!(f, "{} ({birth}-{death})", self.name)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Person::new("Austen, Jane"), "Austen, Jane")]
    #[case(Person::from(("Austen, Jane", Some(1775), Some(1817))), "Austen, Jane (1775-1817)")]
    #[case(Person::from(("Atwood, Margaret", Some(1939), None)), "Atwood, Margaret (1939-present)")]
    #[case(Person::from(("Homer", None, Some(-700))), "Homer (?--700)")]
    fn test_display(#[case] person: Person, #[case] expected: &str) {
        assert_eq!(person.to_string(), expected);
    }

    #[test]
    fn test_deserialize_null_name() {
        let person: Person = serde_json::from_str(r#"{"name":null,"birth_year":1800}"#).unwrap();
        assert_eq!(person.name, "");
        assert_eq!(person.birth_year, Some(1800));
        assert_eq!(person.death_year, None);
    }
}

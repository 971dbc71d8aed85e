mod candidate;
mod lang;
mod page;
mod person;

pub use self::candidate::Candidate;
pub use self::lang::Language;
pub use self::page::SearchPage;
pub use self::person::Person;

use serde::{Deserialize, Deserializer};

/// The search API sends `null` for fields that are usually present; treat it
/// the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

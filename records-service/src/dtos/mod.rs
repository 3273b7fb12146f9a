//! Request bodies accepted by the records API.

pub mod dates;
pub mod library;
pub mod professors;
pub mod students;

use serde::{Deserialize, Deserializer};

/// Distinguish an absent key (`None`) from an explicit `null` (`Some(None)`).
/// Use together with `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

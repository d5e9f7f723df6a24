use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer};

pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod suppliers;
pub mod users;

#[derive(Deserialize)]
#[serde(untagged)]
enum ValueOrText<T> {
    Value(T),
    Text(String),
}

/// Accepts a typed JSON value or its textual form (multipart fields arrive as
/// text). Blank text is treated as absent.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Option::<ValueOrText<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(ValueOrText::Value(v)) => Ok(Some(v)),
        Some(ValueOrText::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(ValueOrText::Text(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

//! Wire and domain models for the upstream services.
//!
//! Every third-party response is read through an explicit optional-field
//! schema and then converted into an owned domain type with defined
//! fallbacks, so a missing field never panics the terminal.

pub mod candle;
pub mod chat;
pub mod price;
pub mod token;

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Deserializes a number (or numeric string) into a [`Decimal`], yielding
/// `None` for nulls and values that do not fit.
///
/// Upstream prices are plain JSON floats, and tiny ones arrive in
/// scientific notation (`1.234e-5`).
pub(crate) fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(decimal_from_value))
}

/// Deserializes a count that the provider sometimes sends as a float.
pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| match v {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }))
}

/// Deserializes a collection field, treating an explicit `null` like a
/// missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Converts a JSON scalar into a [`Decimal`].
pub(crate) fn decimal_from_value(value: &serde_json::Value) -> Option<Decimal> {
    let text = match value {
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

//! Lenient field decoding for third-party JSON
//!
//! Upstream APIs are inconsistent about types: ids arrive as strings or
//! numbers, artists as a string or a list, durations as numbers, numeric
//! strings or "". These helpers flatten all of that into plain Rust types.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// String, number or bool rendered as text; null and other shapes become ""
pub fn flexible_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_string(&Value::deserialize(deserializer)?))
}

/// Like [`flexible_string`] but keeps absence distinguishable from ""
pub fn optional_flexible_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(value_to_string(&other)).filter(|s| !s.is_empty()),
    })
}

/// Artist field: a plain string, a list of names, or a list of `{name}` objects
pub fn artist_names<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => join_artists(&items),
        other => value_to_string(&other),
    })
}

/// Non-negative integer from a number or numeric string; anything else is None
pub fn flexible_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Join artist entries with ", "
pub fn join_artists(items: &[Value]) -> String {
    items
        .iter()
        .map(|item| match item {
            Value::Object(map) => map.get("name").map(value_to_string).unwrap_or_default(),
            other => value_to_string(other),
        })
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

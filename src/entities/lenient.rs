//! Tolerant deserializers for fields produced by the extraction service
//!
//! The extraction step emits numbers as strings, strings as numbers and
//! `"null"` where a field is missing. These helpers accept all of them.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse a free-form quantity: `None`/`NULL` and unparseable text become 0,
/// thousands separators and unit suffixes are dropped, a leading `-` is kept
pub fn parse_quantity(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
        return 0.0;
    }
    let digits: String = trimmed
        .replace(',', "")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    let cleaned = if trimmed.starts_with('-') {
        format!("-{}", digits)
    } else {
        digits
    };
    match cleaned.parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::debug!(raw = %trimmed, "unreadable quantity, counted as 0");
            0.0
        }
    }
}

fn value_to_string(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Accept a string, a number or null as a `String`
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(value_to_string).unwrap_or_default())
}

/// Accept a string, a number or null as an optional `String`
pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .map(value_to_string)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null")))
}

/// Accept a number, a numeric string or null as a quantity
pub fn quantity<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => parse_quantity(&s),
        _ => 0.0,
    })
}

/// Like [`quantity`] but keeps "absent" distinct from zero
pub fn opt_quantity<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if !s.trim().is_empty() && !s.trim().eq_ignore_ascii_case("null") => {
            Some(parse_quantity(&s))
        }
        _ => None,
    })
}

//! Lenient decoding for upstream financial records.
//!
//! Upstream figures arrive from document extraction and may be numbers,
//! numeric strings, `null`, or garbage. Anything that is not a finite number
//! decodes as `None`, and every consumer reads `None` as 0. Whole sections
//! that are `null` or the wrong shape decode as their default.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Integer part in groups of three with one consistent separator, e.g.
/// `1,250,000`, `1 250 000` or `1_250_000.50`.
static GROUPED_NUMBER: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"^[+-]?\d{1,3}(?:(?:,\d{3})+|(?: \d{3})+|(?:_\d{3})+)(?:\.\d+)?$").ok()
});

/// Serde `deserialize_with` hook for `Option<f64>` fields.
pub fn lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce(&value))
}

/// Serde `deserialize_with` hook for sections: `null` or a value of the
/// wrong shape decodes as `T::default()`.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Serde `deserialize_with` hook for lists: each malformed element decodes
/// as `T::default()` so positions are kept; a non-array is an empty list.
pub fn each_or_default<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .map(|item| serde_json::from_value(item).unwrap_or_default())
        .collect())
}

/// Serde `deserialize_with` hook for optional records: anything that does
/// not decode cleanly is `None`.
pub fn or_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Coerce an arbitrary JSON value into a finite `f64`.
pub fn coerce(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_str(s),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

/// Plain decimals with a `.` decimal point, optionally grouped in
/// thousands by `,`, `_` or spaces. A comma anywhere else (`0,8`, `1,5`) is
/// ambiguous and rejected.
fn parse_numeric_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if !trimmed.contains([',', '_', ' ']) {
        return trimmed.parse::<f64>().ok();
    }
    let grouped = GROUPED_NUMBER
        .as_ref()
        .is_some_and(|re| re.is_match(trimmed));
    if !grouped {
        return None;
    }
    let cleaned: String = trimmed
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect();
    cleaned.parse::<f64>().ok()
}

/// Missing figures count as zero.
#[inline]
pub fn or_zero(value: Option<f64>) -> f64 {
    value.unwrap_or(0.0)
}

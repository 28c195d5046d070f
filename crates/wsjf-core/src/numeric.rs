//! Total coercion of raw user and storage input.
//!
//! Every function here is fail-soft: input that cannot be understood becomes
//! zero (for numbers) or `None` (for optional ratios and dates). A single bad
//! field must never abort scoring or ordering of a whole item.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Coerce a raw JSON value into a finite number.
///
/// Numbers pass through, strings are trimmed and parsed, everything else
/// (null, booleans, arrays, objects, unparsable or non-finite text) is `0.0`.
pub fn parse_numeric_field(raw: &Value) -> f64 {
    match raw {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Value::String(s) => parse_numeric_str(s),
        _ => 0.0,
    }
}

/// String form of [`parse_numeric_field`], used for CLI input.
pub fn parse_numeric_str(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Coerce an optional percentage field.
///
/// Missing, null and empty-string input mean "not provided" and return
/// `None`, which callers treat as 100%. Anything else is coerced with
/// [`parse_numeric_field`], so `"0"` and garbage both yield `Some(0.0)`.
pub fn parse_ratio_field(raw: Option<&Value>) -> Option<f64> {
    match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(other) => Some(parse_numeric_field(other)),
    }
}

/// Convert a percentage (already coerced) into a multiplier.
pub fn ratio_factor(percent: Option<f64>) -> f64 {
    percent.map_or(1.0, |p| p / 100.0)
}

/// Parse a deadline string.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM[:SS]` (taken as UTC) and
/// plain `YYYY-MM-DD` dates (UTC midnight). Returns `None` otherwise.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

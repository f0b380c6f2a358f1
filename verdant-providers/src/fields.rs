//! Lenient field readers for provider JSON.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Outcome of reading a numeric field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Numeric {
    /// Missing, null or blank.
    Absent,
    Value(f64),
    /// Present but not a finite number.
    Malformed,
}

/// Numeric field under `key`, accepting JSON numbers and numeric strings.
pub(crate) fn numeric(rec: &Value, key: &str) -> Numeric {
    let parsed = match rec.get(key) {
        None | Some(Value::Null) => return Numeric::Absent,
        Some(Value::String(s)) if s.trim().is_empty() => return Numeric::Absent,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match parsed {
        Some(v) if v.is_finite() => Numeric::Value(v),
        _ => Numeric::Malformed,
    }
}

/// Number under `key`; malformed values read as absent.
pub(crate) fn number(rec: &Value, key: &str) -> Option<f64> {
    match numeric(rec, key) {
        Numeric::Value(v) => Some(v),
        Numeric::Absent | Numeric::Malformed => None,
    }
}

/// Number under `key`, noting a malformed value in `issues` against `id`.
pub(crate) fn checked_number(
    rec: &Value,
    key: &str,
    id: &str,
    issues: &mut Vec<String>,
) -> Option<f64> {
    match numeric(rec, key) {
        Numeric::Value(v) => Some(v),
        Numeric::Absent => None,
        Numeric::Malformed => {
            issues.push(format!("{id}: {key} is not numeric"));
            None
        }
    }
}

/// First non-empty string found under any of `keys`.
pub(crate) fn text<'a>(rec: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| rec.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Parse a provider timestamp: RFC 3339, `YYYY-MM-DD HH:MM:SS` or a bare date.
pub(crate) fn timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(t.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
}

/// Calendar year under `key`, as a number or a string.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn year(rec: &Value, key: &str) -> Option<i32> {
    number(rec, key)
        .filter(|y| (1900.0..=2200.0).contains(y))
        .map(|y| y as i32)
}

/// Round to one decimal place.
pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

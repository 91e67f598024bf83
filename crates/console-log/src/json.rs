//! Best-effort JSON and date helpers. None of these fail.

use browserlog_protocol::constants::{COULD_NOT_PARSE_DATE, COULD_NOT_STRINGIFY};
use chrono::{DateTime, SecondsFormat};
use serde::Serialize;
use serde_json::Value;

/// Serializes `value`, returning [`COULD_NOT_STRINGIFY`] on failure.
pub fn stringify_with_catch<T: Serialize + ?Sized>(value: &T, indent: bool) -> String {
    stringify_or(value, indent, COULD_NOT_STRINGIFY)
}

/// Serializes `value`, returning `fallback` on failure.
pub fn stringify_or<T: Serialize + ?Sized>(value: &T, indent: bool, fallback: &str) -> String {
    let result = if indent {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    result.unwrap_or_else(|_| fallback.to_string())
}

/// Parses `text` as JSON, returning `None` when it is not valid JSON.
pub fn try_parse_json(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

/// Renders epoch milliseconds as an ISO-8601 UTC date with millisecond precision.
///
/// Fractional milliseconds are truncated. Non-finite or out-of-range
/// timestamps give [`COULD_NOT_PARSE_DATE`].
pub fn date_with_catch(timestamp: f64) -> String {
    if !timestamp.is_finite() {
        return COULD_NOT_PARSE_DATE.to_string();
    }
    DateTime::from_timestamp_millis(timestamp.trunc() as i64)
        .map(|d| d.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| COULD_NOT_PARSE_DATE.to_string())
}

/// JavaScript truthiness of a JSON value.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

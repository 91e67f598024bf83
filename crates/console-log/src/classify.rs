//! Severity classification of console messages.

use browserlog_protocol::LogType;
use serde_json::Value;

use crate::json::{is_truthy, try_parse_json};

/// `true` when `message` is a JSON object with a truthy `Event` field and an
/// `Error` key, the shape an implicitly thrown error is serialized into.
pub fn is_uncaught_error(message: &str) -> bool {
    match try_parse_json(message) {
        Some(Value::Object(obj)) => {
            obj.get("Event").is_some_and(is_truthy) && obj.contains_key("Error")
        }
        _ => false,
    }
}

/// Classifies a console message given the console call type as a hint.
///
/// Always one of `error`, `warning`, `debug`, `log`.
pub fn classify(message: &str, hint: &str) -> LogType {
    if is_uncaught_error(message) {
        return LogType::Error;
    }
    match hint {
        "error" => LogType::Error,
        "warning" => LogType::Warning,
        "debug" => LogType::Debug,
        _ => LogType::Log,
    }
}

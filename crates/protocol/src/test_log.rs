//! Embedded test-log records.
//!
//! A test body writes one of these as a JSON string through `console.log`;
//! the pipeline recognizes it and publishes it as `test:log` instead of
//! ordinary console output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::COULD_NOT_STRINGIFY;

/// Tag value identifying a test-log record.
pub const TEST_LOG_TAG: &str = "test";

/// `{"log":"test","logType":..,"command"?:..,"message"?:..,"details"?:..}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestLogRecord {
    pub log: String,
    #[serde(default = "default_log_type")]
    pub log_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

fn default_log_type() -> String {
    TEST_LOG_TAG.to_string()
}

/// Outcome of a finished test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    Passed,
    Failed,
    Pending,
    Unknown,
}

impl TestOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Pending => "PENDING",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl TestLogRecord {
    /// Parses console text into a record.
    ///
    /// Only JSON objects whose `log` field equals `"test"` qualify; anything
    /// else (including malformed JSON) yields `None`.
    ///
    /// Once tagged, the other fields are read leniently: non-string
    /// `logType`, `command` and `message` values are rendered as JSON text,
    /// and a missing or null `logType` means `"test"`.
    pub fn parse(text: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(text).ok()?;
        let object = value.as_object()?;
        if object.get("log").and_then(Value::as_str) != Some(TEST_LOG_TAG) {
            return None;
        }

        Some(Self {
            log: TEST_LOG_TAG.to_string(),
            log_type: object
                .get("logType")
                .and_then(field_text)
                .unwrap_or_else(default_log_type),
            command: object.get("command").and_then(field_text),
            message: object.get("message").and_then(field_text),
            details: object.get("details").filter(|d| !d.is_null()).cloned(),
        })
    }

    fn new(log_type: &str) -> Self {
        Self {
            log: TEST_LOG_TAG.to_string(),
            log_type: log_type.to_string(),
            command: None,
            message: None,
            details: None,
        }
    }

    /// Record written when a test starts.
    pub fn test_started(full_title: &str) -> Self {
        Self {
            message: Some(format!("======== TEST STARTED: {full_title}")),
            ..Self::new("test")
        }
    }

    /// Record written when a test finishes. Failed tests are logged as errors.
    pub fn test_result(outcome: TestOutcome, error: Option<&str>) -> Self {
        let log_type = if outcome == TestOutcome::Failed {
            "error"
        } else {
            "test"
        };
        Self {
            message: Some(format!("==== TEST RESULT: {}", outcome.as_str())),
            details: error.map(|e| Value::String(e.to_string())),
            ..Self::new(log_type)
        }
    }

    /// Record written for a test command.
    ///
    /// Messages that are only an object summary such as `Object{3}` are
    /// blanked. `details`, when given, is embedded as a JSON-encoded string.
    pub fn command(name: &str, message: &str, details: Option<&Value>) -> Self {
        let message = if is_object_summary(message) {
            String::new()
        } else {
            message.to_string()
        };
        Self {
            command: Some(name.to_string()),
            message: Some(message),
            details: details.map(|d| {
                Value::String(
                    serde_json::to_string(d).unwrap_or_else(|_| "Could not stringify details".into()),
                )
            }),
            ..Self::new("test")
        }
    }

    /// Serializes the record into the single console line a test body writes.
    pub fn to_console_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| COULD_NOT_STRINGIFY.to_string())
    }
}

/// A record field as text. `null` counts as absent.
fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// `true` if `s` contains `Object{<digits>}`.
fn is_object_summary(s: &str) -> bool {
    s.match_indices("Object{").any(|(i, m)| {
        let rest = &s[i + m.len()..];
        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        digits > 0 && rest[digits..].starts_with('}')
    })
}

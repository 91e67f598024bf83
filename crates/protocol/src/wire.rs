//! Raw debugging-protocol payloads.
//!
//! The three log-bearing CDP events are parsed into tagged variants at the
//! protocol boundary. Shape detection looks at the distinguishing field of
//! each event (`exceptionDetails`, `args`, `entry`) and then deserializes the
//! full shape; a payload whose field is present but whose body does not fit
//! the schema becomes [`RawPayload::Malformed`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One entry of a reported stack trace (`Runtime.CallFrame`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    #[serde(default)]
    pub function_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub script_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub line_number: i64,
    #[serde(default)]
    pub column_number: i64,
}

/// `Runtime.StackTrace`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTrace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub call_frames: Vec<CallFrame>,
}

/// Console argument / exception value descriptor (`Runtime.RemoteObject`).
///
/// Fields the pipeline does not read are kept in `extra` so the argument can
/// be reserialized without losing information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteObject {
    #[serde(rename = "type", default)]
    pub object_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemoteObject {
    /// Returns the primitive value as a string when it is one.
    pub fn string_value(&self) -> Option<&str> {
        self.value.as_ref().and_then(Value::as_str)
    }
}

/// `Runtime.consoleAPICalled` parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleApiCall {
    #[serde(rename = "type", default)]
    pub call_type: String,
    pub args: Vec<RemoteObject>,
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_context_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<StackTrace>,
}

/// `Runtime.ExceptionDetails`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDetails {
    #[serde(default)]
    pub exception_id: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub line_number: i64,
    #[serde(default)]
    pub column_number: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<StackTrace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception: Option<RemoteObject>,
}

/// `Runtime.exceptionThrown` parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionThrown {
    #[serde(default)]
    pub timestamp: f64,
    pub exception_details: ExceptionDetails,
}

/// `Log.LogEntry`, unwrapped from `Log.entryAdded`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timestamp: f64,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<StackTrace>,
}

#[derive(Deserialize)]
struct LogEntryAdded {
    entry: LogEntry,
}

/// Which wire shape a payload was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    ConsoleApiCall,
    ExceptionThrown,
    LogEntry,
}

impl fmt::Display for PayloadShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ConsoleApiCall => "console API call",
            Self::ExceptionThrown => "exception",
            Self::LogEntry => "log entry",
        })
    }
}

/// A log-bearing payload received from the debugging protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    ExceptionThrown(ExceptionThrown),
    ConsoleApiCall(ConsoleApiCall),
    LogEntry(LogEntry),
    /// The distinguishing field was present but the body did not fit.
    Malformed {
        shape: PayloadShape,
        reason: String,
        raw: Value,
    },
    /// No known shape matched.
    Unknown(Value),
}

impl RawPayload {
    /// Classifies a JSON value by shape.
    ///
    /// Shapes are tried exception first, then console call, then log entry.
    pub fn from_value(value: Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::Unknown(value);
        };

        if obj.contains_key("exceptionDetails") {
            return match serde_json::from_value::<ExceptionThrown>(value.clone()) {
                Ok(ex) => Self::ExceptionThrown(ex),
                Err(e) => Self::malformed(PayloadShape::ExceptionThrown, e, value),
            };
        }

        if obj.contains_key("args") {
            return match serde_json::from_value::<ConsoleApiCall>(value.clone()) {
                Ok(call) => Self::ConsoleApiCall(call),
                Err(e) => Self::malformed(PayloadShape::ConsoleApiCall, e, value),
            };
        }

        if obj.contains_key("entry") {
            return match serde_json::from_value::<LogEntryAdded>(value.clone()) {
                Ok(added) => Self::LogEntry(added.entry),
                Err(e) => Self::malformed(PayloadShape::LogEntry, e, value),
            };
        }

        Self::Unknown(value)
    }

    /// Parses raw JSON text. Text that is not JSON becomes [`RawPayload::Unknown`]
    /// holding the text as a string value.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(value),
            Err(_) => Self::Unknown(Value::String(text.to_string())),
        }
    }

    /// Returns the recognized shape, if any.
    pub fn shape(&self) -> Option<PayloadShape> {
        match self {
            Self::ExceptionThrown(_) => Some(PayloadShape::ExceptionThrown),
            Self::ConsoleApiCall(_) => Some(PayloadShape::ConsoleApiCall),
            Self::LogEntry(_) => Some(PayloadShape::LogEntry),
            Self::Malformed { shape, .. } => Some(*shape),
            Self::Unknown(_) => None,
        }
    }

    fn malformed(shape: PayloadShape, err: serde_json::Error, raw: Value) -> Self {
        Self::Malformed {
            shape,
            reason: err.to_string(),
            raw,
        }
    }
}

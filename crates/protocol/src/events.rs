//! Normalized log records and bus event names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Logical kind of a log record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogType {
    Error,
    Warning,
    Log,
    Debug,
    Trace,
    Table,
    Test,
    Uncaught,
    /// A level reported by the browser that has no dedicated kind.
    Other(String),
}

impl LogType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Log => "log",
            Self::Debug => "debug",
            Self::Trace => "trace",
            Self::Table => "table",
            Self::Test => "test",
            Self::Uncaught => "UNCAUGHT",
            Self::Other(s) => s,
        }
    }

    /// Kinds that carry a stack.
    pub fn is_error_or_warning(&self) -> bool {
        matches!(self, Self::Error | Self::Warning)
    }
}

impl From<&str> for LogType {
    fn from(s: &str) -> Self {
        match s {
            "error" => Self::Error,
            "warning" => Self::Warning,
            "log" => Self::Log,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            "table" => Self::Table,
            "test" => Self::Test,
            "UNCAUGHT" => Self::Uncaught,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for LogType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<LogType> for String {
    fn from(t: LogType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a normalized record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    #[serde(rename = "console")]
    Console,
    #[serde(rename = "browser")]
    Browser,
    #[serde(rename = "console:test")]
    ConsoleTest,
}

/// Canonical record produced from a console call or a browser log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub source: Source,
    /// Epoch milliseconds.
    pub timestamp: f64,
    pub date: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_message: Option<String>,
    /// Present only for warnings and errors. Empty when the trace had no frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub log_type: LogType,
}

/// Uncaught exception reported by the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionEvent {
    pub timestamp: f64,
    pub date: String,
    pub message: String,
    pub full_message: String,
    pub log_type: LogType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Structured record a test body emitted through the console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestLogEvent {
    pub source: Source,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub log_type: LogType,
    pub timestamp: f64,
    pub date: String,
}

impl TestLogEvent {
    /// Renders `details` for display: strings verbatim, anything else as compact JSON.
    pub fn details_text(&self) -> Option<String> {
        self.details.as_ref().map(|d| match d {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

/// Closed set of names handlers can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventName {
    #[serde(rename = "exception")]
    Exception,
    #[serde(rename = "error")]
    Error,
    #[serde(rename = "warn")]
    Warn,
    #[serde(rename = "log")]
    Log,
    #[serde(rename = "debug")]
    Debug,
    #[serde(rename = "trace")]
    Trace,
    #[serde(rename = "table")]
    Table,
    #[serde(rename = "test:log")]
    TestLog,
}

impl EventName {
    pub const ALL: [EventName; 8] = [
        Self::Exception,
        Self::Error,
        Self::Warn,
        Self::Log,
        Self::Debug,
        Self::Trace,
        Self::Table,
        Self::TestLog,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exception => "exception",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Log => "log",
            Self::Debug => "debug",
            Self::Trace => "trace",
            Self::Table => "table",
            Self::TestLog => "test:log",
        }
    }

    /// Maps a classified log type to the event it is published under.
    ///
    /// `debug`, `warning`, `error` and `log` go through a fixed table; any
    /// other type is published under its literal name when that is an event
    /// name, and not at all otherwise.
    pub fn for_log_type(log_type: &LogType) -> Option<Self> {
        match log_type {
            LogType::Debug => Some(Self::Debug),
            LogType::Warning => Some(Self::Warn),
            LogType::Error => Some(Self::Error),
            LogType::Log => Some(Self::Log),
            other => other.as_str().parse().ok(),
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the bus event names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event name: {0}")]
pub struct UnknownEventName(pub String);

impl FromStr for EventName {
    type Err = UnknownEventName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownEventName(s.to_string()))
    }
}

/// A bus event: the name is determined by the variant, so the payload shape
/// always matches the name it is delivered under.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleEvent {
    Exception(ExceptionEvent),
    Error(LogEvent),
    Warn(LogEvent),
    Log(LogEvent),
    Debug(LogEvent),
    Trace(LogEvent),
    Table(LogEvent),
    TestLog(TestLogEvent),
}

impl ConsoleEvent {
    pub fn name(&self) -> EventName {
        match self {
            Self::Exception(_) => EventName::Exception,
            Self::Error(_) => EventName::Error,
            Self::Warn(_) => EventName::Warn,
            Self::Log(_) => EventName::Log,
            Self::Debug(_) => EventName::Debug,
            Self::Trace(_) => EventName::Trace,
            Self::Table(_) => EventName::Table,
            Self::TestLog(_) => EventName::TestLog,
        }
    }

    /// Wraps a normalized record under one of the plain log event names.
    ///
    /// Returns `None` for `exception` and `test:log`, which carry their own payloads.
    pub fn from_log(name: EventName, event: LogEvent) -> Option<Self> {
        match name {
            EventName::Error => Some(Self::Error(event)),
            EventName::Warn => Some(Self::Warn(event)),
            EventName::Log => Some(Self::Log(event)),
            EventName::Debug => Some(Self::Debug(event)),
            EventName::Trace => Some(Self::Trace(event)),
            EventName::Table => Some(Self::Table(event)),
            EventName::Exception | EventName::TestLog => None,
        }
    }

    /// The normalized record, for the plain log variants.
    pub fn as_log(&self) -> Option<&LogEvent> {
        match self {
            Self::Error(e)
            | Self::Warn(e)
            | Self::Log(e)
            | Self::Debug(e)
            | Self::Trace(e)
            | Self::Table(e) => Some(e),
            Self::Exception(_) | Self::TestLog(_) => None,
        }
    }
}

//! Wire shapes and normalized records for browser log redirection.

pub mod constants;
pub mod events;
pub mod test_log;
pub mod wire;

// Re-export primary types for convenience.
pub use events::{ConsoleEvent, EventName, ExceptionEvent, LogEvent, LogType, Source, TestLogEvent};
pub use test_log::{TestLogRecord, TestOutcome};
pub use wire::{
    CallFrame, ConsoleApiCall, ExceptionDetails, ExceptionThrown, LogEntry, PayloadShape,
    RawPayload, RemoteObject, StackTrace,
};

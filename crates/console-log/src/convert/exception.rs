use browserlog_protocol::constants::STACK_MARKER;
use browserlog_protocol::{ExceptionEvent, ExceptionThrown, LogType};

use crate::json::date_with_catch;

/// Converts a runtime exception.
///
/// The exception description is split at the first `" at "`: the part before
/// is the message, the rest the stack. Without the marker the whole
/// description is the message and there is no stack. Descriptions are missing
/// for thrown primitives; the exception text is used instead.
pub fn convert_exception(thrown: &ExceptionThrown) -> ExceptionEvent {
    let details = &thrown.exception_details;
    let description = details
        .exception
        .as_ref()
        .and_then(|e| e.description.as_deref())
        .unwrap_or(&details.text);

    let (message, stack) = match description.find(STACK_MARKER) {
        Some(at) => (
            description[..at].trim(),
            Some(description[at..].trim().to_string()),
        ),
        None => (description.trim(), None),
    };

    ExceptionEvent {
        timestamp: thrown.timestamp,
        date: date_with_catch(thrown.timestamp),
        message: message.to_string(),
        full_message: description.to_string(),
        log_type: LogType::Uncaught,
        stack,
    }
}

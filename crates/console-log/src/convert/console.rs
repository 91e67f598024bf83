use browserlog_protocol::constants::NO_MESSAGE_PARSED;
use browserlog_protocol::{ConsoleApiCall, LogEvent, Source, TestLogEvent, TestLogRecord};
use serde_json::Value;

use super::{convert_test_log, stack_for};
use crate::classify::classify;
use crate::json::{date_with_catch, stringify_with_catch};

/// Result of converting a console API call.
#[derive(Debug, Clone, PartialEq)]
pub enum Converted {
    Log(LogEvent),
    Test(TestLogEvent),
}

/// Converts a console API call.
///
/// Only the first argument is inspected: `console.log(a, b, c)` is reported
/// as `a`. Returns `None` for a call without arguments.
pub fn convert_console_call(call: &ConsoleApiCall) -> Option<Converted> {
    let arg = call.args.first()?;

    if let Some(record) = arg.string_value().and_then(TestLogRecord::parse) {
        return Some(Converted::Test(convert_test_log(record, call.timestamp)));
    }

    let log_type = classify(arg.string_value().unwrap_or_default(), &call.call_type);
    let full_message = stringify_with_catch(arg, false);
    let message = match &arg.value {
        None | Some(Value::Null) => format!("{NO_MESSAGE_PARSED} {full_message}"),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    let stack = stack_for(&log_type, call.stack_trace.as_ref());

    Some(Converted::Log(LogEvent {
        source: Source::Console,
        timestamp: call.timestamp,
        date: date_with_catch(call.timestamp),
        message,
        full_message: Some(full_message),
        stack,
        log_type,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use browserlog_protocol::{LogType, RawPayload};
    use serde_json::json;

    fn call(value: Value) -> ConsoleApiCall {
        match RawPayload::from_value(value) {
            RawPayload::ConsoleApiCall(call) => call,
            other => panic!("not a console call: {other:?}"),
        }
    }

    fn log_event(converted: Option<Converted>) -> LogEvent {
        match converted {
            Some(Converted::Log(event)) => event,
            other => panic!("expected log event, got {other:?}"),
        }
    }

    #[test]
    fn plain_log() {
        let event = log_event(convert_console_call(&call(json!({
            "type": "log",
            "args": [{"type": "string", "value": "My message"}],
            "timestamp": 1633576767343.0
        }))));
        assert_eq!(event.message, "My message");
        assert_eq!(event.log_type, LogType::Log);
        assert_eq!(event.source, Source::Console);
        assert_eq!(event.full_message.as_deref(), Some(r#"{"type":"string","value":"My message"}"#));
        assert_eq!(event.stack, None);
    }

    #[test]
    fn missing_value_reports_argument() {
        let event = log_event(convert_console_call(&call(json!({
            "type": "log",
            "args": [{"type": "string"}],
            "timestamp": 1633576767343.0
        }))));
        assert_eq!(event.message, r#"<No message parsed> {"type":"string"}"#);
    }

    #[test]
    fn non_string_values_are_rendered() {
        let event = log_event(convert_console_call(&call(json!({
            "type": "log",
            "args": [{"type": "number", "value": 42}],
            "timestamp": 0.0
        }))));
        assert_eq!(event.message, "42");
    }

    #[test]
    fn warning_carries_stack() {
        let event = log_event(convert_console_call(&call(json!({
            "type": "warning",
            "args": [{"type": "string", "value": "My message"}],
            "timestamp": 0.0,
            "stackTrace": {"callFrames": [{"url": "sds", "lineNumber": 1, "columnNumber": 2}]}
        }))));
        assert_eq!(event.log_type, LogType::Warning);
        assert_eq!(event.stack.as_deref(), Some("at sds:1 (<no functionName>)"));
    }

    #[test]
    fn serialized_error_is_error() {
        let event = log_event(convert_console_call(&call(json!({
            "type": "log",
            "args": [{"type": "string", "value": "{\"Event\":\"fail\",\"Error\":{}}"}],
            "timestamp": 0.0
        }))));
        assert_eq!(event.log_type, LogType::Error);
        assert_eq!(event.stack, None);
    }

    #[test]
    fn test_record_takes_precedence() {
        let converted = convert_console_call(&call(json!({
            "type": "error",
            "args": [{"type": "string", "value": "{\"log\":\"test\",\"logType\":\"test\",\"message\":\"hello from test\"}"}],
            "timestamp": 1633576767343.0
        })));
        let Some(Converted::Test(event)) = converted else {
            panic!("expected test event");
        };
        assert_eq!(event.message, "hello from test");
        assert_eq!(event.log_type, LogType::Test);
    }

    // Only the first argument is ever looked at; later arguments are dropped
    // even when they would classify differently.
    #[test]
    fn only_first_argument_is_inspected() {
        let event = log_event(convert_console_call(&call(json!({
            "type": "log",
            "args": [
                {"type": "string", "value": "first"},
                {"type": "string", "value": "{\"log\":\"test\",\"logType\":\"test\"}"},
                {"type": "string", "value": "third"}
            ],
            "timestamp": 0.0
        }))));
        assert_eq!(event.message, "first");
        assert_eq!(event.log_type, LogType::Log);
    }

    #[test]
    fn no_arguments() {
        assert_eq!(
            convert_console_call(&call(json!({"type": "log", "args": [], "timestamp": 0.0}))),
            None
        );
    }
}

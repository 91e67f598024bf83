use browserlog_protocol::{LogType, Source, TestLogEvent, TestLogRecord};
use serde_json::Value;

use crate::json::{date_with_catch, is_truthy, try_parse_json};

/// Converts an embedded test-log record.
///
/// A `details` string holding JSON is decoded so the event carries the
/// structured value; other strings are kept as they are. Falsy details
/// (`null`, `false`, `0`, `""`) are dropped.
pub fn convert_test_log(record: TestLogRecord, timestamp: f64) -> TestLogEvent {
    let details = match record.details {
        Some(Value::String(raw)) => match try_parse_json(&raw) {
            Some(Value::Null) | None => Some(Value::String(raw)),
            Some(parsed) => Some(parsed),
        },
        other => other,
    }
    .filter(is_truthy);

    TestLogEvent {
        source: Source::ConsoleTest,
        command: record.command.filter(|c| !c.is_empty()),
        message: record.message.unwrap_or_default(),
        details,
        log_type: LogType::from(record.log_type),
        timestamp,
        date: date_with_catch(timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(details: Option<Value>) -> TestLogRecord {
        TestLogRecord {
            log: "test".into(),
            log_type: "test".into(),
            command: Some("get".into()),
            message: Some("Hi from test".into()),
            details,
        }
    }

    #[test]
    fn plain_string_details_kept() {
        let event = convert_test_log(record(Some(json!("test"))), 1633576767343.0);
        assert_eq!(event.details, Some(json!("test")));
        assert_eq!(event.command.as_deref(), Some("get"));
        assert_eq!(event.source, Source::ConsoleTest);
        assert_eq!(event.date, "2021-10-07T03:19:27.343Z");
    }

    #[test]
    fn json_string_details_decoded() {
        let event = convert_test_log(record(Some(json!(r#"{"obj2":"value"}"#))), 0.0);
        assert_eq!(event.details, Some(json!({"obj2": "value"})));
    }

    #[test]
    fn details_survive_encoding() {
        let original = json!({"list": [1, 2, {"deep": true}], "name": "x", "n": null});
        let encoded = serde_json::to_string(&original).unwrap();
        let event = convert_test_log(record(Some(Value::String(encoded))), 0.0);
        assert_eq!(event.details, Some(original));
    }

    #[test]
    fn structured_details_pass_through() {
        let event = convert_test_log(record(Some(json!({"a": 1}))), 0.0);
        assert_eq!(event.details, Some(json!({"a": 1})));
    }

    #[test]
    fn empty_details_and_command_dropped() {
        let mut rec = record(Some(json!("")));
        rec.command = Some(String::new());
        rec.message = None;
        let event = convert_test_log(rec, 0.0);
        assert_eq!(event.details, None);
        assert_eq!(event.command, None);
        assert_eq!(event.message, "");
        assert_eq!(convert_test_log(record(Some(json!(null))), 0.0).details, None);
        assert_eq!(convert_test_log(record(None), 0.0).details, None);
    }

    #[test]
    fn falsy_details_dropped() {
        for falsy in [json!(false), json!(0), json!("0"), json!("false")] {
            assert_eq!(convert_test_log(record(Some(falsy)), 0.0).details, None);
        }
        assert_eq!(convert_test_log(record(Some(json!(true))), 0.0).details, Some(json!(true)));
        assert_eq!(convert_test_log(record(Some(json!("1"))), 0.0).details, Some(json!(1)));
    }

    #[test]
    fn log_type_is_taken_from_record() {
        let mut rec = record(None);
        rec.log_type = "error".into();
        assert_eq!(convert_test_log(rec, 0.0).log_type, LogType::Error);
    }
}

use browserlog_protocol::{LogEntry, LogEvent, LogType, Source};

use super::stack_for;
use crate::json::date_with_catch;

/// Converts a browser log entry. The entry level becomes the log type as is.
pub fn convert_log_entry(entry: &LogEntry) -> LogEvent {
    let log_type = LogType::from(entry.level.as_str());
    let stack = stack_for(&log_type, entry.stack_trace.as_ref());

    LogEvent {
        source: Source::Browser,
        timestamp: entry.timestamp,
        date: date_with_catch(entry.timestamp),
        message: entry.text.clone(),
        full_message: None,
        stack,
        log_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use browserlog_protocol::{CallFrame, StackTrace};

    fn entry(level: &str, stack_trace: Option<StackTrace>) -> LogEntry {
        LogEntry {
            source: "javascript".into(),
            level: level.into(),
            text: "Message from Browser".into(),
            timestamp: 1633576767343.0,
            url: "some url".into(),
            line_number: None,
            stack_trace,
        }
    }

    fn trace() -> StackTrace {
        StackTrace {
            description: None,
            call_frames: vec![CallFrame {
                function_name: String::new(),
                script_id: "27".into(),
                url: "http://localhost:58708/mytest.com".into(),
                line_number: 3,
                column_number: 18,
            }],
        }
    }

    #[test]
    fn log_level_has_no_stack() {
        let event = convert_log_entry(&entry("log", Some(trace())));
        assert_eq!(event.log_type, LogType::Log);
        assert_eq!(event.source, Source::Browser);
        assert_eq!(event.message, "Message from Browser");
        assert_eq!(event.date, "2021-10-07T03:19:27.343Z");
        assert_eq!(event.stack, None);
        assert_eq!(event.full_message, None);
    }

    #[test]
    fn error_level_formats_stack() {
        let event = convert_log_entry(&entry("error", Some(trace())));
        assert_eq!(
            event.stack.as_deref(),
            Some("at http://localhost:58708/mytest.com:3 (<no functionName>)")
        );
    }

    #[test]
    fn error_level_without_frames() {
        let event = convert_log_entry(&entry("error", Some(StackTrace::default())));
        assert_eq!(event.stack.as_deref(), Some(""));
        let event = convert_log_entry(&entry("error", None));
        assert_eq!(event.stack, None);
    }

    #[test]
    fn unknown_level_is_kept_literally() {
        let event = convert_log_entry(&entry("verbose", None));
        assert_eq!(event.log_type, LogType::Other("verbose".into()));
    }
}

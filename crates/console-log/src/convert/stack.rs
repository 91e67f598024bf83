use browserlog_protocol::constants::NO_FUNCTION_NAME;
use browserlog_protocol::{CallFrame, LogType, StackTrace};

/// Renders call frames as `at <url>:<line> (<function>)`, one per line.
///
/// An empty frame list renders as an empty string; an absent one as `None`.
pub fn format_stack(frames: Option<&[CallFrame]>) -> Option<String> {
    let frames = frames?;
    let lines: Vec<String> = frames
        .iter()
        .map(|f| {
            let function = if f.function_name.is_empty() {
                NO_FUNCTION_NAME
            } else {
                f.function_name.as_str()
            };
            format!("at {}:{} ({function})", f.url, f.line_number)
        })
        .collect();
    Some(lines.join("\n"))
}

/// Stack text for a record of the given type. Only warnings and errors carry one.
pub fn stack_for(log_type: &LogType, trace: Option<&StackTrace>) -> Option<String> {
    if !log_type.is_error_or_warning() {
        return None;
    }
    format_stack(trace.map(|t| t.call_frames.as_slice()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(function_name: &str, url: &str, line_number: i64) -> CallFrame {
        CallFrame {
            function_name: function_name.into(),
            script_id: String::new(),
            url: url.into(),
            line_number,
            column_number: 0,
        }
    }

    #[test]
    fn formats_frames() {
        let frames = [frame("myFunc", "http://localhost/a.js", 3), frame("", "sds", 1)];
        assert_eq!(
            format_stack(Some(&frames)).as_deref(),
            Some("at http://localhost/a.js:3 (myFunc)\nat sds:1 (<no functionName>)")
        );
    }

    #[test]
    fn empty_and_absent() {
        assert_eq!(format_stack(Some(&[])).as_deref(), Some(""));
        assert_eq!(format_stack(None), None);
    }

    #[test]
    fn only_warnings_and_errors_carry_stacks() {
        let trace = StackTrace {
            description: None,
            call_frames: vec![frame("f", "u", 1)],
        };
        assert_eq!(stack_for(&LogType::Error, Some(&trace)).as_deref(), Some("at u:1 (f)"));
        assert_eq!(stack_for(&LogType::Warning, Some(&trace)).as_deref(), Some("at u:1 (f)"));
        for lt in [LogType::Log, LogType::Debug, LogType::Trace, LogType::Table] {
            assert_eq!(stack_for(&lt, Some(&trace)), None);
        }
        let empty = StackTrace::default();
        assert_eq!(stack_for(&LogType::Error, Some(&empty)).as_deref(), Some(""));
        assert_eq!(stack_for(&LogType::Warning, None), None);
    }
}

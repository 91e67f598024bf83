//! Baseline subscribers that print each event kind.
//!
//! Line grammar: `FROM CHROME >> <date> | <severity> | <message>`, severity
//! right-aligned in eight columns. Stack text follows on continuation lines
//! that repeat the prefix.

use std::sync::Arc;

use browserlog_protocol::constants::PROGRAM_TAG;
use browserlog_protocol::{ConsoleEvent, EventName, ExceptionEvent, LogEvent, TestLogEvent};

use crate::bus::EventBus;
use crate::sink::{OutputSink, Stream};

const STACK_INDENT: &str = "    ";
const EXCEPTION_STACK_INDENT: &str = "  ";

/// `FROM CHROME >> <date> | <severity> |`
pub fn line_prefix(date: &str, severity: &str) -> String {
    format!("{PROGRAM_TAG} {date} | {severity:>8} |")
}

fn with_continuation(prefix: &str, first: &str, rest: Option<&str>, indent: &str) -> String {
    let mut out = format!("{prefix} {first}");
    if let Some(rest) = rest.filter(|r| !r.is_empty()) {
        for line in rest.lines() {
            out.push('\n');
            out.push_str(&format!("{prefix} {indent}{line}"));
        }
    }
    out
}

/// Single line for a plain log record.
pub fn format_log(event: &LogEvent) -> String {
    with_continuation(
        &line_prefix(&event.date, event.log_type.as_str()),
        &event.message,
        None,
        "",
    )
}

/// Log record followed by its stack, when it has a non-empty one.
pub fn format_log_with_stack(event: &LogEvent) -> String {
    with_continuation(
        &line_prefix(&event.date, event.log_type.as_str()),
        &event.message,
        event.stack.as_deref(),
        STACK_INDENT,
    )
}

/// Exception message followed by its stack, or the full description when it has none.
pub fn format_exception(event: &ExceptionEvent) -> String {
    let rest = event.stack.as_deref().unwrap_or(&event.full_message);
    with_continuation(
        &line_prefix(&event.date, event.log_type.as_str()),
        &event.message,
        Some(rest),
        EXCEPTION_STACK_INDENT,
    )
}

/// `[command: <name> -> ]<message>[ | details: <details>]`
pub fn format_test_log(event: &TestLogEvent) -> String {
    let command = event
        .command
        .as_deref()
        .map(|c| format!("command: {c} -> "))
        .unwrap_or_default();
    let details = event
        .details_text()
        .map(|d| format!(" | details: {d}"))
        .unwrap_or_default();
    format!(
        "{} {command}{}{details}",
        line_prefix(&event.date, event.log_type.as_str()),
        event.message
    )
}

/// Stream and text the default handler writes for `event`.
pub fn render(event: &ConsoleEvent) -> (Stream, String) {
    match event {
        ConsoleEvent::Exception(e) => (Stream::Stderr, format_exception(e)),
        ConsoleEvent::Error(e) => (Stream::Stderr, format_log_with_stack(e)),
        ConsoleEvent::Warn(e) => (Stream::Stderr, format_log_with_stack(e)),
        ConsoleEvent::Log(e)
        | ConsoleEvent::Debug(e)
        | ConsoleEvent::Trace(e)
        | ConsoleEvent::Table(e) => (Stream::Stdout, format_log(e)),
        ConsoleEvent::TestLog(e) => (Stream::Stdout, format_test_log(e)),
    }
}

/// Installs the baseline printer for `name`.
pub fn install_default_handler(bus: &mut EventBus, name: EventName, sink: Arc<dyn OutputSink>) {
    bus.on(name, move |event| {
        let (stream, text) = render(event);
        sink.write(stream, &text);
    });
}

/// Installs baseline printers for each requested name the caller has not
/// already subscribed to.
///
/// `error` always gets a printer unless the caller subscribed to it. Returns
/// the requested names that received one, in request order.
pub fn register_defaults(
    bus: &mut EventBus,
    requested: &[EventName],
    sink: &Arc<dyn OutputSink>,
) -> Vec<EventName> {
    let customized = bus.event_names();
    let mut installed = Vec::new();

    for &name in requested {
        if customized.contains(&name) || installed.contains(&name) {
            continue;
        }
        install_default_handler(bus, name, Arc::clone(sink));
        installed.push(name);
    }

    if !customized.contains(&EventName::Error) && !installed.contains(&EventName::Error) {
        install_default_handler(bus, EventName::Error, Arc::clone(sink));
    }

    installed
}

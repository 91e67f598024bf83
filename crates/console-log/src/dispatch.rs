//! Routes raw payloads through the converters onto the event bus.

use browserlog_protocol::{ConsoleEvent, EventName, LogEvent, LogType, RawPayload};
use serde_json::Value;

use crate::bus::EventBus;
use crate::convert::{self, Converted};
use crate::json::stringify_with_catch;
use crate::sink::Diagnostics;

/// What happened to a dispatched payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Published under `name`, reaching `handlers` subscribers.
    Emitted { name: EventName, handlers: usize },
    /// Converted, but its log type has no event name.
    Unrouted(LogType),
    /// A console call without arguments.
    Empty,
    /// The payload matched no shape, or its body was malformed.
    Unknown,
}

/// Owns a session's bus and publishes every payload it is handed.
#[derive(Debug)]
pub struct Dispatcher {
    bus: EventBus,
    diagnostics: Diagnostics,
}

impl Dispatcher {
    pub fn new(bus: EventBus, diagnostics: Diagnostics) -> Self {
        Self { bus, diagnostics }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    /// Converts `payload` and emits the resulting event.
    ///
    /// Exceptions go to `exception` and embedded test records to `test:log`.
    /// Other records go to the event their log type maps to. Payloads of no
    /// known shape produce an "Unknown EVENT" diagnostic instead.
    pub fn dispatch(&self, payload: &RawPayload) -> DispatchOutcome {
        let event = match payload {
            RawPayload::ExceptionThrown(thrown) => {
                ConsoleEvent::Exception(convert::convert_exception(thrown))
            }
            RawPayload::ConsoleApiCall(call) => match convert::convert_console_call(call) {
                Some(Converted::Test(test)) => ConsoleEvent::TestLog(test),
                Some(Converted::Log(log)) => match routed(log) {
                    Ok(event) => event,
                    Err(log_type) => return self.unrouted(log_type),
                },
                None => return DispatchOutcome::Empty,
            },
            RawPayload::LogEntry(entry) => match routed(convert::convert_log_entry(entry)) {
                Ok(event) => event,
                Err(log_type) => return self.unrouted(log_type),
            },
            RawPayload::Malformed { shape, reason, raw } => {
                tracing::debug!(%shape, %reason, "malformed payload");
                return self.unknown(raw);
            }
            RawPayload::Unknown(raw) => return self.unknown(raw),
        };

        let name = event.name();
        let handlers = self.bus.emit(&event);
        tracing::trace!(event = %name, handlers, "dispatched");
        DispatchOutcome::Emitted { name, handlers }
    }

    /// Parses a JSON value at the protocol boundary and dispatches it.
    pub fn dispatch_value(&self, value: Value) -> DispatchOutcome {
        self.dispatch(&RawPayload::from_value(value))
    }

    fn unrouted(&self, log_type: LogType) -> DispatchOutcome {
        tracing::debug!(%log_type, "no event for log type");
        DispatchOutcome::Unrouted(log_type)
    }

    fn unknown(&self, raw: &Value) -> DispatchOutcome {
        self.diagnostics.log("Unknown EVENT: -------\n");
        self.diagnostics.log(stringify_with_catch(raw, false));
        DispatchOutcome::Unknown
    }
}

fn routed(log: LogEvent) -> Result<ConsoleEvent, LogType> {
    match EventName::for_log_type(&log.log_type) {
        Some(name) => {
            let log_type = log.log_type.clone();
            ConsoleEvent::from_log(name, log).ok_or(log_type)
        }
        None => Err(log.log_type),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use crate::sink::MemorySink;

    fn dispatcher(names: &[EventName]) -> (Dispatcher, Arc<Mutex<Vec<ConsoleEvent>>>, Arc<MemorySink>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for &name in names {
            let seen = Arc::clone(&seen);
            bus.on(name, move |ev| seen.lock().unwrap().push(ev.clone()));
        }
        let sink = Arc::new(MemorySink::new());
        let diagnostics = Diagnostics::new(sink.clone(), false);
        (Dispatcher::new(bus, diagnostics), seen, sink)
    }

    #[test]
    fn exception_goes_to_exception() {
        let (d, seen, _) = dispatcher(&EventName::ALL);
        let outcome = d.dispatch_value(json!({
            "timestamp": 1.0,
            "exceptionDetails": {"text": "Uncaught", "exception": {"type": "object", "description": "Error: boom\n    at url:4:19"}}
        }));
        assert_eq!(outcome, DispatchOutcome::Emitted { name: EventName::Exception, handlers: 1 });
        let seen = seen.lock().unwrap();
        let ConsoleEvent::Exception(ex) = &seen[0] else { panic!("not an exception") };
        assert_eq!(ex.message, "Error: boom");
        assert_eq!(ex.stack.as_deref(), Some("at url:4:19"));
    }

    #[test]
    fn warning_goes_to_warn() {
        let (d, seen, _) = dispatcher(&EventName::ALL);
        d.dispatch_value(json!({"type": "warning", "args": [{"type": "string", "value": "w"}], "timestamp": 0.0}));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].name(), EventName::Warn);
    }

    #[test]
    fn test_record_always_goes_to_test_log() {
        let (d, seen, _) = dispatcher(&EventName::ALL);
        let outcome = d.dispatch_value(json!({
            "type": "error",
            "args": [{"type": "string", "value": "{\"log\":\"test\",\"logType\":\"error\",\"message\":\"failed\"}"}],
            "timestamp": 0.0
        }));
        assert_eq!(outcome, DispatchOutcome::Emitted { name: EventName::TestLog, handlers: 1 });
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn browser_info_level_is_unrouted() {
        let (d, seen, sink) = dispatcher(&EventName::ALL);
        let outcome = d.dispatch_value(json!({"entry": {"level": "info", "text": "x", "timestamp": 0.0}}));
        assert_eq!(outcome, DispatchOutcome::Unrouted(LogType::Other("info".into())));
        assert!(seen.lock().unwrap().is_empty());
        assert!(sink.records().is_empty());
    }

    #[test]
    fn unknown_payload_reports_diagnostic() {
        let (d, seen, sink) = dispatcher(&EventName::ALL);
        assert_eq!(d.dispatch_value(json!({"type": "Some Ev"})), DispatchOutcome::Unknown);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(
            sink.stdout(),
            vec!["[browser-log] Unknown EVENT: -------\n", r#"[browser-log] {"type":"Some Ev"}"#]
        );
    }

    #[test]
    fn malformed_payload_reports_diagnostic() {
        let (d, _, sink) = dispatcher(&EventName::ALL);
        assert_eq!(d.dispatch_value(json!({"args": 5})), DispatchOutcome::Unknown);
        assert_eq!(sink.stdout()[1], r#"[browser-log] {"args":5}"#);
    }

    #[test]
    fn empty_console_call() {
        let (d, seen, _) = dispatcher(&EventName::ALL);
        assert_eq!(d.dispatch_value(json!({"type": "log", "args": []})), DispatchOutcome::Empty);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn no_subscribers_is_silent() {
        let (d, _, sink) = dispatcher(&[]);
        let outcome = d.dispatch_value(json!({"type": "log", "args": [{"value": "x"}]}));
        assert_eq!(outcome, DispatchOutcome::Emitted { name: EventName::Log, handlers: 0 });
        assert!(sink.records().is_empty());
    }
}

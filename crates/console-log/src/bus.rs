//! In-process publish/subscribe registry keyed by [`EventName`].
//!
//! Handlers run synchronously, in registration order, on the caller's task.
//! A panicking handler is not isolated: the panic unwinds through
//! [`EventBus::emit`] and later handlers for that emit are skipped.

use std::collections::BTreeMap;
use std::fmt;

use browserlog_protocol::{ConsoleEvent, EventName};

/// A subscriber callback.
pub type Handler = Box<dyn Fn(&ConsoleEvent) + Send + Sync + 'static>;

/// Identifies a registered handler so it can be removed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Typed event bus.
#[derive(Default)]
pub struct EventBus {
    handlers: BTreeMap<EventName, Vec<(HandlerId, Handler)>>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `name`. The same closure may be registered
    /// several times; each registration is called.
    pub fn on<F>(&mut self, name: EventName, handler: F) -> HandlerId
    where
        F: Fn(&ConsoleEvent) + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(name)
            .or_default()
            .push((id, Box::new(handler)));
        id
    }

    /// Removes one handler. Returns `false` if it was not registered under `name`.
    pub fn off(&mut self, name: EventName, id: HandlerId) -> bool {
        let Some(list) = self.handlers.get_mut(&name) else {
            return false;
        };
        let before = list.len();
        list.retain(|(hid, _)| *hid != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.handlers.remove(&name);
        }
        removed
    }

    /// Delivers `event` to every handler registered under its name.
    ///
    /// Returns the number of handlers called; zero handlers is a silent no-op.
    pub fn emit(&self, event: &ConsoleEvent) -> usize {
        let Some(list) = self.handlers.get(&event.name()) else {
            return 0;
        };
        for (_, handler) in list {
            handler(event);
        }
        list.len()
    }

    /// Names that currently have at least one handler.
    pub fn event_names(&self) -> Vec<EventName> {
        self.handlers.keys().copied().collect()
    }

    pub fn handler_count(&self, name: EventName) -> usize {
        self.handlers.get(&name).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: BTreeMap<_, _> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        f.debug_struct("EventBus").field("handlers", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use browserlog_protocol::{LogEvent, LogType, Source};

    fn log(message: &str) -> ConsoleEvent {
        ConsoleEvent::Log(LogEvent {
            source: Source::Console,
            timestamp: 0.0,
            date: String::new(),
            message: message.into(),
            full_message: None,
            stack: None,
            log_type: LogType::Log,
        })
    }

    fn recorder(calls: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> impl Fn(&ConsoleEvent) + Send + Sync + 'static {
        let calls = Arc::clone(calls);
        move |ev| {
            let msg = ev.as_log().map(|l| l.message.clone()).unwrap_or_default();
            calls.lock().unwrap().push(format!("{tag}:{msg}"));
        }
    }

    #[test]
    fn handlers_called_in_registration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.on(EventName::Log, recorder(&calls, "a"));
        bus.on(EventName::Log, recorder(&calls, "b"));
        bus.on(EventName::Log, recorder(&calls, "a"));

        assert_eq!(bus.emit(&log("x")), 3);
        assert_eq!(*calls.lock().unwrap(), vec!["a:x", "b:x", "a:x"]);
    }

    #[test]
    fn emit_only_reaches_matching_name() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.on(EventName::Error, recorder(&calls, "err"));

        assert_eq!(bus.emit(&log("x")), 0);
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn off_removes_one_handler() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        let first = bus.on(EventName::Log, recorder(&calls, "a"));
        bus.on(EventName::Log, recorder(&calls, "b"));

        assert!(bus.off(EventName::Log, first));
        assert!(!bus.off(EventName::Log, first));
        assert!(!bus.off(EventName::Warn, first));
        bus.emit(&log("y"));
        assert_eq!(*calls.lock().unwrap(), vec!["b:y"]);
    }

    #[test]
    fn event_names_track_registrations() {
        let mut bus = EventBus::new();
        assert!(bus.event_names().is_empty());

        let id = bus.on(EventName::TestLog, |_| {});
        bus.on(EventName::Exception, |_| {});
        assert_eq!(bus.event_names(), vec![EventName::Exception, EventName::TestLog]);

        bus.off(EventName::TestLog, id);
        assert_eq!(bus.event_names(), vec![EventName::Exception]);
        assert_eq!(bus.handler_count(EventName::Exception), 1);
        assert_eq!(bus.handler_count(EventName::TestLog), 0);
    }

    #[test]
    fn panicking_handler_stops_delivery() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.on(EventName::Log, |_| panic!("handler failed"));
        bus.on(EventName::Log, recorder(&calls, "after"));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| bus.emit(&log("z"))));
        assert!(result.is_err());
        assert!(calls.lock().unwrap().is_empty());
    }
}

//! Output destinations for formatted log lines and diagnostics.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use browserlog_protocol::constants::DIAGNOSTIC_TAG;

/// Which standard stream a line belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Destination for formatted output.
pub trait OutputSink: Send + Sync {
    /// Writes one record. `text` may span several lines.
    fn write(&self, stream: Stream, text: &str);
}

/// Writes to the process's standard streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdioSink;

impl OutputSink for StdioSink {
    fn write(&self, stream: Stream, text: &str) {
        // Closed pipes are not worth failing a test run over.
        let _ = match stream {
            Stream::Stdout => writeln!(std::io::stdout().lock(), "{text}"),
            Stream::Stderr => writeln!(std::io::stderr().lock(), "{text}"),
        };
    }
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(Stream, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in write order.
    pub fn records(&self) -> Vec<(Stream, String)> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn stdout(&self) -> Vec<String> {
        self.on(Stream::Stdout)
    }

    pub fn stderr(&self) -> Vec<String> {
        self.on(Stream::Stderr)
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn on(&self, stream: Stream) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|(s, _)| *s == stream)
            .map(|(_, text)| text)
            .collect()
    }
}

impl OutputSink for MemorySink {
    fn write(&self, stream: Stream, text: &str) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((stream, text.to_string()));
    }
}

/// User-facing diagnostic channel, separate from the event bus.
///
/// Lines are written as `[browser-log] <message>` to stdout. `debug` lines
/// appear only in verbose mode. Every line is also emitted as a debug-level
/// tracing event under the `browserlog::diagnostics` target.
#[derive(Clone)]
pub struct Diagnostics {
    sink: Arc<dyn OutputSink>,
    verbose: bool,
}

impl Diagnostics {
    pub fn new(sink: Arc<dyn OutputSink>, verbose: bool) -> Self {
        Self { sink, verbose }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Always shown.
    pub fn log(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::debug!(target: "browserlog::diagnostics", "{message}");
        self.write(message);
    }

    /// Shown in verbose mode only.
    pub fn debug(&self, message: impl AsRef<str>) {
        let message = message.as_ref();
        tracing::debug!(target: "browserlog::diagnostics", "{message}");
        if self.verbose {
            self.write(message);
        }
    }

    fn write(&self, message: &str) {
        self.sink
            .write(Stream::Stdout, &format!("{DIAGNOSTIC_TAG} {message}"));
    }
}

impl std::fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Diagnostics")
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

//! Redirects a Chromium browser's console output into the host process.
//!
//! Raw debugging-protocol payloads are converted into normalized records,
//! published on a typed [`EventBus`], and printed by default handlers. A
//! [`Supervisor`] keeps one browser session connected, and
//! [`BrowserLogRedirect`] wires everything into a browser launch.

pub mod bus;
pub mod cdp;
pub mod classify;
pub mod config;
pub mod convert;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod json;
pub mod launch;
pub mod sink;
pub mod supervisor;

pub use bus::{EventBus, Handler, HandlerId};
pub use cdp::{CdpConnector, PayloadStream};
pub use config::RedirectConfig;
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::{CdpError, ConfigError, PortError};
pub use launch::{Browser, BrowserLogRedirect, DebugPort, LaunchOptions, Launched};
pub use sink::{Diagnostics, MemorySink, OutputSink, StdioSink, Stream};
pub use supervisor::{ConnectionState, Connector, RetryPolicy, SessionHandle, Supervisor};

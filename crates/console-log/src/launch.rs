//! Browser launch hook.
//!
//! [`BrowserLogRedirect`] decides per launch whether the browser can be
//! instrumented, makes sure it exposes a remote debugging port, and starts a
//! [`Supervisor`] for the session. Nothing here fails the launch: every
//! problem becomes a diagnostic and the options pass through.

use std::fmt;
use std::sync::Arc;

use browserlog_protocol::constants::{DEBUG_PORT_RANGE, REMOTE_DEBUGGING_PORT_FLAG};
use rand::Rng;
use tokio::runtime::Handle;

use crate::bus::EventBus;
use crate::cdp::CdpConnector;
use crate::config::RedirectConfig;
use crate::dispatch::Dispatcher;
use crate::error::PortError;
use crate::handlers::register_defaults;
use crate::sink::{Diagnostics, OutputSink, StdioSink};
use crate::supervisor::{Connector, RetryPolicy, SessionHandle, Supervisor};

/// The browser about to be launched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Browser {
    pub name: String,
    pub family: String,
}

impl Browser {
    pub fn new(name: impl Into<String>, family: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            family: family.into(),
        }
    }

    /// Chrome, Chromium and Canary, or any `chromium` family browser except Electron.
    pub fn is_chromium(&self) -> bool {
        self.family == "chrome"
            || matches!(self.name.as_str(), "chrome" | "chromium" | "canary")
            || (self.family == "chromium" && self.name != "electron")
    }
}

/// Launch options the hook may mutate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    pub args: Vec<String>,
}

impl LaunchOptions {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Where the session's debugging port came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugPort {
    /// Already present in the launch arguments.
    Existing(u16),
    /// Drawn at random and appended to the launch arguments.
    Allocated(u16),
}

impl DebugPort {
    pub fn port(self) -> u16 {
        match self {
            Self::Existing(port) | Self::Allocated(port) => port,
        }
    }
}

/// Reuses the `--remote-debugging-port=<n>` argument if there is one,
/// otherwise appends a flag with a random port from [`DEBUG_PORT_RANGE`].
pub fn ensure_debug_port(args: &mut Vec<String>) -> Result<DebugPort, PortError> {
    if let Some(arg) = args
        .iter()
        .find(|arg| arg.starts_with(REMOTE_DEBUGGING_PORT_FLAG))
    {
        let port = arg[REMOTE_DEBUGGING_PORT_FLAG.len()..]
            .strip_prefix('=')
            .and_then(|value| value.trim().parse::<u16>().ok())
            .ok_or_else(|| PortError::InvalidFlag(arg.clone()))?;
        return Ok(DebugPort::Existing(port));
    }

    let port = rand::rng().random_range(DEBUG_PORT_RANGE);
    args.push(format!("{REMOTE_DEBUGGING_PORT_FLAG}={port}"));
    Ok(DebugPort::Allocated(port))
}

/// Caller hook that receives each session's bus before default handlers are installed.
pub type CustomHandler = Arc<dyn Fn(&mut EventBus) + Send + Sync + 'static>;

/// Result of [`BrowserLogRedirect::launch`].
#[derive(Debug)]
pub struct Launched {
    pub options: LaunchOptions,
    /// `None` when the launch was not instrumented.
    pub session: Option<SessionHandle>,
}

/// Redirects a browser's console output to this process.
pub struct BrowserLogRedirect<C = CdpConnector> {
    config: RedirectConfig,
    connector: C,
    sink: Arc<dyn OutputSink>,
    diagnostics: Diagnostics,
    custom_handler: Option<CustomHandler>,
}

impl BrowserLogRedirect<CdpConnector> {
    /// Writes to the standard streams and connects over CDP.
    pub fn new(config: RedirectConfig) -> Self {
        Self::with_parts(config, CdpConnector, Arc::new(StdioSink))
    }
}

impl<C: Connector + Clone> BrowserLogRedirect<C> {
    pub fn with_parts(config: RedirectConfig, connector: C, sink: Arc<dyn OutputSink>) -> Self {
        let diagnostics = Diagnostics::new(Arc::clone(&sink), config.verbose);
        if config.enabled {
            diagnostics.log(
                "Logging from browser is on, to turn off set REDIRECT_BROWSER_LOG environment variable to false",
            );
        } else {
            diagnostics.log(
                "Logging from browser is off, to turn on set REDIRECT_BROWSER_LOG environment variable to true",
            );
        }

        Self {
            config,
            connector,
            sink,
            diagnostics,
            custom_handler: None,
        }
    }

    /// Registers the caller's own subscribers. Event names it subscribes to
    /// get no default handler.
    pub fn with_custom_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut EventBus) + Send + Sync + 'static,
    {
        self.custom_handler = Some(Arc::new(handler));
        self
    }

    pub fn config(&self) -> &RedirectConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// A fresh bus with the custom handler and default handlers, wrapped in a dispatcher.
    pub fn build_dispatcher(&self) -> Dispatcher {
        let mut bus = EventBus::new();
        if let Some(custom) = &self.custom_handler {
            custom(&mut bus);
        }

        let installed = register_defaults(&mut bus, &self.config.events_to_log, &self.sink);
        if !installed.is_empty() {
            let names: Vec<&str> = installed.iter().map(|name| name.as_str()).collect();
            self.diagnostics.debug(format!(
                "Registering default console event handlers: {}",
                names.join(", ")
            ));
        }

        Dispatcher::new(bus, self.diagnostics.clone())
    }

    /// Mutates the launch options and builds the session supervisor without starting it.
    ///
    /// Returns no supervisor when redirection is off, the browser is not
    /// Chromium-based, or the port flag is unreadable.
    pub fn prepare_launch(
        &self,
        browser: &Browser,
        mut options: LaunchOptions,
    ) -> (LaunchOptions, Option<Supervisor<C>>) {
        if !self.config.enabled {
            return (options, None);
        }

        if !browser.is_chromium() {
            tracing::debug!(name = %browser.name, family = %browser.family, "unsupported browser");
            self.diagnostics.debug(format!(
                "Warning: An unsupported browser family was used, output will not be logged to console: {}",
                browser.family
            ));
            return (options, None);
        }

        let port = match ensure_debug_port(&mut options.args) {
            Ok(DebugPort::Existing(port)) => {
                self.diagnostics
                    .debug(format!("existing port: {REMOTE_DEBUGGING_PORT_FLAG}={port}"));
                port
            }
            Ok(DebugPort::Allocated(port)) => {
                self.diagnostics.log(format!("new port: {port}"));
                port
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping instrumentation");
                self.diagnostics.debug(format!("Error: {e}"));
                return (options, None);
            }
        };

        let supervisor = Supervisor::new(
            port,
            self.connector.clone(),
            RetryPolicy::from_config(&self.config),
            self.build_dispatcher(),
            self.diagnostics.clone(),
        );
        (options, Some(supervisor))
    }

    /// Prepares the launch and spawns the session on the current Tokio
    /// runtime. Outside a runtime the options still pass through, but no
    /// session is started.
    pub fn launch(&self, browser: &Browser, options: LaunchOptions) -> Launched {
        let (options, supervisor) = self.prepare_launch(browser, options);
        let Some(supervisor) = supervisor else {
            return Launched {
                options,
                session: None,
            };
        };

        let session = match Handle::try_current() {
            Ok(runtime) => Some(supervisor.spawn_on(&runtime)),
            Err(e) => {
                tracing::warn!(port = supervisor.port(), error = %e, "no runtime for session");
                self.diagnostics.log(format!(
                    "Error: Browser logs will not be redirected, no async runtime is running: {e}"
                ));
                None
            }
        };
        Launched { options, session }
    }

    /// The launch hook: returns the options the browser must be started
    /// with. The session keeps running in the background.
    pub fn before_browser_launch(&self, browser: &Browser, options: LaunchOptions) -> LaunchOptions {
        self.launch(browser, options).options
    }
}

impl<C> fmt::Debug for BrowserLogRedirect<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrowserLogRedirect")
            .field("config", &self.config)
            .field("custom_handler", &self.custom_handler.is_some())
            .finish_non_exhaustive()
    }
}

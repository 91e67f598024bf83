//! Connection lifecycle for one browser session.
//!
//! The supervisor retries the connection a bounded number of times with a
//! fixed interval, dispatches every payload of the live connection, and on
//! disconnect starts over from attempt 1. Giving up ends the session; the
//! browser itself is never affected.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cdp::PayloadStream;
use crate::config::RedirectConfig;
use crate::dispatch::Dispatcher;
use crate::error::CdpError;
use crate::sink::Diagnostics;

/// Opens payload streams to a browser's debugging port.
pub trait Connector: Send + Sync + 'static {
    fn connect(&self, port: u16) -> impl Future<Output = Result<PayloadStream, CdpError>> + Send;
}

/// Observable state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not started.
    Idle,
    /// Connection attempt in progress (1-based).
    Connecting { attempt: u32 },
    /// Payloads are flowing.
    Connected,
    /// Transport closed; a new retry cycle follows.
    Disconnected,
    /// Attempts exhausted; the session is over.
    GivenUp,
}

/// Bounded fixed-interval retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl RetryPolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    pub fn from_config(config: &RedirectConfig) -> Self {
        Self::new(config.connect_timeout(), config.retry_interval())
    }

    /// `floor(timeout / interval)`, never less than one.
    pub fn max_attempts(&self) -> u32 {
        let interval = self.interval.as_nanos();
        if interval == 0 {
            return 1;
        }
        u32::try_from(self.timeout.as_nanos() / interval)
            .unwrap_or(u32::MAX)
            .max(1)
    }
}

/// Drives the connection of one browser session.
pub struct Supervisor<C> {
    port: u16,
    connector: C,
    policy: RetryPolicy,
    dispatcher: Dispatcher,
    diagnostics: Diagnostics,
    state: watch::Sender<ConnectionState>,
}

impl<C: Connector> Supervisor<C> {
    pub fn new(
        port: u16,
        connector: C,
        policy: RetryPolicy,
        dispatcher: Dispatcher,
        diagnostics: Diagnostics,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Idle);
        Self {
            port,
            connector,
            policy,
            dispatcher,
            diagnostics,
            state,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Runs the session until the retry budget of a cycle is exhausted.
    pub async fn run(self) -> ConnectionState {
        loop {
            let Some(mut events) = self.connect_with_retry().await else {
                self.set_state(ConnectionState::GivenUp);
                return ConnectionState::GivenUp;
            };

            self.set_state(ConnectionState::Connected);
            while let Some(payload) = events.recv().await {
                self.dispatcher.dispatch(&payload);
            }

            tracing::info!(port = self.port, "debugging protocol disconnected");
            self.diagnostics.debug("Chrome Debugging Protocol disconnected");
            self.set_state(ConnectionState::Disconnected);
        }
    }

    /// Spawns [`Supervisor::run`] on the current runtime.
    ///
    /// Panics outside a Tokio runtime; see [`Supervisor::spawn_on`].
    pub fn spawn(self) -> SessionHandle {
        self.spawn_on(&Handle::current())
    }

    /// Spawns [`Supervisor::run`] on `runtime`.
    pub fn spawn_on(self, runtime: &Handle) -> SessionHandle {
        let port = self.port;
        let state = self.subscribe_state();
        let task = runtime.spawn(self.run());
        SessionHandle { port, state, task }
    }

    async fn connect_with_retry(&self) -> Option<PayloadStream> {
        let max_attempts = self.policy.max_attempts();
        let mut last_error = None;

        self.diagnostics
            .debug("Attempting to connect to Chrome Debugging Protocol");

        for attempt in 1..=max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.policy.interval).await;
            }
            self.set_state(ConnectionState::Connecting { attempt });

            match self.connector.connect(self.port).await {
                Ok(events) => {
                    tracing::info!(port = self.port, attempt, "connected to debugging protocol");
                    self.diagnostics.debug(format!(
                        "Connected to Chrome Debugging Protocol from {attempt} attempt"
                    ));
                    return Some(events);
                }
                Err(e) => {
                    tracing::trace!(port = self.port, attempt, max_attempts, error = %e, "connect attempt failed");
                    last_error = Some(e);
                }
            }
        }

        tracing::warn!(port = self.port, max_attempts, "giving up on debugging protocol");
        self.diagnostics.debug(format!(
            "Could not connect to Debugging Protocol after {max_attempts} attempts"
        ));
        if let Some(e) = last_error {
            self.diagnostics.debug(format!("Error: {e}"));
        }
        None
    }

    fn set_state(&self, state: ConnectionState) {
        tracing::debug!(port = self.port, ?state, "connection state");
        self.state.send_replace(state);
    }
}

impl<C> std::fmt::Debug for Supervisor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("port", &self.port)
            .field("policy", &self.policy)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

/// A spawned session.
#[derive(Debug)]
pub struct SessionHandle {
    port: u16,
    state: watch::Receiver<ConnectionState>,
    task: JoinHandle<ConnectionState>,
}

impl SessionHandle {
    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    /// Stops the session. Already dispatched events are unaffected.
    pub fn abort(&self) {
        self.task.abort();
    }

    /// Waits for the session to end. `None` if it was aborted.
    pub async fn join(self) -> Option<ConnectionState> {
        self.task.await.ok()
    }
}

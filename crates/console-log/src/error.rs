//! Error types for the console-log crate.

/// Failures talking to the browser's debugging protocol.
#[derive(Debug, thiserror::Error)]
pub enum CdpError {
    #[error("failed to connect to {addr}: {reason}")]
    Connect { addr: String, reason: String },

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("invalid response from debugging endpoint: {0}")]
    InvalidResponse(String),

    #[error("no debuggable page target")]
    NoTarget,

    #[error("websocket error: {0}")]
    WebSocket(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Failures reading the remote debugging port from launch arguments.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("invalid remote debugging port flag: {0}")]
    InvalidFlag(String),
}

/// Failures resolving configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },
}

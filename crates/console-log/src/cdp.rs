//! CDP WebSocket connection for browser log streaming.
//!
//! Finds the first page target on the browser's debugging endpoint, enables
//! the `Runtime` and `Log` domains, and forwards the parameters of every
//! log-bearing event as a [`RawPayload`]. The payload channel closes when the
//! WebSocket does.

use std::future::Future;
use std::time::Duration;

use browserlog_protocol::RawPayload;
use browserlog_protocol::constants::cdp_method;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;

use crate::error::CdpError;
use crate::supervisor::Connector;

/// Host the debugging endpoint listens on.
const DEBUG_HOST: &str = "127.0.0.1";

/// Timeout for the HTTP target discovery request.
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Timeout for the WebSocket handshake.
const WS_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Payloads received from one live connection.
pub type PayloadStream = mpsc::UnboundedReceiver<RawPayload>;

/// A debuggable target listed by `/json/list`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub target_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub web_socket_debugger_url: String,
}

/// A raw CDP message received from the browser.
#[derive(Debug, Deserialize)]
struct CdpEvent {
    method: Option<String>,
    params: Option<Value>,
}

/// CDP message sent to the browser.
#[derive(Serialize)]
struct CdpCommand {
    id: i32,
    method: &'static str,
    params: Value,
}

/// Connects to the debugging protocol through `127.0.0.1:<port>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CdpConnector;

impl Connector for CdpConnector {
    fn connect(&self, port: u16) -> impl Future<Output = Result<PayloadStream, CdpError>> + Send {
        connect(port)
    }
}

/// Lists the debuggable targets of the browser listening on `port`.
pub async fn list_targets(port: u16) -> Result<Vec<Target>, CdpError> {
    let addr = format!("{DEBUG_HOST}:{port}");
    let body = http_get(&addr, "/json/list").await?;
    serde_json::from_str(&body)
        .map_err(|e| CdpError::InvalidResponse(format!("failed to parse targets: {e}")))
}

/// First `page` target that can be attached to.
pub fn select_page_target(targets: &[Target]) -> Option<&Target> {
    targets
        .iter()
        .find(|t| t.target_type == "page" && !t.web_socket_debugger_url.is_empty())
}

/// Discovers the page target on `port` and opens a payload stream to it.
pub async fn connect(port: u16) -> Result<PayloadStream, CdpError> {
    let targets = list_targets(port).await?;
    let target = select_page_target(&targets).ok_or(CdpError::NoTarget)?;
    tracing::debug!(port, target = %target.id, url = %target.url, "attaching to page target");
    open_stream(&target.web_socket_debugger_url).await
}

/// Connects to a target's WebSocket, enables `Runtime` + `Log`, and spawns
/// the read loop feeding the returned stream.
pub async fn open_stream(ws_url: &str) -> Result<PayloadStream, CdpError> {
    let (ws, _) = tokio::time::timeout(
        WS_HANDSHAKE_TIMEOUT,
        tokio_tungstenite::connect_async(ws_url),
    )
    .await
    .map_err(|_| CdpError::Timeout("WebSocket handshake".into()))?
    .map_err(|e| CdpError::WebSocket(format!("connect failed: {e}")))?;

    let (mut write, mut read) = ws.split();

    for (id, method) in [(1, cdp_method::RUNTIME_ENABLE), (2, cdp_method::LOG_ENABLE)] {
        let cmd = CdpCommand {
            id,
            method,
            params: serde_json::json!({}),
        };
        let json = serde_json::to_string(&cmd)
            .map_err(|e| CdpError::Protocol(format!("failed to serialize {method}: {e}")))?;
        write
            .send(WsMessage::Text(json.into()))
            .await
            .map_err(|e| CdpError::WebSocket(format!("failed to send {method}: {e}")))?;
    }

    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        // The write half must outlive the read loop or the socket closes.
        let _write = write;
        while let Some(frame) = read.next().await {
            match frame {
                Ok(WsMessage::Text(text)) => {
                    if let Some(payload) = parse_event(&text)
                        && tx.send(payload).is_err()
                    {
                        break;
                    }
                }
                Ok(WsMessage::Close(_)) => break,
                Err(e) => {
                    tracing::debug!(error = %e, "CDP WebSocket read error");
                    break;
                }
                _ => {} // Ping/Pong/Binary
            }
        }
        tracing::debug!("CDP read loop ended");
    });

    Ok(rx)
}

/// Extracts the payload of a log-bearing event. Command responses and other
/// events yield `None`.
fn parse_event(text: &str) -> Option<RawPayload> {
    let event: CdpEvent = serde_json::from_str(text).ok()?;
    let method = event.method?;
    if !cdp_method::is_log_event(&method) {
        return None;
    }
    Some(RawPayload::from_value(event.params.unwrap_or(Value::Null)))
}

/// Minimal HTTP GET returning the response body.
async fn http_get(addr: &str, path: &str) -> Result<String, CdpError> {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let mut stream = tokio::time::timeout(HTTP_TIMEOUT, tokio::net::TcpStream::connect(addr))
        .await
        .map_err(|_| CdpError::Timeout(format!("HTTP connection to {addr}")))?
        .map_err(|e| CdpError::Connect {
            addr: addr.to_string(),
            reason: e.to_string(),
        })?;

    let request = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|e| CdpError::Connect {
            addr: addr.to_string(),
            reason: format!("failed to send HTTP request: {e}"),
        })?;

    let mut response = Vec::new();
    tokio::time::timeout(HTTP_TIMEOUT, stream.read_to_end(&mut response))
        .await
        .map_err(|_| CdpError::Timeout(format!("HTTP response from {addr}")))?
        .map_err(|e| CdpError::InvalidResponse(format!("failed to read response: {e}")))?;

    let response = String::from_utf8_lossy(&response);
    let body_start = response
        .find("\r\n\r\n")
        .map(|i| i + 4)
        .ok_or_else(|| CdpError::InvalidResponse("missing HTTP header terminator".into()))?;

    Ok(response[body_start..].to_string())
}

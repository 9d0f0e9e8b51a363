//! # Command Transport
//!
//! The seam between workflows and the backend: one async `invoke` per named
//! command. Production code talks WebSocket; tests plug in a scripted fake.
//!
//! ## Connection Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    WebSocket Connection States                          │
//! │                                                                         │
//! │  ┌────────────┐   connect()    ┌────────────┐   handshake   ┌─────────┐│
//! │  │Disconnected│ ─────────────► │ Connecting │ ────────────► │Connected││
//! │  └────────────┘                └─────┬──────┘               └────┬────┘│
//! │        ▲                             │ failure                   │     │
//! │        │                             ▼                           │     │
//! │        │                     Err(ConnectionFailed)               │     │
//! │        │                                                         │     │
//! │        └──────────── close / error / shutdown ◄──────────────────┘     │
//! │                                                                         │
//! │  No reconnect. Every pending call fails with Disconnected and the      │
//! │  operator restarts the terminal.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Call Correlation
//! ```text
//!   invoke("venta_listar", args)
//!        │
//!        ├── id = uuid v4
//!        ├── pending[id] = oneshot::Sender
//!        ├── Frame::Invoke { id, command, args } ──► socket
//!        │
//!        ▼
//!   Frame::Reply { id, ok | error } ◄── socket
//!        │
//!        └── pending.remove(id).send(result) ──► invoke() returns
//! ```

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::config::BackendSettings;
use crate::error::{ClientError, ClientResult};
use crate::protocol::{Frame, ReplyPayload};

// =============================================================================
// Command Transport Trait
// =============================================================================

/// Sends one named command and waits for its reply.
///
/// Implementations return the raw JSON payload; typing happens in
/// [`crate::invoke::CommandClient`]. A backend-side error must come back as
/// [`ClientError::Rejected`] carrying the backend's message verbatim.
#[async_trait]
pub trait CommandTransport: Send + Sync {
    async fn invoke(&self, command: &str, args: Value) -> ClientResult<Value>;
}

/// Out-of-band notifications pushed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendEvent {
    /// The backend session changed (login or logout in another window).
    SessionUpdated,
}

// =============================================================================
// Transport State
// =============================================================================

/// Connection state for the WebSocket transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected.
    Disconnected,
    /// Attempting to connect.
    Connecting,
    /// Connected and ready.
    Connected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

// =============================================================================
// Transport Configuration
// =============================================================================

/// Configuration for the WebSocket transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// WebSocket URL to connect to.
    pub url: String,

    /// Connection timeout.
    pub connect_timeout: Duration,

    /// Ping interval for keepalive.
    pub ping_interval: Duration,

    /// Capacity of the outgoing frame queue.
    pub queue_capacity: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        TransportConfig {
            url: String::new(),
            connect_timeout: Duration::from_secs(10),
            ping_interval: Duration::from_secs(30),
            queue_capacity: 100,
        }
    }
}

impl From<&BackendSettings> for TransportConfig {
    fn from(settings: &BackendSettings) -> Self {
        TransportConfig {
            url: settings.url.clone(),
            connect_timeout: settings.connect_timeout(),
            ping_interval: settings.ping_interval(),
            ..Default::default()
        }
    }
}

// =============================================================================
// Pending Calls
// =============================================================================

struct PendingCall {
    command: String,
    reply_tx: oneshot::Sender<ClientResult<Value>>,
}

type PendingMap = Arc<StdMutex<HashMap<String, PendingCall>>>;

fn lock(pending: &PendingMap) -> std::sync::MutexGuard<'_, HashMap<String, PendingCall>> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Removes the pending entry when the caller stops waiting, whether the
/// reply arrived, the caller's timeout fired, or the future was dropped.
struct PendingGuard {
    pending: PendingMap,
    id: String,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        lock(&self.pending).remove(&self.id);
    }
}

// =============================================================================
// WebSocket Transport
// =============================================================================

/// WebSocket command transport.
///
/// ## Usage
/// ```rust,ignore
/// let transport = WsTransport::connect(TransportConfig::from(&config.backend)).await?;
/// let open: serde_json::Value = transport.invoke("caja_esta_abierta", json!({})).await?;
/// ```
#[derive(Clone)]
pub struct WsTransport {
    outgoing_tx: mpsc::Sender<Frame>,
    pending: PendingMap,
    state: Arc<RwLock<ConnectionState>>,
    events_tx: broadcast::Sender<BackendEvent>,
    shutdown_tx: mpsc::Sender<()>,
}

impl WsTransport {
    /// Connects and spawns the connection task.
    ///
    /// Fails right away when the backend cannot be reached.
    pub async fn connect(config: TransportConfig) -> ClientResult<Self> {
        let state = Arc::new(RwLock::new(ConnectionState::Connecting));
        info!(url = %config.url, "Connecting to backend");

        let ws_stream = match connect_with_timeout(&config).await {
            Ok(stream) => stream,
            Err(e) => {
                *state.write().await = ConnectionState::Disconnected;
                error!(?e, "Failed to connect");
                return Err(e);
            }
        };
        *state.write().await = ConnectionState::Connected;
        info!("WebSocket connected");

        let (outgoing_tx, outgoing_rx) = mpsc::channel::<Frame>(config.queue_capacity);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
        let (events_tx, _) = broadcast::channel(16);
        let pending: PendingMap = Arc::new(StdMutex::new(HashMap::new()));

        let connection = Connection {
            ping_interval: config.ping_interval,
            outgoing_rx,
            shutdown_rx,
            pending: pending.clone(),
            state: state.clone(),
            events_tx: events_tx.clone(),
        };
        tokio::spawn(connection.run(ws_stream));

        Ok(WsTransport {
            outgoing_tx,
            pending,
            state,
            events_tx,
            shutdown_tx,
        })
    }

    /// Returns the current connection state.
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Returns true if currently connected.
    pub async fn is_connected(&self) -> bool {
        *self.state.read().await == ConnectionState::Connected
    }

    /// Backend notifications (session changes).
    pub fn subscribe_events(&self) -> broadcast::Receiver<BackendEvent> {
        self.events_tx.subscribe()
    }

    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) -> ClientResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| ClientError::ChannelError("Failed to send shutdown signal".into()))
    }
}

#[async_trait]
impl CommandTransport for WsTransport {
    async fn invoke(&self, command: &str, args: Value) -> ClientResult<Value> {
        if !self.is_connected().await {
            return Err(ClientError::Disconnected);
        }

        let id = uuid::Uuid::new_v4().to_string();
        let (reply_tx, reply_rx) = oneshot::channel();
        lock(&self.pending).insert(
            id.clone(),
            PendingCall {
                command: command.to_string(),
                reply_tx,
            },
        );
        let _guard = PendingGuard {
            pending: self.pending.clone(),
            id: id.clone(),
        };

        self.outgoing_tx
            .send(Frame::invoke(id, command, args))
            .await
            .map_err(|_| ClientError::Disconnected)?;

        match reply_rx.await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Disconnected),
        }
    }
}

/// Connects with timeout.
async fn connect_with_timeout(
    config: &TransportConfig,
) -> ClientResult<WebSocketStream<MaybeTlsStream<TcpStream>>> {
    let connect_future = connect_async(config.url.as_str());

    match timeout(config.connect_timeout, connect_future).await {
        Ok(Ok((ws_stream, response))) => {
            debug!(status = ?response.status(), "WebSocket handshake complete");
            Ok(ws_stream)
        }
        Ok(Err(e)) => Err(ClientError::from(e)),
        Err(_) => Err(ClientError::ConnectionFailed(format!(
            "no handshake within {} s",
            config.connect_timeout.as_secs()
        ))),
    }
}

// =============================================================================
// Connection Task
// =============================================================================

struct Connection {
    ping_interval: Duration,
    outgoing_rx: mpsc::Receiver<Frame>,
    shutdown_rx: mpsc::Receiver<()>,
    pending: PendingMap,
    state: Arc<RwLock<ConnectionState>>,
    events_tx: broadcast::Sender<BackendEvent>,
}

impl Connection {
    async fn run(mut self, ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>) {
        if let Err(e) = self.connection_loop(ws_stream).await {
            warn!(?e, "Connection loop ended");
        }

        *self.state.write().await = ConnectionState::Disconnected;

        let abandoned: Vec<PendingCall> = lock(&self.pending).drain().map(|(_, call)| call).collect();
        if !abandoned.is_empty() {
            warn!(count = abandoned.len(), "Failing pending calls after disconnect");
        }
        for call in abandoned {
            let _ = call.reply_tx.send(Err(ClientError::Disconnected));
        }

        info!("Transport stopped");
    }

    /// Main connection loop - handles sending and receiving.
    async fn connection_loop(
        &mut self,
        ws_stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    ) -> ClientResult<()> {
        let (mut write, mut read) = ws_stream.split();

        let mut ping_interval = tokio::time::interval(self.ping_interval);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                Some(frame) = self.outgoing_rx.recv() => {
                    let json = frame.to_json()?;
                    debug!(frame_type = %frame.type_name(), "Sending frame");
                    write.send(WsMessage::Text(json.into())).await?;
                }

                Some(result) = read.next() => {
                    match result {
                        Ok(WsMessage::Text(text)) => match Frame::from_json(&text) {
                            Ok(frame) => self.dispatch(frame),
                            Err(e) => warn!(?e, "Failed to parse frame"),
                        },
                        Ok(WsMessage::Ping(data)) => {
                            write.send(WsMessage::Pong(data)).await?;
                        }
                        Ok(WsMessage::Pong(_)) => {
                            debug!("Received pong");
                        }
                        Ok(WsMessage::Close(frame)) => {
                            info!(?frame, "Received close frame");
                            return Ok(());
                        }
                        Ok(WsMessage::Binary(_)) => {
                            warn!("Received unexpected binary message");
                        }
                        Ok(WsMessage::Frame(_)) => {}
                        Err(e) => {
                            error!(?e, "WebSocket error");
                            return Err(ClientError::from(e));
                        }
                    }
                }

                _ = ping_interval.tick() => {
                    write.send(WsMessage::Ping(vec![].into())).await?;
                    debug!("Sent ping");
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Shutdown signal received, closing connection");
                    let _ = write.send(WsMessage::Close(None)).await;
                    return Ok(());
                }
            }
        }
    }

    fn dispatch(&self, frame: Frame) {
        match frame {
            Frame::Reply(reply) => self.complete(reply),
            Frame::SessionUpdated {} => {
                debug!("Backend session updated");
                let _ = self.events_tx.send(BackendEvent::SessionUpdated);
            }
            Frame::Invoke(payload) => {
                warn!(command = %payload.command, "Ignoring Invoke frame from backend");
            }
        }
    }

    fn complete(&self, reply: ReplyPayload) {
        let Some(call) = lock(&self.pending).remove(&reply.id) else {
            debug!(id = %reply.id, "Reply for a call nobody waits on");
            return;
        };
        let result = reply.into_result(&call.command);
        let _ = call.reply_tx.send(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
        assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
    }

    #[test]
    fn test_transport_config_from_settings() {
        let settings = BackendSettings {
            url: "ws://10.0.0.1:9000/pos".into(),
            connect_timeout_secs: 3,
            ..Default::default()
        };
        let config = TransportConfig::from(&settings);
        assert_eq!(config.url, "ws://10.0.0.1:9000/pos");
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.queue_capacity, 100);
    }

    fn connection_with_pending() -> (Connection, oneshot::Receiver<ClientResult<Value>>) {
        let (_out_tx, outgoing_rx) = mpsc::channel(1);
        let (_sd_tx, shutdown_rx) = mpsc::channel(1);
        let (events_tx, _) = broadcast::channel(4);
        let pending: PendingMap = Arc::new(StdMutex::new(HashMap::new()));
        let (reply_tx, reply_rx) = oneshot::channel();
        lock(&pending).insert(
            "a1".into(),
            PendingCall {
                command: "venta_cancelar".into(),
                reply_tx,
            },
        );
        let connection = Connection {
            ping_interval: Duration::from_secs(30),
            outgoing_rx,
            shutdown_rx,
            pending,
            state: Arc::new(RwLock::new(ConnectionState::Connected)),
            events_tx,
        };
        (connection, reply_rx)
    }

    #[tokio::test]
    async fn test_reply_completes_matching_call() {
        let (connection, reply_rx) = connection_with_pending();

        connection.dispatch(Frame::Reply(ReplyPayload {
            id: "other".into(),
            ok: Some(json!(1)),
            error: None,
        }));
        assert_eq!(lock(&connection.pending).len(), 1);

        connection.dispatch(Frame::Reply(ReplyPayload {
            id: "a1".into(),
            ok: None,
            error: Some("venta inexistente".into()),
        }));
        let result = reply_rx.await.unwrap();
        assert!(matches!(
            result,
            Err(ClientError::Rejected { ref command, .. }) if command == "venta_cancelar"
        ));
        assert!(lock(&connection.pending).is_empty());
    }

    #[tokio::test]
    async fn test_session_updated_is_broadcast() {
        let (connection, _reply_rx) = connection_with_pending();
        let mut events = connection.events_tx.subscribe();
        connection.dispatch(Frame::SessionUpdated {});
        assert_eq!(events.recv().await.unwrap(), BackendEvent::SessionUpdated);
    }

    #[test]
    fn test_pending_guard_removes_entry() {
        let pending: PendingMap = Arc::new(StdMutex::new(HashMap::new()));
        let (reply_tx, _reply_rx) = oneshot::channel();
        lock(&pending).insert(
            "x".into(),
            PendingCall {
                command: "stock_mov_listar".into(),
                reply_tx,
            },
        );
        drop(PendingGuard {
            pending: pending.clone(),
            id: "x".into(),
        });
        assert!(lock(&pending).is_empty());
    }
}

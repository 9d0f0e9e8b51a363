//! # Client Error Types
//!
//! Errors of every call that leaves the machine.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Protocol            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Connection     │  │  SerializationFailed    │ │
//! │  │  InvalidUrl     │  │  Disconnected   │  │  DeserializationFailed  │ │
//! │  │  ConfigLoad/Save│  │  Timeout        │  │  UnexpectedResponse     │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │    Backend      │  │    Session      │  │      Workflow           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  Rejected       │  │  StorageFailed  │  │  Core (rule violated)   │ │
//! │  │  DuplicateCode  │  │  NotLoggedIn    │  │  Busy                   │ │
//! │  │  StockCheck     │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No variant is ever retried: the operator sees [`ClientError::user_message`]
//! and decides what to do.

use huevo_core::{CoreError, ValidationError};
use thiserror::Error;

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Every failure a backend call or a workflow step can produce.
#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    /// Invalid backend URL.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// Failed to establish the WebSocket connection.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The connection dropped while calls were pending.
    #[error("Disconnected from backend")]
    Disconnected,

    /// The backend did not answer in time.
    #[error("timeout: {command} did not answer within {millis} ms")]
    Timeout { command: String, millis: u64 },

    /// WebSocket protocol error.
    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    // =========================================================================
    // Protocol Errors
    // =========================================================================
    /// Failed to serialize call arguments or a frame.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// The reply did not match the expected shape.
    #[error("Unexpected reply to {command}: {reason}")]
    DeserializationFailed { command: String, reason: String },

    /// A frame that is not a reply, or a reply with neither `ok` nor `error`.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    // =========================================================================
    // Backend Errors
    // =========================================================================
    /// The backend rejected the command. `message` is its error verbatim.
    #[error("{message}")]
    Rejected { command: String, message: String },

    /// Product creation hit the unique constraint on the code.
    #[error("El código ya existe.")]
    DuplicateCode,

    /// The stock ledger refused a movement that would go below zero.
    #[error("Rechazado por la base: stock no puede quedar negativo.")]
    StockCheckViolation,

    /// The backend has no logged-in user for a caja operation.
    #[error("Iniciá sesión para abrir/cerrar la caja.")]
    NotLoggedIn,

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// Reading or writing the session file failed.
    #[error("Session storage failed: {0}")]
    StorageFailed(String),

    // =========================================================================
    // Workflow Errors
    // =========================================================================
    /// A client-side rule refused the operation before any call.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The same action is already running.
    #[error("{0} en curso, esperá a que termine.")]
    Busy(&'static str),

    /// Internal channel closed.
    #[error("Channel error: {0}")]
    ChannelError(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<ValidationError> for ClientError {
    fn from(err: ValidationError) -> Self {
        ClientError::Core(CoreError::Validation(err))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::SerializationFailed(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => ClientError::Disconnected,
            WsError::Io(io) => ClientError::ConnectionFailed(io.to_string()),
            other => ClientError::WebSocketError(other.to_string()),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true for the liveness guard firing.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }

    /// Returns true if a form field failed before any call.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Core(e) if e.is_validation())
    }

    /// Returns true if the backend answered with an error.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            ClientError::Rejected { .. }
                | ClientError::DuplicateCode
                | ClientError::StockCheckViolation
                | ClientError::NotLoggedIn
        )
    }

    /// Returns true for failures of the connection itself.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::ConnectionFailed(_)
                | ClientError::Disconnected
                | ClientError::WebSocketError(_)
        )
    }

    /// Text shown to the operator.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Timeout { .. } => "Timeout del backend.".to_string(),
            ClientError::Disconnected | ClientError::ConnectionFailed(_) => {
                "Sin conexión con el backend.".to_string()
            }
            other => other.to_string(),
        }
    }

    /// Maps a rejection of `producto_crear` that names the code column.
    pub(crate) fn classify_product_create(self) -> Self {
        match self {
            ClientError::Rejected { ref message, .. }
                if message.contains("UNIQUE") || message.to_lowercase().contains("codigo") =>
            {
                ClientError::DuplicateCode
            }
            other => other,
        }
    }

    /// Maps a CHECK constraint failure on `stock_actual`.
    pub(crate) fn classify_stock_update(self) -> Self {
        match self {
            ClientError::Rejected { ref message, .. }
                if message.contains("stock_actual") && message.contains("CHECK") =>
            {
                ClientError::StockCheckViolation
            }
            other => other,
        }
    }

    /// Maps the backend's "no login" answer on caja commands.
    pub(crate) fn classify_caja(self) -> Self {
        match self {
            ClientError::Rejected { ref message, .. }
                if message.to_lowercase().contains("no login") =>
            {
                ClientError::NotLoggedIn
            }
            other => other,
        }
    }
}

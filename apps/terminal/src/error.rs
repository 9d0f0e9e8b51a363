//! # API Error Type
//!
//! Unified error type for terminal commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Terminal                           │
//! │                                                                         │
//! │  operator types "cobrar efectivo 200"                                   │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command handler                                                 │  │
//! │  │  Result<String, ApiError>                                        │  │
//! │  │         │                                                        │  │
//! │  │  Form rule failed? ── ValidationError ─────────┐                 │  │
//! │  │  Workflow rule?    ── CoreError ───────────────┤                 │  │
//! │  │  Backend said no?  ── ClientError::Rejected ───┼──► ApiError     │  │
//! │  │  Too slow?         ── ClientError::Timeout ────┘      │          │  │
//! │  └───────────────────────────────────────────────────────┼──────────┘  │
//! │                                                          ▼             │
//! │                                  toast: "[aviso] Total no coincide…"   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use huevo_client::{ClientError, Notice};
use huevo_core::{CoreError, ValidationError};
use serde::Serialize;

/// Error returned from terminal commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Cantidad: campo obligatorio."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Text shown to the operator
    pub message: String,
}

/// Error codes for command failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A form field failed before any call
    ValidationError,

    /// A workflow rule refused the action (caja closed, sale in progress…)
    BusinessLogic,

    /// The screen needs a login or a role the session lacks
    Unauthorized,

    /// The backend rejected the command
    BackendError,

    /// Unique code already taken
    Duplicate,

    /// The stock ledger refused a negative balance
    StockRejected,

    /// The backend did not answer in time
    Timeout,

    /// No connection to the backend
    Connection,

    /// The same action is already running
    Busy,

    /// Unknown command or bad usage
    Usage,

    /// Anything else
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn usage(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Usage, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(resource: &str, id: impl std::fmt::Display) -> Self {
        ApiError::new(ErrorCode::Usage, format!("{resource} {id} no encontrado."))
    }

    /// Toast for this error. Operator mistakes are warnings.
    pub fn notice(&self) -> Notice {
        match self.code {
            ErrorCode::ValidationError | ErrorCode::BusinessLogic | ErrorCode::Usage | ErrorCode::Busy => {
                Notice::warning(self.message.clone())
            }
            _ => Notice::error(self.message.clone()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            CoreError::MissingCredentials => ApiError::validation(err.to_string()),
            CoreError::InvalidCredentials | CoreError::InvalidSession => {
                ApiError::unauthorized(err.to_string())
            }
            other => ApiError::new(ErrorCode::BusinessLogic, other.to_string()),
        }
    }
}

impl From<ClientError> for ApiError {
    fn from(err: ClientError) -> Self {
        let message = err.user_message();
        match err {
            ClientError::Core(core) => core.into(),
            ClientError::Timeout { .. } => ApiError::new(ErrorCode::Timeout, message),
            ClientError::DuplicateCode => ApiError::new(ErrorCode::Duplicate, message),
            ClientError::StockCheckViolation => ApiError::new(ErrorCode::StockRejected, message),
            ClientError::NotLoggedIn => ApiError::unauthorized(message),
            ClientError::Rejected { .. } => ApiError::new(ErrorCode::BackendError, message),
            ClientError::Busy(_) => ApiError::new(ErrorCode::Busy, message),
            ClientError::ConnectionFailed(_)
            | ClientError::Disconnected
            | ClientError::WebSocketError(_) => ApiError::new(ErrorCode::Connection, message),
            other => {
                tracing::error!(error = %other, "Command failed");
                ApiError::new(ErrorCode::Internal, message)
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use huevo_client::NoticeLevel;

    #[test]
    fn test_client_errors_map_to_codes() {
        let timeout = ApiError::from(ClientError::Timeout {
            command: "stock_mov_listar".into(),
            millis: 7000,
        });
        assert_eq!(timeout.code, ErrorCode::Timeout);
        assert_eq!(timeout.message, "Timeout del backend.");

        let dup = ApiError::from(ClientError::DuplicateCode);
        assert_eq!(dup.code, ErrorCode::Duplicate);
        assert_eq!(dup.message, "El código ya existe.");

        let rule = ApiError::from(ClientError::Core(CoreError::CajaClosed));
        assert_eq!(rule.code, ErrorCode::BusinessLogic);
        assert_eq!(rule.notice().level, NoticeLevel::Warning);
    }

    #[test]
    fn test_validation_keeps_field_message() {
        let err = ApiError::from(ClientError::from(ValidationError::Required {
            field: "Descripción".into(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Descripción: campo obligatorio.");
    }

    #[test]
    fn test_serializes_screaming_code() {
        let json = serde_json::to_value(ApiError::unauthorized("Credenciales incorrectas.")).unwrap();
        assert_eq!(json["code"], "UNAUTHORIZED");
        assert_eq!(json["message"], "Credenciales incorrectas.");
    }
}

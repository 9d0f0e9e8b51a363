//! # Command Protocol
//!
//! Frames exchanged with the backend over the command socket.
//!
//! ## Protocol Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Command Protocol Frames                            │
//! │                                                                         │
//! │  CALL                                                                  │
//! │  ────                                                                  │
//! │  client  ───► Invoke { id, command, args }                             │
//! │  backend ◄─── Reply  { id, ok: <value> }                               │
//! │           or  Reply  { id, error: "<message>" }                        │
//! │                                                                         │
//! │  SESSION                                                               │
//! │  ───────                                                               │
//! │  backend ───► SessionUpdated {}   (another window logged in or out)    │
//! │                                                                         │
//! │  Replies may arrive in any order; `id` pairs them with their call.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wire Format
//! ```json
//! { "type": "Invoke", "payload": { "id": "…", "command": "venta_listar", "args": { … } } }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ClientError, ClientResult};

/// All frames of the command socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Frame {
    /// A named command call.
    Invoke(InvokePayload),

    /// The answer to one call.
    Reply(ReplyPayload),

    /// The backend's session changed outside this process.
    SessionUpdated {},
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokePayload {
    pub id: String,
    pub command: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyPayload {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplyPayload {
    /// Converts the reply into the call result.
    ///
    /// A reply with neither field is a successful call that returns nothing.
    pub fn into_result(self, command: &str) -> ClientResult<Value> {
        match (self.ok, self.error) {
            (_, Some(message)) => Err(ClientError::Rejected {
                command: command.to_string(),
                message,
            }),
            (Some(value), None) => Ok(value),
            (None, None) => Ok(Value::Null),
        }
    }
}

impl Frame {
    pub fn invoke(id: impl Into<String>, command: impl Into<String>, args: Value) -> Self {
        Frame::Invoke(InvokePayload {
            id: id.into(),
            command: command.into(),
            args,
        })
    }

    /// Returns the frame type name (for logging).
    pub fn type_name(&self) -> &'static str {
        match self {
            Frame::Invoke(_) => "Invoke",
            Frame::Reply(_) => "Reply",
            Frame::SessionUpdated {} => "SessionUpdated",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

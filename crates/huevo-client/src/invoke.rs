//! # Typed Command Invocation
//!
//! Wraps a [`CommandTransport`] with argument serialization, reply typing,
//! the critical-path timeout and logging. Every service in this crate calls
//! the backend through [`CommandClient`].
//!
//! ## Call Flow
//! ```text
//! service ──► CommandClient::call::<A, R>(command, &args)
//!                 │
//!                 ├── serde_json::to_value(args)
//!                 ├── debug!(command)
//!                 ▼
//!             CommandTransport::invoke ──► backend
//!                 │
//!                 ├── Err(Rejected)  → warn!, returned as is
//!                 ▼
//!             serde_json::from_value::<R>(reply)
//! ```
//!
//! `call_guarded` adds `tokio::time::timeout` around the same flow. The guard
//! only stops waiting: the backend may still complete the command.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};
use crate::transport::CommandTransport;

/// Default liveness guard for critical-path calls.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_millis(7000);

// =============================================================================
// Argument Envelopes
// =============================================================================

/// Wraps arguments as `{input: ...}`, the shape most commands take.
#[derive(Debug, Serialize)]
pub struct Input<T> {
    pub input: T,
}

impl<T> Input<T> {
    pub fn new(input: T) -> Self {
        Input { input }
    }
}

/// No arguments. Serializes as `{}`.
#[derive(Debug, Default, Serialize)]
pub struct NoArgs {}

// =============================================================================
// Command Client
// =============================================================================

/// Shared, cloneable handle used by every service.
#[derive(Clone)]
pub struct CommandClient {
    transport: Arc<dyn CommandTransport>,
    call_timeout: Duration,
}

impl CommandClient {
    pub fn new(transport: Arc<dyn CommandTransport>) -> Self {
        CommandClient {
            transport,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Invokes `command` and types the reply.
    pub async fn call<A, R>(&self, command: &str, args: &A) -> ClientResult<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let raw = self.call_raw(command, args).await?;
        decode(command, raw)
    }

    /// Invokes a command whose reply carries nothing of interest.
    pub async fn call_unit<A>(&self, command: &str, args: &A) -> ClientResult<()>
    where
        A: Serialize + ?Sized,
    {
        self.call_raw(command, args).await.map(|_| ())
    }

    /// Invokes `command` and returns the untyped reply.
    pub async fn call_raw<A>(&self, command: &str, args: &A) -> ClientResult<Value>
    where
        A: Serialize + ?Sized,
    {
        let args = serde_json::to_value(args)?;
        debug!(command, "invoke");

        match self.transport.invoke(command, args).await {
            Ok(value) => Ok(value),
            Err(e) => {
                if e.is_backend() {
                    warn!(command, error = %e, "Backend rejected command");
                } else {
                    warn!(command, error = %e, "Command failed");
                }
                Err(e)
            }
        }
    }

    /// Like [`call`](Self::call), bounded by the configured call timeout.
    pub async fn call_guarded<A, R>(&self, command: &str, args: &A) -> ClientResult<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.with_timeout(command, self.call(command, args)).await
    }

    /// Like [`call_unit`](Self::call_unit), bounded by the configured call timeout.
    pub async fn call_unit_guarded<A>(&self, command: &str, args: &A) -> ClientResult<()>
    where
        A: Serialize + ?Sized,
    {
        self.with_timeout(command, self.call_unit(command, args)).await
    }

    /// Bounds any future by the configured call timeout.
    ///
    /// `label` names the operation in the timeout error and the log.
    pub async fn with_timeout<T, F>(&self, label: &str, fut: F) -> ClientResult<T>
    where
        F: std::future::Future<Output = ClientResult<T>>,
    {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                let millis = self.call_timeout.as_millis() as u64;
                warn!(command = label, millis, "Backend call timed out");
                Err(ClientError::Timeout {
                    command: label.to_string(),
                    millis,
                })
            }
        }
    }
}

fn decode<R: DeserializeOwned>(command: &str, raw: Value) -> ClientResult<R> {
    serde_json::from_value(raw).map_err(|e| ClientError::DeserializationFailed {
        command: command.to_string(),
        reason: e.to_string(),
    })
}

// =============================================================================
// Busy Flags
// =============================================================================

/// Blocks duplicate submission of one action while its call is in flight.
///
/// ## Usage
/// ```rust,ignore
/// let _busy = self.finalizing.acquire("Cobro")?;   // Err(Busy) if running
/// self.client.call_unit("venta_finalizar", &args).await?;
/// // released on drop, success or failure
/// ```
#[derive(Debug, Default, Clone)]
pub struct BusyFlag {
    flag: Arc<AtomicBool>,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    pub fn acquire(&self, action: &'static str) -> ClientResult<BusyGuard> {
        if self
            .flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::Busy(action));
        }
        Ok(BusyGuard {
            flag: self.flag.clone(),
        })
    }
}

/// Releases its [`BusyFlag`] on drop.
#[derive(Debug)]
pub struct BusyGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

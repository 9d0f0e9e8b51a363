//! # Caja Module
//!
//! Cash register status, the daily close summary, and the rules that tie the
//! register to the sale draft and to logout.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────────┐     Opened (caja_abrir)      ┌──────────┐               │
//! │   │  Closed  │ ───────────────────────────► │   Open   │               │
//! │   │          │ ◄─────────────────────────── │          │               │
//! │   └──────────┘     Closed (caja_cerrar)     └──────────┘               │
//! │                                                                         │
//! │   • Close is refused while the sale draft has lines                    │
//! │   • Logout is refused while Open                                       │
//! │   • After every open/close the status is re-read from the backend      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::sale::SaleState;
use crate::types::{CajaId, PaymentMethod};

// =============================================================================
// State
// =============================================================================

/// Last known register status. Only ever set from a backend reply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CajaState {
    #[default]
    Closed,
    Open,
}

/// Register events confirmed by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CajaEvent {
    Opened,
    Closed,
}

impl CajaState {
    /// Maps the `caja_esta_abierta` reply.
    pub const fn from_status(abierta: bool) -> Self {
        if abierta {
            CajaState::Open
        } else {
            CajaState::Closed
        }
    }

    pub const fn is_open(&self) -> bool {
        matches!(self, CajaState::Open)
    }

    pub const fn name(&self) -> &'static str {
        match self {
            CajaState::Closed => "Closed",
            CajaState::Open => "Open",
        }
    }

    pub fn transition(self, event: CajaEvent) -> CoreResult<CajaState> {
        match (self, event) {
            (CajaState::Closed, CajaEvent::Opened) => Ok(CajaState::Open),
            (CajaState::Open, CajaEvent::Closed) => Ok(CajaState::Closed),
            (state, event) => Err(CoreError::InvalidTransition {
                from: state.name(),
                event: match event {
                    CajaEvent::Opened => "Opened",
                    CajaEvent::Closed => "Closed",
                },
            }),
        }
    }

    /// Operations that need an open register (finalize, apply combo).
    pub fn ensure_open(&self) -> CoreResult<()> {
        if !self.is_open() {
            return Err(CoreError::CajaClosed);
        }
        Ok(())
    }

    /// Checked before the close confirmation is shown and again right
    /// before `caja_cerrar` is sent.
    pub fn ensure_can_close(&self, sale: &SaleState) -> CoreResult<()> {
        self.ensure_open()?;
        if sale.has_lines() {
            return Err(CoreError::SaleInProgress);
        }
        Ok(())
    }

    pub fn ensure_can_logout(&self) -> CoreResult<()> {
        if self.is_open() {
            return Err(CoreError::CajaOpen);
        }
        Ok(())
    }
}

impl fmt::Display for CajaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CajaState::Closed => "Caja cerrada",
            CajaState::Open => "Caja abierta",
        })
    }
}

// =============================================================================
// Replies
// =============================================================================

/// `caja_abrir`/`caja_cerrar` reply: either a bare id or `{id_caja}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CajaIdReply {
    Id(CajaId),
    Object { id_caja: CajaId },
}

impl CajaIdReply {
    pub const fn id(&self) -> CajaId {
        match self {
            CajaIdReply::Id(id) | CajaIdReply::Object { id_caja: id } => *id,
        }
    }
}

/// Per-method line of the daily summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CajaSummaryMethod {
    pub medio: String,
    pub total_medio: Money,
}

impl CajaSummaryMethod {
    /// Display label for the method, falling back to the raw wire value.
    pub fn label(&self) -> String {
        self.medio
            .parse::<PaymentMethod>()
            .map(|m| m.label().to_string())
            .unwrap_or_else(|_| self.medio.clone())
    }
}

/// `caja_resumen_diario`: what today's registers took in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CajaSummary {
    #[serde(default)]
    pub id_cajas: Vec<CajaId>,
    pub fecha_min: Option<String>,
    pub fecha_max: Option<String>,
    pub cantidad_cajas: i64,
    pub cantidad_ventas: i64,
    pub total_general: Money,
    #[serde(default)]
    pub por_medio: Vec<CajaSummaryMethod>,
}

// =============================================================================
// Confirmations
// =============================================================================

/// Which confirmation is being asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CajaAction {
    Abrir,
    Cerrar,
}

/// Confirmation prompt text, stamped with the current local time.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use huevo_core::caja::{confirmation_text, CajaAction};
///
/// let now = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(9, 5, 0).unwrap();
/// assert_eq!(
///     confirmation_text(CajaAction::Abrir, now),
///     "¿Abrir la caja? (19/10/2026 09:05)"
/// );
/// ```
pub fn confirmation_text(action: CajaAction, now: NaiveDateTime) -> String {
    let verb = match action {
        CajaAction::Abrir => "Abrir",
        CajaAction::Cerrar => "Cerrar",
    };
    format!("¿{verb} la caja? ({})", now.format("%d/%m/%Y %H:%M"))
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Sale Module
//!
//! The cashier's sale draft: cart contract, payment rules and the draft
//! state machine.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Draft Lifecycle                              │
//! │                                                                         │
//! │   ┌─────────┐  Started(id)   ┌────────────┐  Finalized  ┌───────────┐   │
//! │   │ NoSale  │ ─────────────► │  Drafting  │ ──────────► │ Finalized │   │
//! │   └─────────┘                │ id + cart  │             └─────┬─────┘   │
//! │        ▲                     └─────┬──────┘                   │         │
//! │        │                      │    │ Cancelled          Reset │         │
//! │        │      CartRefreshed ──┘    ▼                          │         │
//! │        │                     ┌────────────┐                   │         │
//! │        └──────── Reset ───── │ Cancelled  │ ◄─────────────────┘         │
//! │                              └────────────┘                             │
//! │                                                                         │
//! │  The cart inside Drafting is ALWAYS the last `venta_listar` reply.     │
//! │  Totals are never computed on the client.                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{ItemId, PaymentMethod, ProductId, SaleId};
use crate::MAX_PAYMENTS_PER_SALE;

// =============================================================================
// Cart Contract
// =============================================================================

/// One line of the sale draft as the backend reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id_item: ItemId,
    pub id_producto: ProductId,
    #[serde(default)]
    pub nombre: String,
    pub cantidad: i64,
    pub precio_unitario: Money,
    pub subtotal: Money,
}

/// Authoritative cart: lines plus the backend-computed total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Cart {
    pub lineas: Vec<CartLine>,
    pub total: Money,
}

impl Cart {
    pub fn empty() -> Self {
        Cart::default()
    }

    pub fn is_empty(&self) -> bool {
        self.lineas.is_empty()
    }

    pub fn line_count(&self) -> usize {
        self.lineas.len()
    }

    pub fn find_line(&self, id_item: ItemId) -> Option<&CartLine> {
        self.lineas.iter().find(|l| l.id_item == id_item)
    }
}

/// `venta_listar` reply. Older backends answer with a `[lineas, total]`
/// tuple instead of an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CartReply {
    Object { lineas: Vec<CartLine>, total: Money },
    Tuple(Vec<CartLine>, Money),
}

impl From<CartReply> for Cart {
    fn from(reply: CartReply) -> Self {
        match reply {
            CartReply::Object { lineas, total } | CartReply::Tuple(lineas, total) => {
                Cart { lineas, total }
            }
        }
    }
}

// =============================================================================
// Payments
// =============================================================================

/// One payment of a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub medio: PaymentMethod,
    pub monto: Money,
    pub referencia: Option<String>,
}

impl Payment {
    pub fn new(medio: PaymentMethod, monto: Money) -> Self {
        Payment {
            medio,
            monto,
            referencia: None,
        }
    }

    pub fn with_referencia(mut self, referencia: Option<String>) -> Self {
        self.referencia = referencia;
        self
    }
}

/// Checks a payment list against the cart total.
///
/// ## Rules
/// - At least one payment, at most [`MAX_PAYMENTS_PER_SALE`]
/// - Every amount > 0
/// - The sum equals `total` exactly, even with a single payment
///
/// ## User Workflow
/// ```text
/// Total $ 250, cashier enters efectivo $ 200
///      │
///      ▼
/// validate_payments() ← THIS FUNCTION
///      │
///      ▼
/// Err(PaymentMismatch) → inline message, venta_finalizar never sent
/// ```
pub fn validate_payments(pagos: &[Payment], total: Money) -> CoreResult<()> {
    if pagos.is_empty() {
        return Err(ValidationError::Required {
            field: "Pagos".to_string(),
        }
        .into());
    }

    if pagos.len() > MAX_PAYMENTS_PER_SALE {
        return Err(ValidationError::OutOfRange {
            field: "Cantidad de pagos".to_string(),
            min: 1,
            max: MAX_PAYMENTS_PER_SALE as i64,
        }
        .into());
    }

    for pago in pagos {
        if !pago.monto.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: format!("Monto ({})", pago.medio.label()),
            }
            .into());
        }
    }

    let suma = Money::checked_sum(pagos.iter().map(|p| p.monto)).ok_or_else(|| {
        ValidationError::Overflow {
            field: "Monto".to_string(),
        }
    })?;
    if suma != total {
        return Err(CoreError::PaymentMismatch {
            pagos: suma,
            total,
        });
    }

    Ok(())
}

// =============================================================================
// Draft State Machine
// =============================================================================

/// Where the cashier's sale draft stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SaleState {
    #[default]
    NoSale,
    Drafting {
        id_venta: SaleId,
        cart: Cart,
    },
    Finalized {
        id_venta: SaleId,
        total: Money,
    },
    Cancelled {
        id_venta: SaleId,
    },
}

/// Things that happen to a sale draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleEvent {
    /// `venta_iniciar` answered with a new id.
    Started(SaleId),
    /// `venta_listar` answered after a mutation.
    CartRefreshed(Cart),
    Finalized,
    Cancelled,
    /// The confirmation was acknowledged; ready for the next sale.
    Reset,
}

impl SaleEvent {
    const fn name(&self) -> &'static str {
        match self {
            SaleEvent::Started(_) => "Started",
            SaleEvent::CartRefreshed(_) => "CartRefreshed",
            SaleEvent::Finalized => "Finalized",
            SaleEvent::Cancelled => "Cancelled",
            SaleEvent::Reset => "Reset",
        }
    }
}

impl SaleState {
    pub const fn name(&self) -> &'static str {
        match self {
            SaleState::NoSale => "NoSale",
            SaleState::Drafting { .. } => "Drafting",
            SaleState::Finalized { .. } => "Finalized",
            SaleState::Cancelled { .. } => "Cancelled",
        }
    }

    /// Applies an event. Every state/event pair not listed is rejected.
    pub fn transition(self, event: SaleEvent) -> CoreResult<SaleState> {
        match (self, event) {
            (
                SaleState::NoSale | SaleState::Finalized { .. } | SaleState::Cancelled { .. },
                SaleEvent::Started(id_venta),
            ) => Ok(SaleState::Drafting {
                id_venta,
                cart: Cart::empty(),
            }),

            (SaleState::Drafting { id_venta, .. }, SaleEvent::CartRefreshed(cart)) => {
                Ok(SaleState::Drafting { id_venta, cart })
            }

            (SaleState::Drafting { id_venta, cart }, SaleEvent::Finalized) => {
                Ok(SaleState::Finalized {
                    id_venta,
                    total: cart.total,
                })
            }

            (SaleState::Drafting { id_venta, .. }, SaleEvent::Cancelled) => {
                Ok(SaleState::Cancelled { id_venta })
            }

            (
                SaleState::NoSale | SaleState::Finalized { .. } | SaleState::Cancelled { .. },
                SaleEvent::Reset,
            ) => Ok(SaleState::NoSale),

            (state, event) => Err(CoreError::InvalidTransition {
                from: state.name(),
                event: event.name(),
            }),
        }
    }

    /// Draft id, if a draft exists.
    pub fn id_venta(&self) -> Option<SaleId> {
        match self {
            SaleState::Drafting { id_venta, .. } => Some(*id_venta),
            _ => None,
        }
    }

    pub fn cart(&self) -> Option<&Cart> {
        match self {
            SaleState::Drafting { cart, .. } => Some(cart),
            _ => None,
        }
    }

    /// A draft with at least one line blocks closing the register.
    pub fn has_lines(&self) -> bool {
        self.cart().is_some_and(|c| !c.is_empty())
    }

    /// Runs every client-side check before `venta_finalizar`.
    ///
    /// Returns the draft id to send.
    pub fn ensure_can_finalize(&self, caja_abierta: bool, pagos: &[Payment]) -> CoreResult<SaleId> {
        if !caja_abierta {
            return Err(CoreError::CajaClosed);
        }
        let (id_venta, cart) = match self {
            SaleState::Drafting { id_venta, cart } => (*id_venta, cart),
            _ => return Err(CoreError::NoSaleInProgress),
        };
        if cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        validate_payments(pagos, cart.total)?;
        Ok(id_venta)
    }
}

// =============================================================================
// Today's History
// =============================================================================

/// Row of `historial_ventas_hoy`: one per sold line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id_venta: SaleId,
    pub hora: String,
    #[serde(default)]
    pub codigo_producto: String,
    pub producto: String,
    pub cantidad: i64,
    pub precio_unitario: Money,
    pub subtotal: Money,
    pub total_venta: Money,
    #[serde(default)]
    pub pagos_detalle: Option<String>,
}

/// Lines of one sale, grouped for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryGroup {
    pub id_venta: SaleId,
    pub hora: String,
    pub total_venta: Money,
    pub pagos_detalle: Option<String>,
    pub items: Vec<HistoryItem>,
}

/// Groups history rows by sale, keeping the order in which sales first
/// appear. Totals are taken from the backend rows, never summed here.
pub fn group_history(rows: Vec<HistoryItem>) -> Vec<HistoryGroup> {
    let mut groups: Vec<HistoryGroup> = Vec::new();
    for row in rows {
        match groups.iter_mut().find(|g| g.id_venta == row.id_venta) {
            Some(group) => group.items.push(row),
            None => groups.push(HistoryGroup {
                id_venta: row.id_venta,
                hora: row.hora.clone(),
                total_venta: row.total_venta,
                pagos_detalle: row.pagos_detalle.clone(),
                items: vec![row],
            }),
        }
    }
    groups
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Sale Service
//!
//! The cashier's draft: lazy start, line edits, combo application, payment
//! and cancellation.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Sale Draft Workflow                                │
//! │                                                                         │
//! │  NoSale ── add_item / apply combo ──► venta_iniciar ──► Drafting       │
//! │                                                                         │
//! │  Drafting:                                                             │
//! │    venta_agregar_item │ venta_set_cantidad │ venta_quitar_item         │
//! │          │                                                              │
//! │          └──► venta_listar (always) ──► CartRefreshed(lines, total)    │
//! │                                                                         │
//! │    finalize(pagos):                                                    │
//! │      caja open? ≥1 line? Σ pagos == total? ── no ──► error, no call    │
//! │          │ yes                                                          │
//! │          ▼                                                              │
//! │      venta_finalizar ──► Finalized ── acknowledge() ──► NoSale         │
//! │                                                                         │
//! │    cancel: confirm ──► venta_cancelar ──► NoSale                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Totals are never computed here; the cart shown is exactly the last
//! `venta_listar` reply.

use huevo_core::caja::CajaState;
use huevo_core::sale::{group_history, Cart, CartReply, HistoryGroup, HistoryItem, Payment, SaleEvent, SaleState};
use huevo_core::promo::ApplyComboInput;
use huevo_core::validation::validate_quantity;
use huevo_core::{ComboId, CoreError, ItemId, Money, ProductId, SaleId, StockItem, StockListQuery};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::caja::CajaService;
use crate::error::ClientResult;
use crate::invoke::{BusyFlag, CommandClient, Input, NoArgs};
use crate::notify::{ConfirmRequest, Prompter};

/// Result size of the sale screen's product picker.
const PICKER_LIMIT: u32 = 50;

#[derive(Serialize)]
struct SaleRef {
    id_venta: SaleId,
}

#[derive(Serialize)]
struct AddItemArgs {
    id_venta: SaleId,
    id_producto: ProductId,
    cantidad: i64,
}

#[derive(Serialize)]
struct SetQuantityArgs {
    id_item: ItemId,
    cantidad: i64,
}

#[derive(Serialize)]
struct ItemRef {
    id_item: ItemId,
}

#[derive(Serialize)]
struct FinalizeArgs<'a> {
    id_venta: SaleId,
    pagos: &'a [Payment],
}

#[derive(Clone)]
pub struct SaleService {
    client: CommandClient,
    caja: CajaService,
    state: Arc<RwLock<SaleState>>,
    stale: Arc<AtomicBool>,
    /// Held from the "no draft yet" check until `venta_iniciar` is recorded.
    starting: Arc<Mutex<()>>,
    editing: BusyFlag,
    finalizing: BusyFlag,
}

impl SaleService {
    pub fn new(client: CommandClient, caja: CajaService) -> Self {
        SaleService {
            client,
            caja,
            state: Arc::new(RwLock::new(SaleState::NoSale)),
            stale: Arc::new(AtomicBool::new(false)),
            starting: Arc::new(Mutex::new(())),
            editing: BusyFlag::new(),
            finalizing: BusyFlag::new(),
        }
    }

    pub async fn state(&self) -> SaleState {
        self.state.read().await.clone()
    }

    pub async fn caja_state(&self) -> CajaState {
        self.caja.state().await
    }

    /// True when the last cart refresh failed; the cart shown is old.
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::Acquire)
    }

    async fn apply(&self, event: SaleEvent) -> ClientResult<()> {
        let mut state = self.state.write().await;
        let next = state.clone().transition(event)?;
        *state = next;
        Ok(())
    }

    /// Returns the draft id, starting a draft on first use.
    pub(crate) async fn ensure_draft(&self) -> ClientResult<SaleId> {
        let _starting = self.starting.lock().await;
        if let Some(id) = self.state.read().await.id_venta() {
            return Ok(id);
        }
        self.caja.state().await.ensure_open()?;

        let id: SaleId = self.client.call("venta_iniciar", &NoArgs {}).await?;
        self.apply(SaleEvent::Started(id)).await?;
        self.stale.store(false, Ordering::Release);
        info!(id_venta = id, "Sale draft started");
        Ok(id)
    }

    /// Re-fetches the cart. A failure flags the cart as stale.
    pub async fn refresh(&self) -> ClientResult<Cart> {
        let id_venta = self
            .state
            .read()
            .await
            .id_venta()
            .ok_or(CoreError::NoSaleInProgress)?;

        match self
            .client
            .call::<_, CartReply>("venta_listar", &Input::new(SaleRef { id_venta }))
            .await
        {
            Ok(reply) => {
                let cart = Cart::from(reply);
                self.apply(SaleEvent::CartRefreshed(cart.clone())).await?;
                self.stale.store(false, Ordering::Release);
                debug!(id_venta, total = %cart.total, lines = cart.line_count(), "Cart refreshed");
                Ok(cart)
            }
            Err(e) => {
                self.stale.store(true, Ordering::Release);
                warn!(id_venta, error = %e, "Cart refresh failed");
                Err(e)
            }
        }
    }

    pub async fn add_item(&self, id_producto: ProductId, cantidad: i64) -> ClientResult<Cart> {
        validate_quantity("Cantidad", cantidad)?;
        let _busy = self.editing.acquire("Carga de producto")?;

        let id_venta = self.ensure_draft().await?;
        debug!(id_venta, id_producto, cantidad, "add item command");
        let mutation = self
            .client
            .call_unit(
                "venta_agregar_item",
                &Input::new(AddItemArgs {
                    id_venta,
                    id_producto,
                    cantidad,
                }),
            )
            .await;
        self.refresh_after(mutation).await
    }

    pub async fn set_quantity(&self, id_item: ItemId, cantidad: i64) -> ClientResult<Cart> {
        validate_quantity("Cantidad", cantidad)?;
        let _busy = self.editing.acquire("Cambio de cantidad")?;
        self.require_draft().await?;

        let mutation = self
            .client
            .call_unit("venta_set_cantidad", &Input::new(SetQuantityArgs { id_item, cantidad }))
            .await;
        self.refresh_after(mutation).await
    }

    pub async fn remove_item(&self, id_item: ItemId) -> ClientResult<Cart> {
        let _busy = self.editing.acquire("Quitar producto")?;
        self.require_draft().await?;

        let mutation = self
            .client
            .call_unit("venta_quitar_item", &Input::new(ItemRef { id_item }))
            .await;
        self.refresh_after(mutation).await
    }

    /// Adds a combo at `precio` to the draft, starting one if needed.
    ///
    /// Shares the edit guard with the line edits, so a combo and a line can't
    /// be sent to the same draft at once.
    pub(crate) async fn apply_combo(&self, id_combo: ComboId, precio: Money) -> ClientResult<(SaleId, Cart)> {
        let _busy = self.editing.acquire("Aplicar promo")?;

        let id_venta = self.ensure_draft().await?;
        let mutation = self
            .client
            .call_unit(
                "venta_aplicar_promo_combo",
                &Input::new(ApplyComboInput {
                    id_venta,
                    id_combo,
                    precio_total_pack: precio,
                }),
            )
            .await;
        let cart = self.refresh_after(mutation).await?;
        Ok((id_venta, cart))
    }

    /// The cart is re-fetched whether the mutation succeeded or not.
    pub(crate) async fn refresh_after(&self, mutation: ClientResult<()>) -> ClientResult<Cart> {
        let refreshed = self.refresh().await;
        mutation?;
        refreshed
    }

    async fn require_draft(&self) -> ClientResult<SaleId> {
        Ok(self
            .state
            .read()
            .await
            .id_venta()
            .ok_or(CoreError::NoSaleInProgress)?)
    }

    /// Charges the draft. Every check runs before the call.
    ///
    /// A stale cart is re-read first; payments are never checked against a
    /// total the backend may no longer hold. Returns the charged total.
    pub async fn finalize(&self, pagos: Vec<Payment>) -> ClientResult<Money> {
        if self.is_stale() {
            self.refresh().await?;
        }
        let caja_abierta = self.caja.state().await.is_open();
        let (id_venta, total) = {
            let state = self.state.read().await;
            let id_venta = state.ensure_can_finalize(caja_abierta, &pagos)?;
            (id_venta, state.cart().map(|c| c.total).unwrap_or_default())
        };

        let _busy = self.finalizing.acquire("Cobro")?;
        self.client
            .call_unit(
                "venta_finalizar",
                &Input::new(FinalizeArgs {
                    id_venta,
                    pagos: &pagos,
                }),
            )
            .await?;
        self.apply(SaleEvent::Finalized).await?;

        info!(id_venta, total = %total, pagos = pagos.len(), "Sale finalized");
        Ok(total)
    }

    /// Dismisses the finalize confirmation.
    pub async fn acknowledge(&self) -> ClientResult<()> {
        let mut state = self.state.write().await;
        if matches!(*state, SaleState::NoSale) {
            return Ok(());
        }
        *state = state.clone().transition(SaleEvent::Reset)?;
        Ok(())
    }

    /// Cancels the draft after confirmation. Returns `false` when declined.
    pub async fn cancel(&self, prompter: &dyn Prompter) -> ClientResult<bool> {
        let id_venta = self.require_draft().await?;

        let request = ConfirmRequest::new(
            "Cancelar venta",
            format!("¿Cancelar la venta #{id_venta}? Se descartan todos los productos cargados."),
        )
        .with_label("Cancelar venta")
        .danger();
        if !prompter.confirm(&request).await {
            return Ok(false);
        }

        let _busy = self.editing.acquire("Cancelación")?;
        self.client
            .call_unit("venta_cancelar", &Input::new(SaleRef { id_venta }))
            .await?;
        self.apply(SaleEvent::Cancelled).await?;
        self.apply(SaleEvent::Reset).await?;
        self.stale.store(false, Ordering::Release);

        info!(id_venta, "Sale cancelled");
        Ok(true)
    }

    /// Today's finalized sales, grouped per sale.
    pub async fn today_history(&self) -> ClientResult<Vec<HistoryGroup>> {
        let rows: Vec<HistoryItem> = self.client.call("historial_ventas_hoy", &NoArgs {}).await?;
        Ok(group_history(rows))
    }

    /// Active products matching `q`, for the picker.
    pub async fn search_products(&self, q: Option<String>) -> ClientResult<Vec<StockItem>> {
        self.client
            .call("stock_listar", &StockListQuery::active(q, PICKER_LIMIT))
            .await
    }
}

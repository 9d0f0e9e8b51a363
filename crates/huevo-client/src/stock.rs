//! # Stock Service
//!
//! Product catalog administration: listing, creation, updates, activation,
//! shrinkage, purchases, reorder settings and the history timeline.
//!
//! ## Update Flow
//! ```text
//! "Actualizar" form ──► plan_update() ──► [StockCall, ...]   (nothing sent
//!                                              │               if planning
//!                                              ▼               fails)
//!                        stock_ajustar / stock_fijar_absoluto / precio_actualizar
//!                        issued in order, stopping at the first failure
//! ```
//!
//! ## History Timeline
//! ```text
//!            ┌── stock_mov_listar   (≤15) ──┐
//! timeout ───┼── precio_hist_listar venta (≤10) ──┼──► merge, sort desc, keep 20
//!  (7 s)     └── precio_hist_listar costo (≤10) ──┘
//! ```
//! The three calls run concurrently; if any fails or the guard fires the
//! panel shows the error instead of a partial timeline.

use huevo_core::stock::{
    merge_timeline, plan_crate_purchase, plan_create_product, plan_merma, plan_replenish_update,
    plan_unit_purchase, plan_update, set_active_confirmation, MermaMotivo, NewProductForm,
    PriceHistoryEntry, ProductIdReply, PurchaseUnit, SetActiveInput, StockCall, StockMovement,
    StockUpdateForm, TimelineEvent,
};
use huevo_core::{Money, PriceKind, ProductId, ReplenishMode, StockItem, StockListQuery, UserId, ValidationError};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::StockSettings;
use crate::error::ClientResult;
use crate::invoke::{BusyFlag, CommandClient, Input};
use crate::notify::{ConfirmRequest, Prompter};

#[derive(Serialize)]
struct MovementQuery {
    id_producto: ProductId,
    limit: u32,
}

#[derive(Serialize)]
struct PriceHistoryQuery {
    id_producto: ProductId,
    tipo: PriceKind,
    limit: u32,
}

#[derive(Clone)]
pub struct StockService {
    client: CommandClient,
    settings: StockSettings,
    saving: BusyFlag,
}

impl StockService {
    pub fn new(client: CommandClient, settings: StockSettings) -> Self {
        StockService {
            client,
            settings,
            saving: BusyFlag::new(),
        }
    }

    pub fn settings(&self) -> &StockSettings {
        &self.settings
    }

    pub fn is_busy(&self) -> bool {
        self.saving.is_busy()
    }

    // =========================================================================
    // Listing
    // =========================================================================

    pub async fn list(&self, query: &StockListQuery) -> ClientResult<Vec<StockItem>> {
        debug!(q = ?query.q, solo_activos = query.solo_activos, offset = query.offset, "stock list command");
        self.client.call_guarded("stock_listar", query).await
    }

    /// One page of the admin list, active and inactive products alike.
    pub async fn page(&self, q: Option<String>, solo_activos: bool, page: u32) -> ClientResult<Vec<StockItem>> {
        let limit = self.settings.list_page_size;
        let offset = page.checked_mul(limit).ok_or_else(|| ValidationError::Overflow {
            field: "Página".to_string(),
        })?;
        self.list(&StockListQuery {
            q,
            solo_activos,
            limit,
            offset,
        })
        .await
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Creates a product and loads its initial stock.
    ///
    /// A duplicate code comes back as [`ClientError::DuplicateCode`](crate::ClientError::DuplicateCode).
    pub async fn create_product(&self, form: &NewProductForm) -> ClientResult<ProductId> {
        let plan = plan_create_product(form)?;
        let _busy = self.saving.acquire("Alta de producto")?;

        let reply: ProductIdReply = self
            .client
            .call_guarded("producto_crear", &Input::new(&plan.input))
            .await
            .map_err(|e| e.classify_product_create())?;
        let id_producto = reply.id_producto;

        if let Some(adjust) = plan.initial_stock(id_producto) {
            self.client
                .call_unit_guarded("stock_ajustar", &Input::new(&adjust))
                .await
                .map_err(|e| e.classify_stock_update())?;
        }

        info!(id_producto, codigo = %plan.input.codigo, stock_inicial = plan.stock_inicial, "Product created");
        Ok(id_producto)
    }

    // =========================================================================
    // Updates
    // =========================================================================

    /// Applies the "Actualizar" form. Returns the number of calls issued.
    pub async fn update(&self, item: &StockItem, form: &StockUpdateForm) -> ClientResult<usize> {
        let calls = plan_update(item, form)?;
        let _busy = self.saving.acquire("Actualización de stock")?;

        for call in &calls {
            let command = call.command();
            let sent = match call {
                StockCall::Adjust(input) => self.client.call_unit_guarded(command, &Input::new(input)).await,
                StockCall::Set(input) => self.client.call_unit_guarded(command, &Input::new(input)).await,
                StockCall::Price(input) => self.client.call_unit_guarded(command, &Input::new(input)).await,
            };
            sent.map_err(|e| e.classify_stock_update())?;
        }

        info!(id_producto = item.id_producto, calls = calls.len(), "Product updated");
        Ok(calls.len())
    }

    /// Activates or deactivates a product after confirmation.
    ///
    /// Deactivation is a flag; history stays. Returns `false` when declined.
    pub async fn set_active(&self, item: &StockItem, activo: bool, prompter: &dyn Prompter) -> ClientResult<bool> {
        let title = if activo { "Reactivar producto" } else { "Desactivar producto" };
        let mut request = ConfirmRequest::new(title, set_active_confirmation(item, activo));
        if !activo {
            request = request.danger();
        }
        if !prompter.confirm(&request).await {
            return Ok(false);
        }

        let _busy = self.saving.acquire("Cambio de estado")?;
        self.client
            .call_unit_guarded(
                "producto_set_activo",
                &Input::new(SetActiveInput {
                    id_producto: item.id_producto,
                    activo,
                }),
            )
            .await?;

        info!(id_producto = item.id_producto, activo, "Product activation changed");
        Ok(true)
    }

    pub async fn register_merma(
        &self,
        id_producto: ProductId,
        cantidad: i64,
        motivo: MermaMotivo,
        observacion: Option<&str>,
        id_usuario: UserId,
    ) -> ClientResult<()> {
        let input = plan_merma(id_producto, cantidad, motivo, observacion, id_usuario)?;
        let _busy = self.saving.acquire("Registro de merma")?;
        self.client
            .call_unit_guarded("stock_registrar_merma", &Input::new(&input))
            .await
            .map_err(|e| e.classify_stock_update())?;
        info!(id_producto, cantidad, motivo = motivo.as_str(), "Merma registered");
        Ok(())
    }

    pub async fn update_replenish(&self, id_producto: ProductId, modo: ReplenishMode, factor: i64) -> ClientResult<()> {
        let input = plan_replenish_update(id_producto, modo, factor)?;
        self.client
            .call_unit_guarded("producto_actualizar_reposicion", &Input::new(input))
            .await
    }

    // =========================================================================
    // Purchases
    // =========================================================================

    /// Purchase priced per unit. Arguments go flat, not under `input`.
    pub async fn register_unit_purchase(
        &self,
        item: &StockItem,
        cantidad: i64,
        costo_unitario: Money,
        referencia: Option<&str>,
        mantener_costo: bool,
    ) -> ClientResult<()> {
        let input = plan_unit_purchase(item, cantidad, costo_unitario, referencia, mantener_costo)?;
        let _busy = self.saving.acquire("Registro de compra")?;
        self.client.call_unit_guarded("registrar_compra", &input).await?;
        info!(id_producto = item.id_producto, cantidad, "Unit purchase registered");
        Ok(())
    }

    pub async fn register_crate_purchase(
        &self,
        id_producto: ProductId,
        unidad: PurchaseUnit,
        cantidad: i64,
        costo_total: Money,
    ) -> ClientResult<()> {
        let input = plan_crate_purchase(id_producto, unidad, cantidad, costo_total)?;
        let _busy = self.saving.acquire("Registro de compra")?;
        self.client.call_unit_guarded("stock_compra", &Input::new(&input)).await?;
        info!(id_producto, %unidad, cantidad, "Crate purchase registered");
        Ok(())
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Merged movement and price timeline, newest first.
    pub async fn history(&self, id_producto: ProductId) -> ClientResult<Vec<TimelineEvent>> {
        let movements = MovementQuery {
            id_producto,
            limit: self.settings.history_movements_limit,
        };
        let venta = PriceHistoryQuery {
            id_producto,
            tipo: PriceKind::Venta,
            limit: self.settings.history_prices_limit,
        };
        let costo = PriceHistoryQuery {
            tipo: PriceKind::Costo,
            ..venta
        };

        let movements = Input::new(&movements);
        let venta = Input::new(&venta);
        let costo = Input::new(&costo);

        let (movs, venta, costo) = self
            .client
            .with_timeout("historial de producto", async {
                let (movs, venta, costo) = tokio::join!(
                    self.client.call::<_, Vec<StockMovement>>("stock_mov_listar", &movements),
                    self.client.call::<_, Vec<PriceHistoryEntry>>("precio_hist_listar", &venta),
                    self.client.call::<_, Vec<PriceHistoryEntry>>("precio_hist_listar", &costo),
                );
                Ok((movs?, venta?, costo?))
            })
            .await?;

        Ok(merge_timeline(&movs, &venta, &costo, self.settings.history_max_entries))
    }
}

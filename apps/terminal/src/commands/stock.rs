//! # Stock Commands
//!
//! Product list, creation, quantity and price updates, shrinkage,
//! purchases and the per-product history. Every change re-reads the
//! current page so the list never shows values the backend no longer has.
//!
//! ## Update Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  actualizar 12 delta 5 3600 2200 "remito 881"                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  StockUpdateForm (Ambos) ──► plan_update                                │
//! │         │                    ├── stock_ajustar   (delta ≠ 0)            │
//! │         │                    ├── precio_actualizar venta (if changed)   │
//! │         │                    └── precio_actualizar costo (if changed)   │
//! │         ▼                                                               │
//! │  forget cached item ──► stock_listar (current page) ──► list            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use huevo_client::{ConfirmRequest, Notice};
use huevo_core::stock::{
    preview_crate_purchase, MermaMotivo, NewProductForm, PurchaseUnit, QuantityMode,
    StockUpdateForm, UpdateAction,
};
use huevo_core::validation::optional_text;
use huevo_core::{ProductId, ReplenishMode, MAPLES_PER_CAJON};
use tracing::debug;

use super::{text, unknown, Args, CommandResult, Reply, Shell};
use crate::render;
use crate::state::StockQuery;

pub async fn run(shell: &mut Shell, name: &str, args: &mut Args) -> CommandResult {
    match name {
        "stock" => list(shell, args, true).await,
        "stock-todos" => list(shell, args, false).await,
        "mas" => next_page(shell).await,
        "alta" => create(shell, args).await,
        "ajustar" => quantity(shell, args, QuantityMode::Delta).await,
        "fijar" => quantity(shell, args, QuantityMode::Fijar).await,
        "precio" => price(shell, args, UpdateAction::PrecioVenta).await,
        "costo" => price(shell, args, UpdateAction::Costo).await,
        "actualizar" => update_all(shell, args).await,
        "activar" => set_active(shell, args, true).await,
        "desactivar" => set_active(shell, args, false).await,
        "merma" => merma(shell, args).await,
        "reposicion-modo" => replenish_mode(shell, args).await,
        "historia" => history(shell, args).await,
        "compra" => unit_purchase(shell, args).await,
        "compra-cajon" => crate_purchase(shell, args).await,
        other => Err(unknown(other)),
    }
}

// =============================================================================
// Listing
// =============================================================================

async fn list(shell: &mut Shell, args: &mut Args, solo_activos: bool) -> CommandResult {
    shell.workspace_mut().stock_query = StockQuery {
        q: optional_text(args.rest().as_deref()),
        solo_activos,
        page: 0,
    };
    show_page(shell).await
}

async fn next_page(shell: &mut Shell) -> CommandResult {
    let query = &mut shell.workspace_mut().stock_query;
    query.page = query.page.saturating_add(1);
    show_page(shell).await
}

/// Loads the page described by the workspace query.
async fn show_page(shell: &mut Shell) -> CommandResult {
    let query = shell.workspace().stock_query.clone();
    let items = shell
        .pos()
        .stock()
        .page(query.q.clone(), query.solo_activos, query.page)
        .await?;
    shell.workspace_mut().remember(&items);

    let scope = if query.solo_activos { "activos" } else { "todos" };
    let title = match &query.q {
        Some(q) => format!("Stock ({scope}, «{q}») · página {}", query.page.saturating_add(1)),
        None => format!("Stock ({scope}) · página {}", query.page.saturating_add(1)),
    };
    text(render::products(&title, &items))
}

/// After a change: drops the cached copy and shows the current page again.
async fn changed(shell: &mut Shell, id_producto: ProductId, message: String) -> CommandResult {
    shell.workspace_mut().forget(id_producto);
    shell.notify(Notice::success(message));
    show_page(shell).await
}

// =============================================================================
// Creation And Updates
// =============================================================================

/// `alta <código> <precio_venta> <costo> <stock_inicial> <unitario|cajon> <nombre…>`
///
/// ## User Workflow
/// ```text
/// /admin/stock> alta P031 3600 2100 24 cajon Maple color
/// [ok] Producto #31 creado.
/// ```
async fn create(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let codigo = args.text("Código")?;
    let precio_venta = args.money("Precio venta")?;
    let costo = args.money("Costo")?;
    let stock_inicial = args.int("Stock inicial")?;
    let reposicion_modo: ReplenishMode = args.parse("Modo de reposición")?;
    let nombre = args.rest().unwrap_or_default();

    let form = NewProductForm {
        codigo,
        nombre,
        precio_venta,
        costo,
        stock_inicial,
        reposicion_modo,
        reposicion_factor: default_factor(reposicion_modo),
    };
    let id_producto = shell.pos().stock().create_product(&form).await?;
    changed(shell, id_producto, format!("Producto #{id_producto} creado.")).await
}

fn default_factor(modo: ReplenishMode) -> i64 {
    match modo {
        ReplenishMode::Unitario => 1,
        ReplenishMode::Cajon => MAPLES_PER_CAJON,
    }
}

/// `ajustar <id> <delta> [nota…]` and `fijar <id> <cantidad> [nota…]`
async fn quantity(shell: &mut Shell, args: &mut Args, mode: QuantityMode) -> CommandResult {
    let id_producto = args.int("Producto")?;
    let cantidad = args.int("Cantidad")?;
    let item = shell.product(id_producto).await?;

    let form = StockUpdateForm {
        mode,
        cantidad,
        nota: args.rest(),
        ..StockUpdateForm::for_item(&item, UpdateAction::Cantidad)
    };
    shell.pos().stock().update(&item, &form).await?;
    changed(shell, id_producto, format!("Stock de {} actualizado.", item.nombre)).await
}

/// `precio <id> <monto>` and `costo <id> <monto>`
async fn price(shell: &mut Shell, args: &mut Args, action: UpdateAction) -> CommandResult {
    let id_producto = args.int("Producto")?;
    let nuevo = args.money("Precio")?;
    let item = shell.product(id_producto).await?;

    let mut form = StockUpdateForm::for_item(&item, action);
    match action {
        UpdateAction::Costo => form.costo = nuevo,
        _ => form.precio_venta = nuevo,
    }
    shell.pos().stock().update(&item, &form).await?;
    changed(shell, id_producto, format!("Precio de {} actualizado.", item.nombre)).await
}

/// `actualizar <id> <delta|fijar> <cantidad> <precio_venta> <costo> [nota…]`
async fn update_all(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let id_producto = args.int("Producto")?;
    let mode: QuantityMode = args.parse("Modo")?;
    let cantidad = args.int("Cantidad")?;
    let precio_venta = args.money("Precio venta")?;
    let costo = args.money("Costo")?;
    let item = shell.product(id_producto).await?;

    let form = StockUpdateForm {
        action: UpdateAction::Ambos,
        mode,
        cantidad,
        precio_venta,
        costo,
        nota: args.rest(),
    };
    let calls = shell.pos().stock().update(&item, &form).await?;
    debug!(id_producto, calls, "Combined update sent");
    changed(shell, id_producto, format!("{} actualizado.", item.nombre)).await
}

async fn set_active(shell: &mut Shell, args: &mut Args, activo: bool) -> CommandResult {
    let id_producto = args.int("Producto")?;
    let item = shell.product(id_producto).await?;
    if !shell
        .pos()
        .stock()
        .set_active(&item, activo, shell.prompter())
        .await?
    {
        return Ok(Reply::Nothing);
    }
    let estado = if activo { "reactivado" } else { "desactivado" };
    changed(shell, id_producto, format!("{} {estado}.", item.nombre)).await
}

/// `merma <id> <cantidad> <motivo> [observación…]`, recorded under the
/// logged-in user.
async fn merma(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let id_producto = args.int("Producto")?;
    let cantidad = args.int("Cantidad")?;
    let motivo: MermaMotivo = args.parse("Motivo")?;
    let observacion = args.rest();
    let id_usuario = shell.user_id().await?;

    shell
        .pos()
        .stock()
        .register_merma(id_producto, cantidad, motivo, observacion.as_deref(), id_usuario)
        .await?;
    changed(
        shell,
        id_producto,
        format!("Merma registrada: {cantidad} ({}).", motivo.label()),
    )
    .await
}

/// `reposicion-modo <id> <unitario|cajon> [factor]`
async fn replenish_mode(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let id_producto = args.int("Producto")?;
    let modo: ReplenishMode = args.parse("Modo de reposición")?;
    let factor = args.opt_int("Factor")?.unwrap_or_else(|| default_factor(modo));

    shell
        .pos()
        .stock()
        .update_replenish(id_producto, modo, factor)
        .await?;
    changed(shell, id_producto, format!("Reposición de #{id_producto}: {modo}.")).await
}

async fn history(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let id_producto = args.int("Producto")?;
    let item = shell.product(id_producto).await?;
    let events = shell.pos().stock().history(id_producto).await?;
    text(render::timeline(&item, &events))
}

// =============================================================================
// Purchases
// =============================================================================

/// `compra <id> <cantidad> <costo_unitario> [mantener] [referencia…]`
///
/// Without `mantener` the product cost becomes the purchase cost.
async fn unit_purchase(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let id_producto = args.int("Producto")?;
    let cantidad = args.int("Cantidad")?;
    let costo_unitario = args.money("Costo unitario")?;
    let mantener_costo = args.flag("mantener");
    let referencia = args.rest();
    let item = shell.product(id_producto).await?;

    shell
        .pos()
        .stock()
        .register_unit_purchase(&item, cantidad, costo_unitario, referencia.as_deref(), mantener_costo)
        .await?;
    changed(
        shell,
        id_producto,
        format!("Compra registrada: {cantidad} de {}.", item.nombre),
    )
    .await
}

/// `compra-cajon <id> <MAPLE|CAJON> <cantidad> <costo_total>`
///
/// ## User Workflow
/// ```text
/// /admin/compras> compra-cajon 12 CAJON 2 48000
/// ┌ Compra por cajón ──────────────────────
/// │ 2 CAJON por $ 48.000: ingresan 24 maples a $ 2.000 c/u.
/// └ Registrar (s/N): s
/// [ok] Compra registrada: 24 maples.
/// ```
async fn crate_purchase(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let id_producto = args.int("Producto")?;
    let unidad: PurchaseUnit = args.parse("Unidad")?;
    let cantidad = args.int("Cantidad")?;
    let costo_total = args.money("Costo total")?;
    shell.product(id_producto).await?;

    let preview = preview_crate_purchase(unidad, cantidad, costo_total);
    let request = ConfirmRequest::new(
        "Compra por cajón",
        render::crate_preview(unidad, cantidad, costo_total, &preview),
    )
    .with_label("Registrar");
    if !shell.prompter().confirm(&request).await {
        return Ok(Reply::Nothing);
    }

    shell
        .pos()
        .stock()
        .register_crate_purchase(id_producto, unidad, cantidad, costo_total)
        .await?;
    changed(
        shell,
        id_producto,
        format!("Compra registrada: {} maples.", preview.maples),
    )
    .await
}

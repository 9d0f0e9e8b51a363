//! # Promotion Commands
//!
//! Browsing and applying combos from the sale screen, and building or
//! retiring them from `/admin/promociones`.
//!
//! ## Building a Combo
//! ```text
//! /admin/promociones> combo-item 12          ◄── toggles Maple blanco (x1)
//! /admin/promociones> combo-item 15 2        ◄── Media docena x2
//! ── Nueva promo ───────────────────────────
//!    12  Maple blanco            x1
//!    15  Media docena            x2
//! Total sugerido: $ 5.900
//! /admin/promociones> combo-crear 5500 Desayuno completo
//! [ok] Promo #4 creada.
//! ```

use huevo_client::Notice;
use huevo_core::promo::ComboDetail;

use super::sale::cart_reply;
use super::{text, unknown, Args, CommandResult, Reply, Shell};
use crate::error::ApiError;
use crate::render;

pub async fn run(shell: &mut Shell, name: &str, args: &mut Args) -> CommandResult {
    match name {
        "promos" => list(shell, true).await,
        "promo" => detail(shell, args).await,
        "aplicar" => apply(shell, args).await,
        "combos" => list(shell, false).await,
        "combo-item" => draft_item(shell, args).await,
        "combo-ver" => show_draft(shell).await,
        "combo-crear" => create(shell, args).await,
        "combo-borrar" => delete(shell, args).await,
        other => Err(unknown(other)),
    }
}

async fn list(shell: &mut Shell, solo_activos: bool) -> CommandResult {
    let rows = shell.pos().promo().list(solo_activos).await?;
    text(render::combos(&rows))
}

async fn fetch_detail(shell: &Shell, args: &mut Args) -> Result<ComboDetail, ApiError> {
    let id_combo = args.int("Promo")?;
    Ok(shell.pos().promo().detail(id_combo).await?)
}

async fn detail(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let detail = fetch_detail(shell, args).await?;
    text(render::combo_detail(&detail))
}

/// `aplicar <id_combo> [precio]`: the price defaults to the pack price, or
/// the larger of minimum and suggested total when the pack has none.
async fn apply(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let detail = fetch_detail(shell, args).await?;
    let precio = args.opt_money("Precio")?;

    let pos = shell.pos();
    let result = pos.promo().apply(pos.sale(), &detail, precio).await;
    if result.is_ok() {
        shell.notify(Notice::success(format!("Promo «{}» aplicada.", detail.combo.nombre)));
    }
    cart_reply(shell, result.map(drop)).await
}

/// `combo-item <id_producto> [cantidad]`
async fn draft_item(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let id_producto = args.int("Producto")?;
    let cantidad = args.opt_int("Cantidad")?;
    shell.product(id_producto).await?;

    let combo = &mut shell.workspace_mut().combo;
    match cantidad {
        Some(cantidad) => combo.set_quantity(id_producto, cantidad),
        None => combo.toggle(id_producto),
    }
    show_draft(shell).await
}

async fn show_draft(shell: &mut Shell) -> CommandResult {
    let items = shell.workspace().combo.items();
    let mut lines = Vec::with_capacity(items.len());
    for item in items {
        let nombre = shell.product(item.id_producto).await?.nombre;
        lines.push((item.id_producto, nombre, item.cantidad));
    }
    text(render::combo_draft(
        &lines,
        shell.workspace().combo_suggested_total(),
    ))
}

/// `combo-crear <precio_pack> <nombre…>`
async fn create(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let precio_pack = args.money("Precio pack")?;
    let nombre = args.rest().unwrap_or_default();

    let draft = shell.workspace().combo.clone();
    let id_combo = shell.pos().promo().create(&nombre, precio_pack, &draft).await?;
    shell.workspace_mut().combo = Default::default();
    shell.notify(Notice::success(format!("Promo #{id_combo} creada.")));
    list(shell, false).await
}

/// `combo-borrar <id_combo>`: soft delete after confirmation.
async fn delete(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let id_combo = args.int("Promo")?;
    let rows = shell.pos().promo().list(false).await?;
    let row = rows
        .iter()
        .find(|row| row.id_combo == id_combo)
        .ok_or_else(|| ApiError::not_found("Promo", id_combo))?;

    if !shell.pos().promo().delete(row, shell.prompter()).await? {
        return Ok(Reply::Nothing);
    }
    shell.notify(Notice::success(format!("Promo «{}» desactivada.", row.nombre)));
    list(shell, false).await
}

//! # Sale Commands
//!
//! The checkout screen: product search, cart edits, payment and today's
//! history. Every cart edit answers with the cart as the backend reports it.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  buscar maple ──► agregar 12 2 ──► (venta_iniciar on first add)         │
//! │                        │                                                │
//! │                        ▼                                                │
//! │             cantidad / quitar / aplicar                                 │
//! │                        │  each edit re-reads venta_listar               │
//! │                        ▼                                                │
//! │  cobrar efectivo 5000 debito ──► one missing amount = remaining total   │
//! │                        │                                                │
//! │                        ▼                                                │
//! │  "Venta #42 cobrada" ──► nueva (or the next `agregar`)                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use huevo_client::{ClientError, Notice};
use huevo_core::validation::{optional_text, parse_money};
use huevo_core::sale::Payment;
use huevo_core::{Money, PaymentMethod, ValidationError};

use super::{text, unknown, Args, CommandResult, Reply, Shell};
use crate::error::ApiError;
use crate::render;

pub async fn run(shell: &mut Shell, name: &str, args: &mut Args) -> CommandResult {
    match name {
        "buscar" => search(shell, args).await,
        "agregar" => add(shell, args).await,
        "cantidad" => set_quantity(shell, args).await,
        "quitar" => remove(shell, args).await,
        "carrito" => show_cart(shell).await,
        "cobrar" => charge(shell, args).await,
        "nueva" => next_sale(shell).await,
        "cancelar" => cancel(shell).await,
        "historial" => history(shell).await,
        other => Err(unknown(other)),
    }
}

async fn search(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let q = optional_text(args.rest().as_deref());
    let items = shell.pos().sale().search_products(q).await?;
    shell.workspace_mut().remember(&items);
    text(render::products("Productos", &items))
}

/// `agregar <id_producto> [cantidad]`
///
/// ## User Workflow
/// ```text
/// /ventas> agregar 12 2
/// ── Venta #42 ──────────────────────────
///  item  producto                 cant      precio    subtotal
///     1  Maple blanco                2     $ 3.500     $ 7.000
///                                         TOTAL     $ 7.000
/// ```
async fn add(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let id_producto = args.int("Producto")?;
    let cantidad = args.opt_int("Cantidad")?.unwrap_or(1);
    let result = shell.pos().sale().add_item(id_producto, cantidad).await;
    cart_reply(shell, result.map(drop)).await
}

async fn set_quantity(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let id_item = args.int("Item")?;
    let cantidad = args.int("Cantidad")?;
    let result = shell.pos().sale().set_quantity(id_item, cantidad).await;
    cart_reply(shell, result.map(drop)).await
}

async fn remove(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let id_item = args.int("Item")?;
    let result = shell.pos().sale().remove_item(id_item).await;
    cart_reply(shell, result.map(drop)).await
}

/// Re-reads the cart of the draft, if any.
async fn show_cart(shell: &mut Shell) -> CommandResult {
    let sale = shell.pos().sale();
    let result = if sale.state().await.id_venta().is_some() {
        sale.refresh().await.map(drop)
    } else {
        Ok(())
    };
    cart_reply(shell, result).await
}

/// The cart as it stands after an edit. A failed edit still shows the cart,
/// marked stale when the re-read failed too.
pub(super) async fn cart_reply(shell: &Shell, result: Result<(), ClientError>) -> CommandResult {
    if let Err(e) = result {
        shell.notify(ApiError::from(e).notice());
    }
    let sale = shell.pos().sale();
    text(render::cart(&sale.state().await, sale.is_stale()))
}

/// `cobrar <medio[:ref]> [monto] [<medio[:ref]> <monto>]`
///
/// One payment may leave its amount out; it takes what remains of the total.
///
/// ## User Workflow
/// ```text
/// TOTAL $ 7.000
/// /ventas> cobrar efectivo 5000 transferencia:op-981
///            └─ efectivo $ 5.000, transferencia $ 2.000 (ref op-981)
/// [ok] Venta #42 cobrada: $ 7.000
/// ```
async fn charge(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let entries = payment_entries(args)?;
    let sale = shell.pos().sale();
    let total = sale
        .state()
        .await
        .cart()
        .map(|cart| cart.total)
        .unwrap_or_default();
    let pagos = fill_payments(entries, total)?;

    let id_venta = sale.state().await.id_venta();
    let cobrado = sale.finalize(pagos).await?;
    let id = id_venta.map(|id| format!(" #{id}")).unwrap_or_default();
    shell.notify(Notice::success(format!("Venta{id} cobrada: {cobrado}")));
    text(render::cart(&sale.state().await, sale.is_stale()))
}

type PaymentEntry = (PaymentMethod, Option<String>, Option<Money>);

fn payment_entries(args: &mut Args) -> Result<Vec<PaymentEntry>, ApiError> {
    let mut entries = Vec::new();
    while let Some(token) = args.opt() {
        let (medio, referencia) = match token.split_once(':') {
            Some((medio, referencia)) => (medio.to_string(), optional_text(Some(referencia))),
            None => (token, None),
        };
        let medio: PaymentMethod = medio.parse()?;
        let amount_follows = args
            .peek()
            .and_then(|next| next.split(':').next())
            .is_some_and(|next| next.parse::<PaymentMethod>().is_err());
        let monto = if amount_follows {
            Some(parse_money("Monto", &args.text("Monto")?)?)
        } else {
            None
        };
        entries.push((medio, referencia, monto));
    }
    if entries.is_empty() {
        return Err(ApiError::usage(
            "Indicá al menos un medio de pago: cobrar <medio> [monto]",
        ));
    }
    Ok(entries)
}

fn fill_payments(entries: Vec<PaymentEntry>, total: Money) -> Result<Vec<Payment>, ApiError> {
    let missing = entries.iter().filter(|(_, _, monto)| monto.is_none()).count();
    if missing > 1 {
        return Err(ValidationError::Required {
            field: "Monto".to_string(),
        }
        .into());
    }
    let remainder = Money::checked_sum(entries.iter().filter_map(|(_, _, monto)| *monto))
        .and_then(|declared| total.checked_sub(declared))
        .ok_or_else(|| ValidationError::Overflow {
            field: "Monto".to_string(),
        })?;

    Ok(entries
        .into_iter()
        .map(|(medio, referencia, monto)| {
            Payment::new(medio, monto.unwrap_or(remainder)).with_referencia(referencia)
        })
        .collect())
}

async fn next_sale(shell: &mut Shell) -> CommandResult {
    let sale = shell.pos().sale();
    sale.acknowledge().await?;
    text(render::cart(&sale.state().await, sale.is_stale()))
}

async fn cancel(shell: &mut Shell) -> CommandResult {
    let sale = shell.pos().sale();
    if sale.cancel(shell.prompter()).await? {
        shell.notify(Notice::success("Venta cancelada."));
        text(render::cart(&sale.state().await, sale.is_stale()))
    } else {
        Ok(Reply::Nothing)
    }
}

async fn history(shell: &mut Shell) -> CommandResult {
    let groups = shell.pos().sale().today_history().await?;
    text(render::history(&groups))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::Reply;
    use super::*;
    use huevo_client::NoticeLevel;
    use huevo_core::session::Role;
    use serde_json::json;

    fn cart_json(cantidad: i64) -> serde_json::Value {
        json!({
            "lineas": [{
                "id_item": 1,
                "id_producto": 12,
                "nombre": "Maple blanco",
                "cantidad": cantidad,
                "precio_unitario": 3500,
                "subtotal": 3500 * cantidad
            }],
            "total": 3500 * cantidad
        })
    }

    async fn drafting() -> Harness {
        let mut h = harness(Some(Role::Operador), true).await;
        h.backend.reply("caja_esta_abierta", json!(true));
        h.backend.reply("venta_iniciar", json!(42));
        h.backend.reply("venta_agregar_item", json!(null));
        h.backend.reply("venta_listar", cart_json(2));
        h.text("agregar 12 2").await;
        h
    }

    #[test]
    fn test_fill_payments_remainder() {
        let entries = vec![
            (PaymentMethod::Efectivo, None, Some(Money::from_pesos(5000))),
            (PaymentMethod::Transferencia, Some("op-1".to_string()), None),
        ];
        let pagos = fill_payments(entries, Money::from_pesos(7000)).unwrap();
        assert_eq!(pagos[1].monto, Money::from_pesos(2000));
        assert_eq!(pagos[1].referencia.as_deref(), Some("op-1"));

        let two_missing = vec![
            (PaymentMethod::Efectivo, None, None),
            (PaymentMethod::Debito, None, None),
        ];
        assert!(fill_payments(two_missing, Money::from_pesos(7000)).is_err());
    }

    #[test]
    fn test_fill_payments_huge_amount_is_rejected() {
        let entries = vec![
            (PaymentMethod::Efectivo, None, Some(Money::from_pesos(i64::MAX))),
            (PaymentMethod::Debito, None, Some(Money::from_pesos(1))),
        ];
        let err = fill_payments(entries, Money::from_pesos(7000)).unwrap_err();
        assert_eq!(err.message, "Monto: valor fuera de rango.");

        let remainder_overflows = vec![
            (PaymentMethod::Efectivo, None, Some(Money::from_pesos(i64::MAX))),
            (PaymentMethod::Debito, None, None),
        ];
        assert!(fill_payments(remainder_overflows, Money::from_pesos(-7000)).is_err());
    }

    #[test]
    fn test_payment_entries_parse() {
        let mut args = Args::new(
            ["efectivo", "5000", "transferencia:op-981"]
                .map(String::from)
                .to_vec(),
        );
        let entries = payment_entries(&mut args).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].2, Some(Money::from_pesos(5000)));
        assert_eq!(entries[1].0, PaymentMethod::Transferencia);
        assert_eq!(entries[1].1.as_deref(), Some("op-981"));
        assert_eq!(entries[1].2, None);

        assert!(payment_entries(&mut Args::new(vec![])).is_err());
        assert!(payment_entries(&mut Args::new(vec!["cheque".to_string()])).is_err());
    }

    #[tokio::test]
    async fn test_add_starts_draft_and_shows_cart() {
        let h = drafting().await;
        let calls = h.backend.calls_to("venta_agregar_item");
        assert_eq!(
            calls[0],
            json!({"input": {"id_venta": 42, "id_producto": 12, "cantidad": 2}})
        );
        assert_eq!(h.backend.calls_to("venta_iniciar").len(), 1);
    }

    #[tokio::test]
    async fn test_add_with_closed_caja_never_starts() {
        let mut h = harness(Some(Role::Operador), true).await;
        h.backend.reply("caja_esta_abierta", json!(false));
        assert_eq!(h.run("agregar 12").await, Reply::Text("Sin venta en curso.".to_string()));
        assert_eq!(h.last_notice().unwrap().message, "No hay caja abierta.");
        assert!(h.backend.calls_to("venta_iniciar").is_empty());
    }

    #[tokio::test]
    async fn test_charge_with_remainder() {
        let mut h = drafting().await;
        h.backend.reply("venta_finalizar", json!(null));

        let text = h.text("cobrar efectivo 5000 debito").await;
        assert!(text.contains("Venta #42 cobrada"));
        let args = &h.backend.calls_to("venta_finalizar")[0]["input"];
        assert_eq!(args["pagos"][1]["medio"], json!("debito"));
        assert_eq!(args["pagos"][1]["monto"], json!(2000));
        assert_eq!(h.last_notice().unwrap().level, NoticeLevel::Success);
    }

    #[tokio::test]
    async fn test_charge_mismatch_never_calls() {
        let mut h = drafting().await;
        assert_eq!(h.run("cobrar efectivo 5000").await, Reply::Nothing);
        let notice = h.last_notice().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert!(notice.message.contains("no coincide"));
        assert!(h.backend.calls_to("venta_finalizar").is_empty());
    }

    #[tokio::test]
    async fn test_failed_refresh_marks_cart_stale() {
        let mut h = drafting().await;
        h.backend.fail("venta_listar", "timeout");
        let text = h.text("carrito").await;
        assert!(text.contains("Venta #42"));
        assert!(text.contains("desactualizado"));
        assert_eq!(h.last_notice().unwrap().level, NoticeLevel::Error);

        h.backend.reply("venta_listar", cart_json(3));
        let text = h.text("carrito").await;
        assert!(!text.contains("desactualizado"));
    }

    #[tokio::test]
    async fn test_cancel_confirmed_clears_sale() {
        let mut h = drafting().await;
        h.backend.reply("venta_cancelar", json!(null));
        assert_eq!(h.text("cancelar").await, "Sin venta en curso.");
        assert_eq!(
            h.backend.calls_to("venta_cancelar")[0],
            json!({"input": {"id_venta": 42}})
        );
    }

    #[tokio::test]
    async fn test_history_groups_lines() {
        let mut h = harness(Some(Role::Operador), true).await;
        h.backend.reply("caja_esta_abierta", json!(true));
        h.backend.reply(
            "historial_ventas_hoy",
            json!([
                {"id_venta": 9, "hora": "10:02", "producto": "Maple blanco", "cantidad": 1,
                 "precio_unitario": 3500, "subtotal": 3500, "total_venta": 4700,
                 "pagos_detalle": "efectivo: 4700"},
                {"id_venta": 9, "hora": "10:02", "producto": "Media docena", "cantidad": 1,
                 "precio_unitario": 1200, "subtotal": 1200, "total_venta": 4700}
            ]),
        );
        let text = h.text("historial").await;
        assert!(text.contains("#9 · 10:02 · $ 4.700"));
        assert!(text.contains("Media docena"));
    }
}

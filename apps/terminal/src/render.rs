//! # Screen Rendering
//!
//! Plain-text tables for every screen. Functions here only format; they
//! never call the backend and never decide anything.
//!
//! ```text
//! ── Venta #42 ──────────────────────────────────────────
//!  item  producto                  cant      precio    subtotal
//!     7  Maple blanco x30             2    $ 4.500     $ 9.000
//!     8  Maple color x30              1    $ 5.200     $ 5.200
//!                                               TOTAL  $ 14.200
//! ```

use std::fmt::Write as _;

use huevo_client::{ConfirmRequest, Notice};
use huevo_core::caja::{CajaState, CajaSummary};
use huevo_core::ledger::{short_timestamp, ExpenseRow, PayrollRow};
use huevo_core::promo::{ComboDetail, ComboListRow};
use huevo_core::report::{
    format_pct, AdminDayHistory, AdminHomeSummary, BusinessProfitReport, DateRange, PnlReport,
    ProductProfitReport, ReplenishRow, SaleAdminDetail, SalesAdminPage, StockReport,
};
use huevo_core::sale::{Cart, HistoryGroup, SaleState};
use huevo_core::session::{Route, Session};
use huevo_core::stock::{CratePurchasePreview, PurchaseUnit, TimelineEvent};
use huevo_core::{Money, StockItem, UserOption};

const RULE_WIDTH: usize = 60;

fn heading(out: &mut String, title: &str) {
    let used = title.chars().count() + 4;
    let fill = RULE_WIDTH.saturating_sub(used);
    let _ = writeln!(out, "── {title} {}", "─".repeat(fill));
}

/// Cuts `text` to `width` characters so columns stay aligned.
fn fit(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}

fn finish(mut out: String) -> String {
    while out.ends_with('\n') {
        out.pop();
    }
    out
}

// =============================================================================
// Shell chrome
// =============================================================================

pub fn notice(notice: &Notice) -> String {
    format!("[{}] {}", notice.level, notice.message)
}

pub fn confirm_request(request: &ConfirmRequest) -> String {
    let mut out = String::new();
    let marker = if request.danger { "!" } else { "┌" };
    let _ = writeln!(out, "{marker} {}", request.title);
    for line in request.message.lines() {
        let _ = writeln!(out, "│ {line}");
    }
    let _ = write!(out, "└ {} (s/N):", request.confirm_label);
    out
}

pub fn welcome(store: &str, route: Route, session: &Session) -> String {
    let mut out = String::new();
    heading(&mut out, store);
    match (session.usuario_id, session.rol) {
        (Some(id), Some(rol)) => {
            let _ = writeln!(out, "Sesión: usuario #{id} ({rol})");
        }
        _ => {
            let _ = writeln!(out, "Sin sesión. Usá `login <usuario> <contraseña>`.");
        }
    }
    let _ = writeln!(out, "Pantalla: {route}. `ayuda` lista los comandos.");
    finish(out)
}

pub fn whoami(session: &Session, route: Route) -> String {
    match (session.usuario_id, session.rol) {
        (Some(id), Some(rol)) => format!("Usuario #{id} · {rol} · {route}"),
        _ => format!("Sin sesión · {route}"),
    }
}

pub fn users(title: &str, users: &[UserOption]) -> String {
    let mut out = String::new();
    heading(&mut out, title);
    if users.is_empty() {
        let _ = writeln!(out, "Sin usuarios.");
    }
    for u in users {
        let _ = writeln!(out, "{:>5}  {}", u.id_usuario, u.nombre);
    }
    finish(out)
}

// =============================================================================
// Sale screen
// =============================================================================

pub fn caja_status(state: CajaState) -> String {
    match state {
        CajaState::Open => format!("● {state}"),
        CajaState::Closed => format!("○ {state}. Usá `abrir` para empezar a vender."),
    }
}

pub fn caja_summary(summary: &CajaSummary) -> String {
    let mut out = String::new();
    heading(&mut out, "Resumen del día");
    let _ = writeln!(
        out,
        "Cajas: {} · Ventas: {} · Total: {}",
        summary.cantidad_cajas, summary.cantidad_ventas, summary.total_general
    );
    if let (Some(min), Some(max)) = (&summary.fecha_min, &summary.fecha_max) {
        let _ = writeln!(out, "Desde {} hasta {}", short_timestamp(min), short_timestamp(max));
    }
    for medio in &summary.por_medio {
        let _ = writeln!(out, "  {:<16}{:>14}", medio.label(), medio.total_medio.to_string());
    }
    finish(out)
}

pub fn cart(state: &SaleState, stale: bool) -> String {
    let mut out = String::new();
    match state {
        SaleState::NoSale => {
            let _ = writeln!(out, "Sin venta en curso.");
        }
        SaleState::Finalized { id_venta, total } => {
            let _ = writeln!(out, "Venta #{id_venta} cobrada: {total}. `nueva` para seguir.");
        }
        SaleState::Cancelled { id_venta } => {
            let _ = writeln!(out, "Venta #{id_venta} cancelada.");
        }
        SaleState::Drafting { id_venta, cart } => {
            heading(&mut out, &format!("Venta #{id_venta}"));
            cart_lines(&mut out, cart);
        }
    }
    if stale {
        let _ = writeln!(out, "(carrito desactualizado: `carrito` para reintentar)");
    }
    finish(out)
}

fn cart_lines(out: &mut String, cart: &Cart) {
    if cart.is_empty() {
        let _ = writeln!(out, "Carrito vacío.");
        return;
    }
    let _ = writeln!(
        out,
        "{:>5}  {:<24}{:>6}{:>12}{:>12}",
        "item", "producto", "cant", "precio", "subtotal"
    );
    for line in &cart.lineas {
        let _ = writeln!(
            out,
            "{:>5}  {:<24}{:>6}{:>12}{:>12}",
            line.id_item,
            fit(&line.nombre, 24),
            line.cantidad,
            line.precio_unitario.to_string(),
            line.subtotal.to_string()
        );
    }
    let _ = writeln!(out, "{:>47}{:>12}", "TOTAL", cart.total.to_string());
}

pub fn products(title: &str, items: &[StockItem]) -> String {
    let mut out = String::new();
    heading(&mut out, title);
    if items.is_empty() {
        let _ = writeln!(out, "Sin productos.");
        return finish(out);
    }
    let _ = writeln!(
        out,
        "{:>5}  {:<8}{:<24}{:>7}{:>12}{:>12}",
        "id", "código", "nombre", "stock", "venta", "costo"
    );
    for item in items {
        let flag = if item.activo { "" } else { "  (inactivo)" };
        let _ = writeln!(
            out,
            "{:>5}  {:<8}{:<24}{:>7}{:>12}{:>12}{flag}",
            item.id_producto,
            fit(&item.codigo, 8),
            fit(&item.nombre, 24),
            item.stock_actual,
            item.precio_venta_actual.to_string(),
            item.costo_actual.to_string()
        );
    }
    finish(out)
}

pub fn history(groups: &[HistoryGroup]) -> String {
    let mut out = String::new();
    heading(&mut out, "Ventas de hoy");
    if groups.is_empty() {
        let _ = writeln!(out, "Todavía no hay ventas.");
    }
    for group in groups {
        let pagos = group.pagos_detalle.as_deref().unwrap_or("");
        let _ = writeln!(
            out,
            "#{} · {} · {} {pagos}",
            group.id_venta, group.hora, group.total_venta
        );
        for item in &group.items {
            let _ = writeln!(
                out,
                "    {:<24}{:>4} x {:>10}",
                fit(&item.producto, 24),
                item.cantidad,
                item.precio_unitario.to_string()
            );
        }
    }
    finish(out)
}

// =============================================================================
// Stock
// =============================================================================

pub fn timeline(item: &StockItem, events: &[TimelineEvent]) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("Historial de {}", item.nombre));
    if events.is_empty() {
        let _ = writeln!(out, "Sin movimientos.");
    }
    for event in events {
        let _ = writeln!(out, "{}  [{}] {}", event.fecha, event.t.label(), event.desc);
    }
    finish(out)
}

pub fn crate_preview(unidad: PurchaseUnit, cantidad: i64, costo_total: Money, preview: &CratePurchasePreview) -> String {
    format!(
        "{cantidad} {unidad} por {costo_total}: ingresan {} maples a {} c/u.",
        preview.maples, preview.costo_unitario
    )
}

// =============================================================================
// Promotions
// =============================================================================

pub fn combos(rows: &[ComboListRow]) -> String {
    let mut out = String::new();
    heading(&mut out, "Promos");
    if rows.is_empty() {
        let _ = writeln!(out, "Sin promos.");
    }
    for row in rows {
        let flag = if row.activo { "" } else { " (inactiva)" };
        let _ = writeln!(
            out,
            "{:>4}  {:<24}{:>12}  {}{flag}",
            row.id_combo,
            fit(&row.nombre, 24),
            row.precio_pack.to_string(),
            row.resumen
        );
    }
    finish(out)
}

pub fn combo_detail(detail: &ComboDetail) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("Promo #{} {}", detail.combo.id_combo, detail.combo.nombre));
    for item in &detail.items {
        let _ = writeln!(
            out,
            "  {:<24}{:>4} x {:>10} = {:>10}",
            fit(&item.nombre, 24),
            item.cantidad,
            item.precio_unitario.to_string(),
            item.subtotal_sugerido.to_string()
        );
    }
    let _ = writeln!(out, "Total sugerido: {}", detail.total_sugerido);
    if detail.combo.precio_min_total.is_positive() {
        let _ = writeln!(out, "Precio mínimo: {}", detail.combo.precio_min_total);
    }
    let _ = writeln!(out, "Precio a cobrar: {}", detail.default_price());
    finish(out)
}

/// `lines` are `(id, nombre, cantidad)` of the draft being built.
pub fn combo_draft(lines: &[(i64, String, i64)], suggested: Money) -> String {
    let mut out = String::new();
    heading(&mut out, "Nueva promo");
    if lines.is_empty() {
        let _ = writeln!(out, "Sin productos. `combo-item <id> [cantidad]` para sumar.");
        return finish(out);
    }
    for (id, nombre, cantidad) in lines {
        let _ = writeln!(out, "{id:>5}  {:<24}x{cantidad}", fit(nombre, 24));
    }
    let _ = writeln!(out, "Total sugerido: {suggested}");
    finish(out)
}

// =============================================================================
// Reports
// =============================================================================

pub fn admin_home(summary: &AdminHomeSummary) -> String {
    let mut out = String::new();
    heading(&mut out, "Inicio");
    let _ = writeln!(
        out,
        "Ventas hoy: {} ({} tickets)",
        summary.ventas_hoy_total, summary.ventas_hoy_cant
    );
    let _ = writeln!(out, "Resultado del mes: {}", summary.resultado_mes_neto);
    let _ = writeln!(out, "Productos con stock crítico: {}", summary.stock_critico_cant);
    if let Some(top) = &summary.top_producto_hoy {
        let _ = writeln!(
            out,
            "Más vendido hoy: {} ({} u, {})",
            top.nombre, top.cantidad, top.recaudado
        );
    }
    for alerta in &summary.alertas {
        let _ = writeln!(out, "[{}] {}", alerta.nivel, alerta.texto);
    }
    finish(out)
}

pub fn pnl(report: &PnlReport) -> String {
    let t = &report.totales;
    let mut out = String::new();
    heading(
        &mut out,
        &format!("Estado de resultados {} → {}", report.meta.desde, report.meta.hasta),
    );
    let _ = writeln!(out, "{:<28}{:>14}", "Ventas brutas", t.ventas_brutas.to_string());
    let _ = writeln!(out, "{:<28}{:>14}", "Costo de mercadería", t.costo_mercaderia_vendida.to_string());
    let _ = writeln!(
        out,
        "{:<28}{:>14}  {}",
        "Margen bruto",
        t.margen_bruto.to_string(),
        format_pct(t.margen_bruto_pct)
    );
    let _ = writeln!(out, "{:<28}{:>14}", "Ingresos extra", t.ingresos_extra.to_string());
    let _ = writeln!(out, "{:<28}{:>14}", "Egresos operativos", t.egresos_operativos.to_string());
    let _ = writeln!(
        out,
        "{:<28}{:>14}  {}",
        "Resultado neto",
        t.resultado_neto.to_string(),
        format_pct(t.resultado_neto_pct)
    );

    if report.periodos.len() > 1 {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{:<12}{:>12}{:>12}{:>12}{:>12}",
            "período", "ventas", "costo", "egresos", "neto"
        );
        for p in &report.periodos {
            let _ = writeln!(
                out,
                "{:<12}{:>12}{:>12}{:>12}{:>12}",
                fit(&p.periodo_key, 12),
                p.ventas_brutas.to_string(),
                p.costo_mercaderia_vendida.to_string(),
                p.egresos_operativos.to_string(),
                p.resultado_neto.to_string()
            );
        }
    }

    if !report.gastos_por_categoria.is_empty() {
        let _ = writeln!(out);
        for g in &report.gastos_por_categoria {
            let _ = writeln!(out, "  {:<20}{:>14}", g.categoria, g.neto.to_string());
        }
    }
    if let Some(medios) = &report.ingresos_por_medio_pago {
        let _ = writeln!(out);
        for m in medios {
            let _ = writeln!(out, "  {:<20}{:>14}", m.medio, m.monto.to_string());
        }
    }
    finish(out)
}

pub fn product_profit(report: &ProductProfitReport) -> String {
    let mut out = String::new();
    heading(
        &mut out,
        &format!("Rentabilidad {} → {}", report.fecha_desde, report.fecha_hasta),
    );
    let _ = writeln!(
        out,
        "Ventas {} · Costos {} · Ganancia {} · Margen {:.1} %",
        report.total_ventas, report.total_costos, report.ganancia_bruta, report.margen_pct
    );
    let _ = writeln!(
        out,
        "{:<24}{:>6}{:>12}{:>12}{:>12}",
        "producto", "cant", "ingreso", "costo", "ganancia"
    );
    for p in &report.productos {
        let _ = writeln!(
            out,
            "{:<24}{:>6}{:>12}{:>12}{:>12}",
            fit(&p.nombre, 24),
            p.cantidad_vendida,
            p.ingreso_total.to_string(),
            p.costo_total.to_string(),
            p.ganancia.to_string()
        );
    }
    finish(out)
}

/// Reading of the net margin: healthy from 20 %, watch from 5 %.
pub fn business_reading(margen_neto_pct: f64) -> (&'static str, &'static str) {
    if margen_neto_pct >= 20.0 {
        (
            "Rentabilidad saludable",
            "El negocio genera ganancia de forma consistente.",
        )
    } else if margen_neto_pct >= 5.0 {
        (
            "Atención en costos",
            "La ganancia existe, pero el margen está bajando.",
        )
    } else {
        (
            "Riesgo operativo",
            "Los gastos están comprometiendo la ganancia.",
        )
    }
}

pub fn business_profit(report: &BusinessProfitReport) -> String {
    let mut out = String::new();
    heading(
        &mut out,
        &format!("Rentabilidad del negocio {} → {}", report.fecha_desde, report.fecha_hasta),
    );
    let _ = writeln!(out, "{:<28}{:>14}", "Ventas brutas", report.ventas_brutas.to_string());
    let _ = writeln!(out, "{:<28}{:>14}", "Costo de mercadería", report.cogs.to_string());
    let _ = writeln!(out, "{:<28}{:>14}", "Gastos", report.gastos.to_string());
    let _ = writeln!(
        out,
        "{:<28}{:>14}  {:.1} %",
        "Rentabilidad neta",
        report.rentabilidad_neta.to_string(),
        report.margen_neto_pct
    );
    let _ = writeln!(
        out,
        "{:<28}{:>14}",
        "Mes anterior",
        report.rentabilidad_mes_anterior.to_string()
    );
    let (titulo, texto) = business_reading(report.margen_neto_pct);
    let _ = writeln!(out, "{titulo}: {texto}");

    if !report.tendencia_mensual.is_empty() {
        let _ = writeln!(out);
        for m in &report.tendencia_mensual {
            let _ = writeln!(
                out,
                "{:<9}{:>12}{:>12}{:>12}{:>12}",
                m.mes,
                m.ventas.to_string(),
                m.cogs.to_string(),
                m.gastos.to_string(),
                m.ganancia_neta.to_string()
            );
        }
    }
    finish(out)
}

pub fn stock_report(report: &StockReport) -> String {
    let mut out = String::new();
    heading(&mut out, "Reporte de stock");
    let _ = writeln!(
        out,
        "Inventario valorizado: {} · {} productos",
        report.total_inventario, report.cantidad_productos
    );
    let _ = writeln!(
        out,
        "{:<8}{:<22}{:>7}{:>12}{:>8}{:>9}  {}",
        "código", "nombre", "stock", "valor", "%", "rotación", "abc"
    );
    for p in &report.productos {
        let rotacion = p
            .rotacion_dias
            .map(|d| format!("{d:.1} d"))
            .unwrap_or_else(|| "—".to_string());
        let _ = writeln!(
            out,
            "{:<8}{:<22}{:>7}{:>12}{:>7.1}%{:>9}  {}{}",
            fit(&p.codigo_producto, 8),
            fit(&p.nombre, 22),
            p.stock_actual,
            p.valor_total.to_string(),
            p.porcentaje_valor,
            rotacion,
            p.clasificacion_abc.as_deref().unwrap_or("-"),
            p.riesgo
                .as_deref()
                .map(|r| format!(" ({r})"))
                .unwrap_or_default()
        );
    }
    finish(out)
}

pub fn replenishment(range: &DateRange, rows: &[ReplenishRow]) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("Reposición {range}"));
    if rows.is_empty() {
        let _ = writeln!(out, "Sin ventas en el período.");
    }
    for row in rows {
        let _ = writeln!(
            out,
            "{:<8}{:<24}{}",
            fit(&row.codigo_producto, 8),
            fit(&row.nombre, 24),
            row.sold_label()
        );
    }
    finish(out)
}

pub fn admin_day(day: &AdminDayHistory) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("Día {}", day.fecha));
    let _ = writeln!(
        out,
        "Total {} · {} ventas · ticket promedio {}",
        day.total_dia,
        day.cantidad_ventas,
        Money::from_pesos(day.promedio_ticket.round() as i64)
    );
    for caja in &day.cajas {
        let cerrada = caja
            .cerrada_en
            .as_deref()
            .map(short_timestamp)
            .unwrap_or("abierta");
        let _ = writeln!(
            out,
            "Caja #{} · {} · {} → {} · {} ventas · {}",
            caja.id_caja,
            caja.nombre_usuario,
            short_timestamp(&caja.abierta_en),
            cerrada,
            caja.cantidad_ventas,
            caja.total_caja
        );
    }
    for venta in &day.ventas {
        let _ = writeln!(
            out,
            "  #{:<6}{}  {:<14}{:>12}  {}",
            venta.id_venta,
            short_timestamp(&venta.fecha_hora),
            fit(&venta.usuario, 14),
            venta.total.to_string(),
            venta.estado
        );
    }
    finish(out)
}

pub fn sales_page(page: &SalesAdminPage) -> String {
    let mut out = String::new();
    let desde = page.offset as i64 + 1;
    let hasta = page.offset as i64 + page.items.len() as i64;
    heading(&mut out, &format!("Ventas {desde}-{hasta} de {}", page.total));
    for row in &page.items {
        let _ = writeln!(
            out,
            "#{:<6}{}  {:<12}{:>12}{:>12}{:>8}  {}",
            row.id_venta,
            short_timestamp(&row.fecha_hora),
            fit(&row.usuario, 12),
            row.total.to_string(),
            row.ganancia_bruta.to_string(),
            row.margen_pct
                .map(|m| format!("{m:.2}%"))
                .unwrap_or_else(|| "—".to_string()),
            row.estado
        );
    }
    if page.has_next() {
        let _ = writeln!(out, "`ventas-mas` para la página siguiente.");
    }
    finish(out)
}

pub fn sale_detail(detail: &SaleAdminDetail) -> String {
    let r = &detail.resumen;
    let mut out = String::new();
    heading(&mut out, &format!("Venta #{}", r.id_venta));
    let _ = writeln!(
        out,
        "{} · {} · caja #{} · {}",
        short_timestamp(&r.fecha_hora),
        r.usuario,
        r.id_caja,
        r.estado
    );
    for item in &detail.items {
        let _ = writeln!(
            out,
            "  {:<8}{:<22}{:>4} x {:>10}  costo {:>10}  ganancia {:>10}",
            fit(&item.codigo, 8),
            fit(&item.producto, 22),
            item.cantidad,
            item.precio_unitario.to_string(),
            item.costo_unitario_en_venta.to_string(),
            item.ganancia_linea.to_string()
        );
    }
    for pago in &detail.pagos {
        let referencia = pago.referencia.as_deref().unwrap_or("");
        let _ = writeln!(out, "  Pago {:<14}{:>12} {referencia}", pago.medio, pago.monto.to_string());
    }
    let margen = r
        .margen_pct
        .map(|m| format!("{m:.2}%"))
        .unwrap_or_else(|| "—".to_string());
    let _ = writeln!(
        out,
        "Total {} · Costo {} · Ganancia {} · Margen {margen}",
        r.total, r.costo_total, r.ganancia_bruta
    );
    finish(out)
}

// =============================================================================
// Ledger
// =============================================================================

pub fn expenses(period: &DateRange, rows: &[ExpenseRow], total: Money) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("Gastos {period}"));
    if rows.is_empty() {
        let _ = writeln!(out, "Sin gastos en el período.");
    }
    for row in rows {
        let _ = writeln!(
            out,
            "{}  {:<12}{:<26}{:>12}",
            short_timestamp(&row.fecha_hora),
            row.categoria,
            fit(row.descripcion.as_deref().unwrap_or(""), 26),
            row.monto.to_string()
        );
    }
    let _ = writeln!(out, "Total: {total}");
    finish(out)
}

pub fn payroll(period: &DateRange, rows: &[PayrollRow], total: Money) -> String {
    let mut out = String::new();
    heading(&mut out, &format!("Sueldos {period}"));
    if rows.is_empty() {
        let _ = writeln!(out, "Sin pagos en el período.");
    }
    for row in rows {
        let destino = row
            .usuario_destino_nombre
            .clone()
            .or_else(|| row.id_usuario_destino.map(|id| format!("#{id}")))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{}  {:<14}{:<24}{:>12}",
            short_timestamp(&row.fecha_hora),
            fit(&destino, 14),
            fit(&row.descripcion, 24),
            row.monto.to_string()
        );
    }
    let _ = writeln!(out, "Total: {total}");
    finish(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use huevo_core::sale::CartLine;

    #[test]
    fn test_cart_shows_lines_and_total() {
        let state = SaleState::Drafting {
            id_venta: 42,
            cart: Cart {
                lineas: vec![CartLine {
                    id_item: 7,
                    id_producto: 1,
                    nombre: "Maple blanco x30".into(),
                    cantidad: 2,
                    precio_unitario: Money::from_pesos(4500),
                    subtotal: Money::from_pesos(9000),
                }],
                total: Money::from_pesos(9000),
            },
        };
        let text = cart(&state, false);
        assert!(text.starts_with("── Venta #42"));
        assert!(text.contains("Maple blanco x30"));
        assert!(text.contains("$ 9.000"));
        assert!(!text.contains("desactualizado"));
        assert!(cart(&state, true).contains("desactualizado"));
    }

    #[test]
    fn test_fit_truncates_long_names() {
        assert_eq!(fit("Maple", 8), "Maple");
        assert_eq!(fit("Maple blanco extra", 8), "Maple b…");
    }

    #[test]
    fn test_business_reading_thresholds() {
        assert_eq!(business_reading(25.0).0, "Rentabilidad saludable");
        assert_eq!(business_reading(20.0).0, "Rentabilidad saludable");
        assert_eq!(business_reading(7.5).0, "Atención en costos");
        assert_eq!(business_reading(-3.0).0, "Riesgo operativo");
    }

    #[test]
    fn test_confirm_request_marks_danger() {
        let req = ConfirmRequest::new("Cancelar venta", "¿Seguro?\nSe descarta todo.")
            .with_label("Cancelar venta")
            .danger();
        let text = confirm_request(&req);
        assert!(text.starts_with("! Cancelar venta"));
        assert!(text.contains("│ Se descarta todo."));
        assert!(text.ends_with("└ Cancelar venta (s/N):"));
    }

    #[test]
    fn test_notice_prefix() {
        assert_eq!(notice(&Notice::success("Caja abierta.")), "[ok] Caja abierta.");
        assert_eq!(notice(&Notice::warning("Stock insuficiente.")), "[aviso] Stock insuficiente.");
    }
}

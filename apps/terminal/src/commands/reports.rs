//! # Report Commands
//!
//! Read-only admin screens. All of them share the period chosen with
//! `periodo` except the business profit view, which defaults to the
//! current month, and the sales list, which takes its own range.
//!
//! ## Period Filter
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  periodo hoy | esta_semana | este_mes | todo                            │
//! │  periodo 2026-10-01 2026-10-15   ──► Custom (desde ≤ hasta checked)     │
//! │  agrupar dia | semana | mes | total                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Workspace::report_filter ──► pnl, rentabilidad, reposicion             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use huevo_core::report::{
    first_day_of_month, last_day_of_month, DatePreset, DateRange, GroupBy, ReportFilter,
    SalesAdminQuery,
};
use huevo_core::validation::{parse_date, parse_int};
use huevo_core::PaymentMethod;

use super::{text, unknown, Args, CommandResult, Shell};
use crate::error::ApiError;
use crate::render;

/// Rows per page of the sales list.
const SALES_PAGE_SIZE: u32 = 200;

pub async fn run(shell: &mut Shell, name: &str, args: &mut Args) -> CommandResult {
    match name {
        "inicio" => home(shell).await,
        "periodo" => period(shell, args),
        "agrupar" => group_by(shell, args),
        "pnl" => pnl(shell, args).await,
        "rentabilidad" => product_profit(shell).await,
        "negocio" => business_profit(shell, args).await,
        "stock-reporte" => stock_report(shell, args).await,
        "reposicion" => replenishment(shell).await,
        "dia" => day(shell, args).await,
        "ventas" => sales(shell, args).await,
        "ventas-mas" => sales_next(shell).await,
        "venta" => sale_detail(shell, args).await,
        "operadores" => operators(shell).await,
        other => Err(unknown(other)),
    }
}

async fn home(shell: &mut Shell) -> CommandResult {
    let summary = shell.pos().reports().admin_home().await?;
    text(render::admin_home(&summary))
}

// =============================================================================
// Period Filter
// =============================================================================

fn group_label(group_by: GroupBy) -> &'static str {
    match group_by {
        GroupBy::Dia => "día",
        GroupBy::Semana => "semana",
        GroupBy::Mes => "mes",
        GroupBy::Total => "total",
    }
}

fn describe(filter: &ReportFilter) -> String {
    format!(
        "Período: {} → {} · agrupado por {}",
        filter.range.desde_str(),
        filter.range.hasta_str(),
        group_label(filter.group_by)
    )
}

/// `periodo <preset>` or `periodo <desde> <hasta>`
fn period(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let today = shell.clock().today();
    let first = args.text("Período")?;
    let filter = &mut shell.workspace_mut().report_filter;

    match parse_date("Desde", &first) {
        Ok(desde) => {
            let hasta = args.date("Hasta")?;
            filter.set_custom(desde, hasta)?;
        }
        Err(_) => {
            let preset: DatePreset = first.parse()?;
            filter.apply_preset(preset, today);
        }
    }
    text(describe(filter))
}

fn group_by(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let group_by: GroupBy = args.parse("Agrupar por")?;
    let filter = &mut shell.workspace_mut().report_filter;
    filter.group_by = group_by;
    text(describe(filter))
}

// =============================================================================
// Reports
// =============================================================================

/// `pnl [id_usuario]`
async fn pnl(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let id_usuario = args.opt_int("Usuario")?;
    let filter = shell.workspace().report_filter.clone();
    let report = shell.pos().reports().pnl(&filter, id_usuario).await?;
    text(render::pnl(&report))
}

async fn product_profit(shell: &mut Shell) -> CommandResult {
    let range = shell.workspace().report_filter.range;
    let report = shell.pos().reports().product_profit(&range).await?;
    text(render::product_profit(&report))
}

/// `negocio [desde hasta]`, the current month by default.
///
/// ## User Workflow
/// ```text
/// /admin/rentabilidad-negocio> negocio
/// ── Rentabilidad del negocio 2026-10-01 → 2026-10-31 ──
/// Rentabilidad neta             $ 412.000  23.4 %
/// Rentabilidad saludable: El negocio genera ganancia de forma consistente.
/// ```
async fn business_profit(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let range = if args.is_empty() {
        let today = shell.clock().today();
        DateRange::new(first_day_of_month(today), last_day_of_month(today))?
    } else {
        DateRange::new(args.date("Desde")?, args.date("Hasta")?)?
    };
    let report = shell.pos().reports().business_profit(&range).await?;
    text(render::business_profit(&report))
}

/// `stock-reporte [todos]`
async fn stock_report(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let solo_activos = !args.flag("todos");
    let report = shell.pos().reports().stock_report(solo_activos).await?;
    text(render::stock_report(&report))
}

async fn replenishment(shell: &mut Shell) -> CommandResult {
    let range = shell.workspace().report_filter.range;
    let rows = shell.pos().reports().replenishment(&range).await?;
    text(render::replenishment(&range, &rows))
}

// =============================================================================
// Sales History
// =============================================================================

/// `dia [fecha] [id_usuario]`
async fn day(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let fecha = match args.opt() {
        Some(raw) => parse_date("Fecha", &raw)?,
        None => shell.clock().today(),
    };
    let id_usuario = args.opt_int("Usuario")?;
    let history = shell.pos().reports().admin_day(fecha, id_usuario).await?;
    text(render::admin_day(&history))
}

/// `ventas [desde hasta] [usuario=<id>] [estado=<estado>] [medio=<medio>]`
///
/// Without dates the list covers the report period.
async fn sales(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let mut query = SalesAdminQuery {
        desde: String::new(),
        hasta: String::new(),
        id_usuario: None,
        estado: None,
        medio: None,
        limit: SALES_PAGE_SIZE,
        offset: 0,
    };
    for (key, value) in args.options() {
        match key.as_str() {
            "usuario" => query.id_usuario = Some(parse_int("Usuario", &value)?),
            "estado" => query.estado = Some(value.to_uppercase()),
            "medio" => query.medio = Some(value.parse::<PaymentMethod>()?.as_str().to_string()),
            other => {
                return Err(ApiError::usage(format!(
                    "Opción desconocida: {other}. Usá usuario=, estado= o medio="
                )))
            }
        }
    }

    let range = if args.is_empty() {
        shell.workspace().report_filter.range
    } else {
        DateRange::new(args.date("Desde")?, args.date("Hasta")?)?
    };
    query.desde = range.desde_str();
    query.hasta = range.hasta_str();

    let page = shell.pos().reports().sales_admin(&query).await?;
    shell.workspace_mut().sales_query = Some(query);
    text(render::sales_page(&page))
}

async fn sales_next(shell: &mut Shell) -> CommandResult {
    let mut query = shell
        .workspace()
        .sales_query
        .clone()
        .ok_or_else(|| ApiError::usage("Primero listá con `ventas`."))?;
    query.offset += query.limit;

    let page = shell.pos().reports().sales_admin(&query).await?;
    if page.items.is_empty() {
        return Err(ApiError::usage("No hay más ventas."));
    }
    shell.workspace_mut().sales_query = Some(query);
    text(render::sales_page(&page))
}

async fn sale_detail(shell: &mut Shell, args: &mut Args) -> CommandResult {
    let id_venta = args.int("Venta")?;
    let detail = shell.pos().reports().sale_detail(id_venta).await?;
    text(render::sale_detail(&detail))
}

async fn operators(shell: &mut Shell) -> CommandResult {
    let users = shell.pos().auth().operators().await?;
    text(render::users("Operadores", &users))
}

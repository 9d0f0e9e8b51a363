//! # Report Module
//!
//! Date-range presets and the read-only report contracts of the admin
//! dashboards. Every aggregate is computed by the backend; the client only
//! picks the range and formats currency and percentages.
//!
//! ## Presets
//! ```text
//! ┌──────────────┬─────────────────────────────────┬──────────┐
//! │ Preset       │ Range                           │ Group by │
//! ├──────────────┼─────────────────────────────────┼──────────┤
//! │ hoy          │ today → today                   │ dia      │
//! │ esta_semana  │ Monday → Sunday of this week    │ dia      │
//! │ este_mes     │ 1st → last day of this month    │ dia      │
//! │ todo         │ 2000-01-01 → today              │ mes      │
//! │ custom       │ whatever the operator typed     │ (kept)   │
//! └──────────────┴─────────────────────────────────┴──────────┘
//! ```

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CajaId, ProductId, ReplenishMode, SaleId, UserId};

// =============================================================================
// Date Ranges
// =============================================================================

/// Inclusive calendar range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub desde: NaiveDate,
    pub hasta: NaiveDate,
}

impl DateRange {
    /// Builds a range, rejecting `desde > hasta`.
    pub fn new(desde: NaiveDate, hasta: NaiveDate) -> CoreResult<Self> {
        if desde > hasta {
            return Err(ValidationError::InvalidFormat {
                field: "Rango".to_string(),
                reason: "“Desde” no puede ser mayor que “Hasta”".to_string(),
            }
            .into());
        }
        Ok(DateRange { desde, hasta })
    }

    pub fn single_day(day: NaiveDate) -> Self {
        DateRange {
            desde: day,
            hasta: day,
        }
    }

    /// The last `days` days, today included.
    pub fn last_days(today: NaiveDate, days: u64) -> Self {
        let back = days.saturating_sub(1);
        DateRange {
            desde: today.checked_sub_days(Days::new(back)).unwrap_or(today),
            hasta: today,
        }
    }

    /// First day of the month through `today`.
    pub fn month_to_date(today: NaiveDate) -> Self {
        DateRange {
            desde: first_day_of_month(today),
            hasta: today,
        }
    }

    pub fn desde_str(&self) -> String {
        self.desde.format("%Y-%m-%d").to_string()
    }

    pub fn hasta_str(&self) -> String {
        self.hasta.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.desde_str(), self.hasta_str())
    }
}

pub fn first_day_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

pub fn last_day_of_month(day: NaiveDate) -> NaiveDate {
    first_day_of_month(day)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(day)
}

/// Monday of the week containing `day`.
pub fn start_of_week(day: NaiveDate) -> NaiveDate {
    let back = u64::from(day.weekday().num_days_from_monday());
    day.checked_sub_days(Days::new(back)).unwrap_or(day)
}

/// Earliest date of the all-time preset.
pub fn all_time_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Period granularity of the P&L.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Dia,
    Semana,
    Mes,
    Total,
}

impl FromStr for GroupBy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dia" | "día" => Ok(GroupBy::Dia),
            "semana" => Ok(GroupBy::Semana),
            "mes" => Ok(GroupBy::Mes),
            "total" => Ok(GroupBy::Total),
            _ => Err(ValidationError::NotAllowed {
                field: "Agrupar por".to_string(),
                allowed: ["dia", "semana", "mes", "total"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

/// Range shortcuts of the dashboards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DatePreset {
    #[default]
    Hoy,
    EstaSemana,
    EsteMes,
    Custom,
    Todo,
}

impl FromStr for DatePreset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hoy" => Ok(DatePreset::Hoy),
            "esta_semana" | "semana" => Ok(DatePreset::EstaSemana),
            "este_mes" | "mes" => Ok(DatePreset::EsteMes),
            "custom" => Ok(DatePreset::Custom),
            "todo" => Ok(DatePreset::Todo),
            _ => Err(ValidationError::NotAllowed {
                field: "Período".to_string(),
                allowed: ["hoy", "esta_semana", "este_mes", "custom", "todo"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

/// Range and grouping currently selected on a dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportFilter {
    pub preset: DatePreset,
    pub range: DateRange,
    pub group_by: GroupBy,
}

impl ReportFilter {
    /// Dashboards open on "hoy".
    pub fn today(today: NaiveDate) -> Self {
        let mut filter = ReportFilter {
            preset: DatePreset::Hoy,
            range: DateRange::single_day(today),
            group_by: GroupBy::Dia,
        };
        filter.apply_preset(DatePreset::Hoy, today);
        filter
    }

    /// Switches preset. `Custom` keeps the current range and grouping.
    pub fn apply_preset(&mut self, preset: DatePreset, today: NaiveDate) {
        self.preset = preset;
        match preset {
            DatePreset::Hoy => {
                self.range = DateRange::single_day(today);
                self.group_by = GroupBy::Dia;
            }
            DatePreset::EstaSemana => {
                let monday = start_of_week(today);
                self.range = DateRange {
                    desde: monday,
                    hasta: monday.checked_add_days(Days::new(6)).unwrap_or(today),
                };
                self.group_by = GroupBy::Dia;
            }
            DatePreset::EsteMes => {
                self.range = DateRange {
                    desde: first_day_of_month(today),
                    hasta: last_day_of_month(today),
                };
                self.group_by = GroupBy::Dia;
            }
            DatePreset::Todo => {
                self.range = DateRange {
                    desde: all_time_start(),
                    hasta: today,
                };
                self.group_by = GroupBy::Mes;
            }
            DatePreset::Custom => {}
        }
    }

    /// Typing a date switches to `Custom`.
    pub fn set_custom(&mut self, desde: NaiveDate, hasta: NaiveDate) -> CoreResult<()> {
        self.range = DateRange::new(desde, hasta)?;
        self.preset = DatePreset::Custom;
        Ok(())
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Formats a ratio as a percentage with one decimal.
///
/// ## Example
/// ```rust
/// use huevo_core::report::format_pct;
///
/// assert_eq!(format_pct(Some(0.2351)), "23.5%");
/// assert_eq!(format_pct(None), "—");
/// assert_eq!(format_pct(Some(f64::NAN)), "—");
/// ```
pub fn format_pct(ratio: Option<f64>) -> String {
    match ratio {
        Some(x) if x.is_finite() => format!("{:.1}%", x * 100.0),
        _ => "—".to_string(),
    }
}

/// Sold quantity in the product's restock unit, e.g. `2 cajones + 5`.
pub fn format_sold_quantity(vendidos: i64, modo: ReplenishMode, factor: i64) -> String {
    if modo == ReplenishMode::Unitario {
        return format!("{vendidos} unidades");
    }
    let f = if factor > 0 { factor } else { crate::MAPLES_PER_CAJON };
    let cajones = vendidos.div_euclid(f);
    let resto = vendidos.rem_euclid(f);
    match (cajones > 0, resto > 0) {
        (true, true) => format!("{cajones} cajones + {resto}"),
        (true, false) => format!("{cajones} cajones"),
        _ => format!("{resto}"),
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// `pnl_reporte` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PnlInput {
    pub desde: String,
    pub hasta: String,
    pub group_by: GroupBy,
    pub id_usuario: Option<UserId>,
    pub incluir_no_finalizadas: bool,
}

impl PnlInput {
    pub fn from_filter(filter: &ReportFilter, id_usuario: Option<UserId>) -> Self {
        PnlInput {
            desde: filter.range.desde_str(),
            hasta: filter.range.hasta_str(),
            group_by: filter.group_by,
            id_usuario,
            incluir_no_finalizadas: false,
        }
    }
}

/// `{desde, hasta}` arguments shared by several reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeArgs {
    pub desde: String,
    pub hasta: String,
}

impl From<&DateRange> for RangeArgs {
    fn from(range: &DateRange) -> Self {
        RangeArgs {
            desde: range.desde_str(),
            hasta: range.hasta_str(),
        }
    }
}

/// `ventas_admin_listar` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalesAdminQuery {
    pub desde: String,
    pub hasta: String,
    pub id_usuario: Option<UserId>,
    pub estado: Option<String>,
    pub medio: Option<String>,
    pub limit: u32,
    pub offset: u32,
}

// =============================================================================
// P&L
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlMeta {
    pub desde: String,
    pub hasta: String,
    pub group_by: String,
    #[serde(default)]
    pub moneda: String,
    #[serde(default)]
    pub generado_en: String,
    #[serde(default)]
    pub criterio_costos: String,
    #[serde(default)]
    pub criterio_gastos_fijos: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PnlTotals {
    pub ventas_brutas: Money,
    pub costo_mercaderia_vendida: Money,
    pub margen_bruto: Money,
    pub margen_bruto_pct: Option<f64>,
    pub ingresos_extra: Money,
    pub egresos_operativos: Money,
    pub resultado_neto: Money,
    pub resultado_neto_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlPeriod {
    pub periodo_key: String,
    pub desde: String,
    pub hasta: String,
    pub ventas_brutas: Money,
    pub costo_mercaderia_vendida: Money,
    pub margen_bruto: Money,
    pub ingresos_extra: Money,
    pub egresos_operativos: Money,
    pub resultado_neto: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlExpenseCategory {
    pub categoria: String,
    pub ingresos: Money,
    pub egresos: Money,
    pub neto: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlPaymentMethod {
    pub medio: String,
    pub monto: Money,
}

/// `pnl_reporte` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlReport {
    pub meta: PnlMeta,
    pub totales: PnlTotals,
    #[serde(default)]
    pub periodos: Vec<PnlPeriod>,
    #[serde(default)]
    pub gastos_por_categoria: Vec<PnlExpenseCategory>,
    #[serde(default)]
    pub ingresos_por_medio_pago: Option<Vec<PnlPaymentMethod>>,
}

// =============================================================================
// Profitability
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductProfitRow {
    pub id_producto: ProductId,
    pub nombre: String,
    pub cantidad_vendida: i64,
    pub ingreso_total: Money,
    pub costo_total: Money,
    pub ganancia: Money,
}

/// `reporte_rentabilidad` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductProfitReport {
    pub fecha_desde: String,
    pub fecha_hasta: String,
    pub total_ventas: Money,
    pub total_costos: Money,
    pub ganancia_bruta: Money,
    pub margen_pct: f64,
    #[serde(default)]
    pub productos: Vec<ProductProfitRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProfitRow {
    /// `YYYY-MM`
    pub mes: String,
    pub ventas: Money,
    pub cogs: Money,
    pub gastos: Money,
    pub ganancia_neta: Money,
}

/// `reporte_rentabilidad_negocio` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfitReport {
    pub fecha_desde: String,
    pub fecha_hasta: String,
    #[serde(default)]
    pub ventas_brutas: Money,
    #[serde(default)]
    pub cogs: Money,
    #[serde(default)]
    pub gastos: Money,
    pub rentabilidad_neta: Money,
    pub margen_neto_pct: f64,
    pub rentabilidad_mes_anterior: Money,
    #[serde(default)]
    pub tendencia_mensual: Vec<MonthlyProfitRow>,
}

// =============================================================================
// Stock Reports
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockReportProduct {
    pub id_producto: ProductId,
    pub codigo_producto: String,
    pub nombre: String,
    pub stock_actual: i64,
    pub costo_unitario: Money,
    pub valor_total: Money,
    pub porcentaje_valor: f64,
    #[serde(default)]
    pub rotacion_dias: Option<f64>,
    #[serde(default)]
    pub dias_stock_restante: Option<f64>,
    #[serde(default)]
    pub clasificacion_abc: Option<String>,
    #[serde(default)]
    pub variacion_pct: Option<f64>,
    #[serde(default)]
    pub riesgo: Option<String>,
}

/// `reporte_stock_general` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockReport {
    pub total_inventario: Money,
    pub cantidad_productos: i64,
    #[serde(default)]
    pub productos: Vec<StockReportProduct>,
}

/// Row of `reporte_stock_reposicion`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplenishRow {
    pub id_producto: ProductId,
    pub codigo_producto: String,
    pub nombre: String,
    pub vendidos: i64,
    #[serde(default)]
    pub reposicion_modo: ReplenishMode,
    #[serde(default)]
    pub reposicion_factor: i64,
}

impl ReplenishRow {
    pub fn sold_label(&self) -> String {
        format_sold_quantity(self.vendidos, self.reposicion_modo, self.reposicion_factor)
    }
}

// =============================================================================
// Sales History (admin)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleAdminRow {
    pub id_venta: SaleId,
    pub fecha_hora: String,
    pub usuario: String,
    pub id_usuario: UserId,
    pub id_caja: CajaId,
    pub total: Money,
    pub estado: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CajaAdminRow {
    pub id_caja: CajaId,
    pub abierta_por: UserId,
    pub nombre_usuario: String,
    pub abierta_en: String,
    pub cerrada_en: Option<String>,
    pub estado: String,
    pub cantidad_ventas: i64,
    pub total_caja: Money,
}

/// `admin_historial_dia` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminDayHistory {
    pub fecha: String,
    pub id_usuario: Option<UserId>,
    #[serde(default)]
    pub ventas: Vec<SaleAdminRow>,
    #[serde(default)]
    pub cajas: Vec<CajaAdminRow>,
    pub total_dia: Money,
    pub cantidad_ventas: i64,
    pub promedio_ticket: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleAdminSummaryRow {
    pub id_venta: SaleId,
    pub fecha_hora: String,
    pub id_usuario: UserId,
    pub usuario: String,
    pub id_caja: CajaId,
    pub total: Money,
    pub estado: String,
    #[serde(default)]
    pub cant_items: i64,
    #[serde(default)]
    pub unidades: i64,
    #[serde(default)]
    pub costo_total: Money,
    #[serde(default)]
    pub ganancia_bruta: Money,
    #[serde(default)]
    pub margen_pct: Option<f64>,
    #[serde(default)]
    pub pagos_resumen: Option<String>,
}

/// `ventas_admin_listar` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesAdminPage {
    pub items: Vec<SaleAdminSummaryRow>,
    pub total: i64,
    pub limit: u32,
    pub offset: u32,
}

impl SalesAdminPage {
    pub fn has_next(&self) -> bool {
        i64::from(self.offset) + (self.items.len() as i64) < self.total
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleAdminItemRow {
    pub id_item: i64,
    pub id_producto: ProductId,
    #[serde(default)]
    pub codigo: String,
    pub producto: String,
    pub cantidad: i64,
    pub precio_unitario: Money,
    #[serde(default)]
    pub costo_unitario_en_venta: Money,
    pub subtotal: Money,
    #[serde(default)]
    pub fuente_precio: String,
    #[serde(default)]
    pub costo_linea: Money,
    #[serde(default)]
    pub ganancia_linea: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleAdminPaymentRow {
    pub medio: String,
    pub monto: Money,
    #[serde(default)]
    pub referencia: Option<String>,
}

/// `venta_admin_detalle` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleAdminDetail {
    pub resumen: SaleAdminSummaryRow,
    #[serde(default)]
    pub items: Vec<SaleAdminItemRow>,
    #[serde(default)]
    pub pagos: Vec<SaleAdminPaymentRow>,
}

// =============================================================================
// Admin Home
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeAlert {
    /// `info`, `warn` or `bad`; unknown levels are shown as info.
    pub nivel: String,
    pub texto: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopProductToday {
    pub id_producto: ProductId,
    pub nombre: String,
    pub cantidad: i64,
    pub recaudado: Money,
}

/// `admin_home_resumen` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminHomeSummary {
    pub ventas_hoy_total: Money,
    pub ventas_hoy_cant: i64,
    pub resultado_mes_neto: Money,
    pub stock_critico_cant: i64,
    #[serde(default)]
    pub top_producto_hoy: Option<TopProductToday>,
    #[serde(default)]
    pub alertas: Vec<HomeAlert>,
}

// =============================================================================
// Unit Tests
// =============================================================================

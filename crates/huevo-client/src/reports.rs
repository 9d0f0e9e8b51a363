//! # Reports Service
//!
//! Read-only admin dashboards. Every figure is aggregated by the backend;
//! this service only shapes the arguments and types the replies.
//!
//! ```text
//! ┌──────────────────────────────┬─────────────────────────────────────────┐
//! │ Command                      │ Arguments                               │
//! ├──────────────────────────────┼─────────────────────────────────────────┤
//! │ pnl_reporte                  │ {input:{desde,hasta,group_by,…}}        │
//! │ reporte_rentabilidad         │ {desde,hasta}                           │
//! │ reporte_rentabilidad_negocio │ {desde,hasta}                           │
//! │ reporte_stock_general        │ {solo_activos}                          │
//! │ reporte_stock_reposicion     │ {input:{desde,hasta}}                   │
//! │ admin_historial_dia          │ {fecha,idUsuario}                       │
//! │ admin_home_resumen           │ -                                       │
//! │ ventas_admin_listar          │ {input:{desde,hasta,…,limit,offset}}    │
//! │ venta_admin_detalle          │ {idVenta}                               │
//! └──────────────────────────────┴─────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use huevo_core::report::{
    AdminDayHistory, AdminHomeSummary, BusinessProfitReport, DateRange, PnlInput, PnlReport,
    ProductProfitReport, RangeArgs, ReplenishRow, ReportFilter, SaleAdminDetail, SalesAdminPage,
    SalesAdminQuery, StockReport,
};
use huevo_core::{SaleId, UserId};
use serde::Serialize;
use tracing::debug;

use crate::error::ClientResult;
use crate::invoke::{CommandClient, Input, NoArgs};

#[derive(Serialize)]
struct StockReportArgs {
    solo_activos: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DayArgs {
    fecha: String,
    id_usuario: Option<UserId>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SaleDetailArgs {
    id_venta: SaleId,
}

#[derive(Clone)]
pub struct ReportsService {
    client: CommandClient,
}

impl ReportsService {
    pub fn new(client: CommandClient) -> Self {
        ReportsService { client }
    }

    /// Profit and loss for the dashboard filter, optionally for one operator.
    pub async fn pnl(&self, filter: &ReportFilter, id_usuario: Option<UserId>) -> ClientResult<PnlReport> {
        let input = PnlInput::from_filter(filter, id_usuario);
        debug!(desde = %input.desde, hasta = %input.hasta, group_by = ?input.group_by, "P&L report");
        self.client.call("pnl_reporte", &Input::new(input)).await
    }

    pub async fn product_profit(&self, range: &DateRange) -> ClientResult<ProductProfitReport> {
        self.client
            .call("reporte_rentabilidad", &RangeArgs::from(range))
            .await
    }

    pub async fn business_profit(&self, range: &DateRange) -> ClientResult<BusinessProfitReport> {
        self.client
            .call("reporte_rentabilidad_negocio", &RangeArgs::from(range))
            .await
    }

    pub async fn stock_report(&self, solo_activos: bool) -> ClientResult<StockReport> {
        self.client
            .call("reporte_stock_general", &StockReportArgs { solo_activos })
            .await
    }

    /// Units sold per product in `range`, for restocking.
    pub async fn replenishment(&self, range: &DateRange) -> ClientResult<Vec<ReplenishRow>> {
        self.client
            .call("reporte_stock_reposicion", &Input::new(RangeArgs::from(range)))
            .await
    }

    pub async fn admin_day(&self, fecha: NaiveDate, id_usuario: Option<UserId>) -> ClientResult<AdminDayHistory> {
        let args = DayArgs {
            fecha: fecha.format("%Y-%m-%d").to_string(),
            id_usuario,
        };
        self.client.call("admin_historial_dia", &args).await
    }

    pub async fn admin_home(&self) -> ClientResult<AdminHomeSummary> {
        self.client.call("admin_home_resumen", &NoArgs {}).await
    }

    pub async fn sales_admin(&self, query: &SalesAdminQuery) -> ClientResult<SalesAdminPage> {
        self.client
            .call("ventas_admin_listar", &Input::new(query))
            .await
    }

    pub async fn sale_detail(&self, id_venta: SaleId) -> ClientResult<SaleAdminDetail> {
        self.client
            .call("venta_admin_detalle", &SaleDetailArgs { id_venta })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::fake::FakeBackend;
    use huevo_core::report::{format_pct, DatePreset};
    use huevo_core::Money;
    use serde_json::json;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn test_pnl_sends_filter_as_input() {
        let fake = FakeBackend::new();
        fake.reply_with(
            "pnl_reporte",
            json!({
                "meta": {"desde": "2000-01-01", "hasta": "2026-10-19", "group_by": "mes"},
                "totales": {"ventas_brutas": 1000, "costo_mercaderia_vendida": 600,
                            "margen_bruto": 400, "margen_bruto_pct": 0.4,
                            "ingresos_extra": 0, "egresos_operativos": 100,
                            "resultado_neto": 300, "resultado_neto_pct": 0.3}
            }),
        );
        let reports = ReportsService::new(fake.client());

        let mut filter = ReportFilter::today(d(2026, 10, 19));
        filter.apply_preset(DatePreset::Todo, d(2026, 10, 19));
        let report = reports.pnl(&filter, Some(2)).await.unwrap();
        assert_eq!(report.totales.resultado_neto, Money::from_pesos(300));
        assert_eq!(format_pct(report.totales.margen_bruto_pct), "40.0%");
        assert!(report.periodos.is_empty());

        let args = fake.last_args("pnl_reporte").unwrap();
        assert_eq!(args["input"]["desde"], "2000-01-01");
        assert_eq!(args["input"]["group_by"], "mes");
        assert_eq!(args["input"]["id_usuario"], 2);
        assert_eq!(args["input"]["incluir_no_finalizadas"], false);
    }

    #[tokio::test]
    async fn test_argument_shapes() {
        let fake = FakeBackend::new();
        fake.reply_with("reporte_stock_reposicion", json!([
            {"id_producto": 1, "codigo_producto": "M30", "nombre": "Maple 30",
             "vendidos": 29, "reposicion_modo": "cajon", "reposicion_factor": 12}
        ]));
        fake.reply_with("admin_historial_dia", json!({
            "fecha": "2026-10-19", "id_usuario": null, "ventas": [], "cajas": [],
            "total_dia": 0, "cantidad_ventas": 0, "promedio_ticket": 0.0
        }));
        let reports = ReportsService::new(fake.client());
        let range = DateRange::new(d(2026, 10, 1), d(2026, 10, 19)).unwrap();

        let rows = reports.replenishment(&range).await.unwrap();
        assert_eq!(rows[0].sold_label(), "2 cajones + 5");
        assert_eq!(
            fake.last_args("reporte_stock_reposicion").unwrap(),
            json!({"input": {"desde": "2026-10-01", "hasta": "2026-10-19"}})
        );

        reports.admin_day(d(2026, 10, 19), None).await.unwrap();
        assert_eq!(
            fake.last_args("admin_historial_dia").unwrap(),
            json!({"fecha": "2026-10-19", "idUsuario": null})
        );

        let _ = reports.product_profit(&range).await;
        assert_eq!(
            fake.last_args("reporte_rentabilidad").unwrap(),
            json!({"desde": "2026-10-01", "hasta": "2026-10-19"})
        );

        let _ = reports.sale_detail(42).await;
        assert_eq!(fake.last_args("venta_admin_detalle").unwrap(), json!({"idVenta": 42}));
    }

    #[tokio::test]
    async fn test_sales_admin_paging() {
        let fake = FakeBackend::new();
        fake.reply_with("ventas_admin_listar", json!({
            "items": [{"id_venta": 9, "fecha_hora": "2026-10-19 10:00:00", "id_usuario": 1,
                       "usuario": "ana", "id_caja": 3, "total": 250, "estado": "FINALIZADA"}],
            "total": 51, "limit": 50, "offset": 0
        }));
        let reports = ReportsService::new(fake.client());

        let query = SalesAdminQuery {
            desde: "2026-10-01".into(),
            hasta: "2026-10-19".into(),
            id_usuario: None,
            estado: Some("FINALIZADA".into()),
            medio: None,
            limit: 50,
            offset: 0,
        };
        let page = reports.sales_admin(&query).await.unwrap();
        assert!(page.has_next());
        assert_eq!(page.items[0].cant_items, 0);
        assert_eq!(fake.last_args("ventas_admin_listar").unwrap()["input"]["estado"], "FINALIZADA");
    }

    #[tokio::test]
    async fn test_malformed_reply_is_reported() {
        let fake = FakeBackend::new();
        fake.reply_with("admin_home_resumen", json!({"ventas_hoy_total": "mucho"}));
        let reports = ReportsService::new(fake.client());

        let err = reports.admin_home().await.unwrap_err();
        assert!(matches!(err, ClientError::DeserializationFailed { .. }));
    }
}

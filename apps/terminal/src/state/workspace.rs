//! Screen-local memory: catalog cache, combo draft, filters.

use chrono::NaiveDate;
use huevo_core::ledger::default_period;
use huevo_core::promo::ComboDraft;
use huevo_core::report::{DateRange, ReportFilter, SalesAdminQuery};
use huevo_core::{Money, ProductId, StockItem};
use std::collections::BTreeMap;

/// Last stock list the operator asked for, so `mas` can page it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StockQuery {
    pub q: Option<String>,
    pub solo_activos: bool,
    pub page: u32,
}

#[derive(Debug, Clone)]
pub struct Workspace {
    catalog: BTreeMap<ProductId, StockItem>,
    pub stock_query: StockQuery,
    pub combo: ComboDraft,
    pub report_filter: ReportFilter,
    pub ledger_period: DateRange,
    /// Last sales-history query, so `ventas-mas` can page it.
    pub sales_query: Option<SalesAdminQuery>,
}

impl Workspace {
    pub fn new(today: NaiveDate) -> Self {
        Workspace {
            catalog: BTreeMap::new(),
            stock_query: StockQuery {
                solo_activos: true,
                ..StockQuery::default()
            },
            combo: ComboDraft::new(),
            report_filter: ReportFilter::today(today),
            ledger_period: default_period(today),
            sales_query: None,
        }
    }

    /// Remembers products returned by any list, replacing older copies.
    pub fn remember(&mut self, items: &[StockItem]) {
        for item in items {
            self.catalog.insert(item.id_producto, item.clone());
        }
    }

    pub fn item(&self, id_producto: ProductId) -> Option<&StockItem> {
        self.catalog.get(&id_producto)
    }

    pub fn forget(&mut self, id_producto: ProductId) {
        self.catalog.remove(&id_producto);
    }

    pub fn catalog(&self) -> Vec<StockItem> {
        self.catalog.values().cloned().collect()
    }

    /// Reference total of the combo draft at cached sale prices.
    pub fn combo_suggested_total(&self) -> Money {
        self.combo.suggested_total(&self.catalog())
    }
}

//! # Ledger Module
//!
//! Business expenses (gastos) and payroll payments (sueldos). Both share one
//! screen: a period filter, a list, a backend total, and an entry form.
//!
//! ## Refresh Flow
//! ```text
//! period / filter change
//!      │
//!      ├──► *_listar_por_periodo   ──► rows
//!      └──► *_total_por_periodo    ──► {total}
//!
//! Two calls, never summed locally.
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::report::DateRange;
use crate::types::UserId;
use crate::validation::{validate_amount, validate_required};

// =============================================================================
// Kinds & Categories
// =============================================================================

/// Which half of the ledger screen is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LedgerKind {
    #[default]
    Gastos,
    Sueldos,
}

impl LedgerKind {
    pub const fn title(&self) -> &'static str {
        match self {
            LedgerKind::Gastos => "Gastos",
            LedgerKind::Sueldos => "Sueldos",
        }
    }
}

/// Fixed expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    Alquiler,
    Servicios,
    Impuestos,
    Otros,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 4] = [
        ExpenseCategory::Alquiler,
        ExpenseCategory::Servicios,
        ExpenseCategory::Impuestos,
        ExpenseCategory::Otros,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Alquiler => "Alquiler",
            ExpenseCategory::Servicios => "Servicios",
            ExpenseCategory::Impuestos => "Impuestos",
            ExpenseCategory::Otros => "Otros",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpenseCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "Categoría".to_string(),
            });
        }
        ExpenseCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "Categoría".to_string(),
                allowed: ExpenseCategory::ALL
                    .iter()
                    .map(|c| c.as_str().to_string())
                    .collect(),
            })
    }
}

/// First day of the month through today.
pub fn default_period(today: NaiveDate) -> DateRange {
    DateRange::month_to_date(today)
}

// =============================================================================
// Entry Forms
// =============================================================================

/// `gasto_registrar` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseInput {
    pub categoria: String,
    pub descripcion: String,
    pub monto: Money,
    /// Always null: the backend stamps the entry.
    pub fecha_hora: Option<String>,
}

/// `sueldo_registrar` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollInput {
    pub descripcion: String,
    pub monto: Money,
    pub id_usuario_destino: UserId,
    pub fecha_hora: Option<String>,
}

/// Raw expense form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseDraft {
    pub categoria: String,
    pub descripcion: String,
    pub monto: Money,
}

/// Raw payroll form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayrollDraft {
    pub descripcion: String,
    pub monto: Money,
    pub id_usuario_destino: Option<UserId>,
}

/// Validates an expense entry. Checked in form order: description, amount,
/// category.
pub fn plan_expense(draft: &ExpenseDraft) -> CoreResult<ExpenseInput> {
    let descripcion = validate_required("Descripción", &draft.descripcion)?;
    validate_amount("Monto", draft.monto)?;
    let categoria: ExpenseCategory = draft.categoria.parse()?;

    Ok(ExpenseInput {
        categoria: categoria.as_str().to_string(),
        descripcion,
        monto: draft.monto,
        fecha_hora: None,
    })
}

/// Validates a payroll entry.
pub fn plan_payroll(draft: &PayrollDraft) -> CoreResult<PayrollInput> {
    let descripcion = validate_required("Descripción", &draft.descripcion)?;
    validate_amount("Monto", draft.monto)?;
    let id_usuario_destino = draft
        .id_usuario_destino
        .filter(|id| *id > 0)
        .ok_or_else(|| ValidationError::Required {
            field: "Empleado destino".to_string(),
        })?;

    Ok(PayrollInput {
        descripcion,
        monto: draft.monto,
        id_usuario_destino,
        fecha_hora: None,
    })
}

// =============================================================================
// Filters
// =============================================================================

/// `gasto_listar_por_periodo` filter, sent as `{filtro: ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseFilter {
    pub fecha_desde: String,
    pub fecha_hasta: String,
    pub categoria: Option<String>,
}

impl ExpenseFilter {
    pub fn new(period: &DateRange, categoria: Option<ExpenseCategory>) -> Self {
        ExpenseFilter {
            fecha_desde: period.desde_str(),
            fecha_hasta: period.hasta_str(),
            categoria: categoria.map(|c| c.as_str().to_string()),
        }
    }
}

/// `sueldo_listar_por_periodo` filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayrollFilter {
    pub fecha_desde: String,
    pub fecha_hasta: String,
    pub id_usuario_destino: Option<UserId>,
}

impl PayrollFilter {
    pub fn new(period: &DateRange, id_usuario_destino: Option<UserId>) -> Self {
        PayrollFilter {
            fecha_desde: period.desde_str(),
            fecha_hasta: period.hasta_str(),
            id_usuario_destino,
        }
    }
}

/// Input of both `*_total_por_periodo` commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerTotalInput {
    pub fecha_desde: String,
    pub fecha_hasta: String,
    pub categoria: Option<String>,
    pub id_usuario_destino: Option<UserId>,
}

impl From<&ExpenseFilter> for LedgerTotalInput {
    fn from(f: &ExpenseFilter) -> Self {
        LedgerTotalInput {
            fecha_desde: f.fecha_desde.clone(),
            fecha_hasta: f.fecha_hasta.clone(),
            categoria: f.categoria.clone(),
            id_usuario_destino: None,
        }
    }
}

impl From<&PayrollFilter> for LedgerTotalInput {
    fn from(f: &PayrollFilter) -> Self {
        LedgerTotalInput {
            fecha_desde: f.fecha_desde.clone(),
            fecha_hasta: f.fecha_hasta.clone(),
            categoria: None,
            id_usuario_destino: f.id_usuario_destino,
        }
    }
}

// =============================================================================
// Rows
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRow {
    pub id_gasto_negocio: i64,
    pub fecha_hora: String,
    pub categoria: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub monto: Money,
    #[serde(default)]
    pub id_usuario: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRow {
    pub id_sueldo_pago: i64,
    pub fecha_hora: String,
    pub descripcion: String,
    pub monto: Money,
    #[serde(default)]
    pub id_usuario_destino: Option<UserId>,
    /// Present when the backend already joins the employee name.
    #[serde(default)]
    pub usuario_destino_nombre: Option<String>,
    #[serde(default)]
    pub id_usuario: Option<UserId>,
}

/// `{total}` reply of the total commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalReply {
    pub total: Money,
}

/// `YYYY-MM-DD HH:MM` prefix of a backend timestamp.
pub fn short_timestamp(fecha_hora: &str) -> &str {
    match fecha_hora.char_indices().nth(16) {
        Some((idx, _)) => &fecha_hora[..idx],
        None => fecha_hora,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use serde_json::json;

    #[test]
    fn test_category_parsing() {
        assert_eq!(" servicios ".parse::<ExpenseCategory>().unwrap(), ExpenseCategory::Servicios);
        assert!(matches!(
            "".parse::<ExpenseCategory>(),
            Err(ValidationError::Required { .. })
        ));
        let err = "Comida".parse::<ExpenseCategory>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Categoría debe ser uno de: Alquiler, Servicios, Impuestos, Otros"
        );
    }

    #[test]
    fn test_plan_expense_checks_in_form_order() {
        let draft = ExpenseDraft {
            categoria: String::new(),
            descripcion: "  ".to_string(),
            monto: Money::zero(),
        };
        let err = plan_expense(&draft).unwrap_err();
        assert_eq!(err.to_string(), "Descripción: campo obligatorio.");

        let draft = ExpenseDraft {
            descripcion: "Luz".to_string(),
            ..draft
        };
        let err = plan_expense(&draft).unwrap_err();
        assert_eq!(err.to_string(), "Valor inválido para Monto (debe ser > 0).");

        let draft = ExpenseDraft {
            monto: Money::from_pesos(15000),
            ..draft
        };
        assert!(matches!(plan_expense(&draft), Err(CoreError::Validation(_))));

        let draft = ExpenseDraft {
            categoria: "Servicios".to_string(),
            ..draft
        };
        let input = plan_expense(&draft).unwrap();
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({"categoria": "Servicios", "descripcion": "Luz", "monto": 15000, "fecha_hora": null})
        );
    }

    #[test]
    fn test_plan_payroll_requires_employee() {
        let mut draft = PayrollDraft {
            descripcion: "Quincena".to_string(),
            monto: Money::from_pesos(200000),
            id_usuario_destino: None,
        };
        let err = plan_payroll(&draft).unwrap_err();
        assert_eq!(err.to_string(), "Empleado destino: campo obligatorio.");

        draft.id_usuario_destino = Some(4);
        assert_eq!(plan_payroll(&draft).unwrap().id_usuario_destino, 4);
    }

    #[test]
    fn test_default_period_and_filters() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let period = default_period(today);
        assert_eq!(period.desde_str(), "2026-10-01");
        assert_eq!(period.hasta_str(), "2026-10-19");

        let filtro = ExpenseFilter::new(&period, Some(ExpenseCategory::Otros));
        let total = LedgerTotalInput::from(&filtro);
        assert_eq!(
            serde_json::to_value(&total).unwrap(),
            json!({"fecha_desde": "2026-10-01", "fecha_hasta": "2026-10-19",
                   "categoria": "Otros", "id_usuario_destino": null})
        );

        let payroll = LedgerTotalInput::from(&PayrollFilter::new(&period, Some(3)));
        assert_eq!(payroll.categoria, None);
        assert_eq!(payroll.id_usuario_destino, Some(3));
    }

    #[test]
    fn test_rows_deserialize() {
        let rows: Vec<ExpenseRow> = serde_json::from_value(json!([
            {"id_gasto_negocio": 1, "fecha_hora": "2026-10-02 10:15:00",
             "categoria": "Alquiler", "descripcion": null, "monto": 350000, "id_usuario": 1}
        ]))
        .unwrap();
        assert_eq!(rows[0].descripcion, None);
        assert_eq!(short_timestamp(&rows[0].fecha_hora), "2026-10-02 10:15");
        assert_eq!(short_timestamp("2026-10-02"), "2026-10-02");
    }
}

//! # Domain Types
//!
//! Catalog types shared by every screen of the Huevo Santo front end.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shared Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   StockItem     │   │ PaymentMethod   │   │   PriceKind     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id_producto    │   │  Efectivo       │   │  Venta          │       │
//! │  │  codigo         │   │  Debito         │   │  Costo          │       │
//! │  │  precio_venta   │   │  Credito        │   └─────────────────┘       │
//! │  │  costo          │   │  Transferencia  │                             │
//! │  │  stock_actual   │   └─────────────────┘   ┌─────────────────┐       │
//! │  │  activo         │                         │ ReplenishMode   │       │
//! │  └─────────────────┘   ┌─────────────────┐   │  Unitario (×1)  │       │
//! │                        │   UserOption    │   │  Cajon   (×12)  │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every entity is keyed by the backend's integer row id. The front end never
//! mints ids; it only echoes what the backend returned.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Identifiers
// =============================================================================

pub type ProductId = i64;
pub type SaleId = i64;
pub type ItemId = i64;
pub type UserId = i64;
pub type ComboId = i64;
pub type CajaId = i64;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale (or part of it) was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Efectivo,
    Debito,
    Credito,
    Transferencia,
}

impl PaymentMethod {
    /// All methods, in the order the cashier screen offers them.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Efectivo,
        PaymentMethod::Debito,
        PaymentMethod::Credito,
        PaymentMethod::Transferencia,
    ];

    /// Wire value.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Efectivo => "efectivo",
            PaymentMethod::Debito => "debito",
            PaymentMethod::Credito => "credito",
            PaymentMethod::Transferencia => "transferencia",
        }
    }

    /// Label shown to the cashier.
    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Efectivo => "Efectivo",
            PaymentMethod::Debito => "Débito",
            PaymentMethod::Credito => "Crédito",
            PaymentMethod::Transferencia => "Transferencia",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "Medio de pago".to_string(),
                allowed: PaymentMethod::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Price Kind
// =============================================================================

/// Which of the two product prices a history entry or update refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceKind {
    Venta,
    Costo,
}

impl PriceKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PriceKind::Venta => "venta",
            PriceKind::Costo => "costo",
        }
    }
}

impl fmt::Display for PriceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Replenish Mode
// =============================================================================

/// How a product is restocked: one unit at a time or by the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplenishMode {
    #[default]
    Unitario,
    Cajon,
}

impl ReplenishMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ReplenishMode::Unitario => "unitario",
            ReplenishMode::Cajon => "cajon",
        }
    }

    /// Factor preselected by the create-product form.
    pub const fn default_factor(&self) -> i64 {
        match self {
            ReplenishMode::Unitario => 1,
            ReplenishMode::Cajon => crate::MAPLES_PER_CAJON,
        }
    }
}

impl fmt::Display for ReplenishMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplenishMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unitario" => Ok(ReplenishMode::Unitario),
            "cajon" | "cajón" => Ok(ReplenishMode::Cajon),
            _ => Err(ValidationError::NotAllowed {
                field: "Modo de reposición".to_string(),
                allowed: vec!["unitario".to_string(), "cajon".to_string()],
            }),
        }
    }
}

// =============================================================================
// Stock Item
// =============================================================================

/// A product row as returned by `stock_listar`.
///
/// The backend stores `activo` as an integer column, so both `1`/`0` and
/// `true`/`false` are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    pub id_producto: ProductId,

    #[serde(alias = "codigo_producto")]
    pub codigo: String,

    pub nombre: String,

    pub stock_actual: i64,

    pub precio_venta_actual: Money,

    pub costo_actual: Money,

    #[serde(deserialize_with = "deserialize_flag")]
    pub activo: bool,

    #[serde(default)]
    pub reposicion_modo: Option<ReplenishMode>,

    #[serde(default)]
    pub reposicion_factor: Option<i64>,
}

/// Arguments of `stock_listar`. Sent flat, not wrapped in `input`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StockListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    pub solo_activos: bool,
    pub limit: u32,
    pub offset: u32,
}

impl StockListQuery {
    /// Query for the sale screen's product picker.
    pub fn active(q: Option<String>, limit: u32) -> Self {
        Self {
            q: q.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            solo_activos: true,
            limit,
            offset: 0,
        }
    }
}

// =============================================================================
// Users
// =============================================================================

/// Entry of the employee/operator selectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserOption {
    pub id_usuario: UserId,
    pub nombre: String,
}

// =============================================================================
// Serde Helpers
// =============================================================================

/// Accepts a boolean flag encoded as `true`/`false`, `1`/`0` or `"1"`/`"0"`.
pub fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Int(n) => Ok(n != 0),
        Flag::Text(s) => match s.trim().to_lowercase().as_str() {
            "1" | "true" => Ok(true),
            "0" | "false" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "valor booleano inválido: {other}"
            ))),
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stock_item_accepts_backend_row() {
        let row = json!({
            "id_producto": 7,
            "codigo_producto": "P001",
            "nombre": "Maple blanco",
            "stock_actual": 40,
            "precio_venta_actual": 5200,
            "costo_actual": 4100,
            "activo": 1
        });

        let item: StockItem = serde_json::from_value(row).unwrap();
        assert_eq!(item.codigo, "P001");
        assert!(item.activo);
        assert_eq!(item.precio_venta_actual, Money::from_pesos(5200));
        assert_eq!(item.reposicion_modo, None);
    }

    #[test]
    fn test_stock_item_inactive_flag() {
        let row = json!({
            "id_producto": 8,
            "codigo": "P002",
            "nombre": "Maple color",
            "stock_actual": 0,
            "precio_venta_actual": 0,
            "costo_actual": 0,
            "activo": false
        });

        let item: StockItem = serde_json::from_value(row).unwrap();
        assert!(!item.activo);
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("Efectivo".parse::<PaymentMethod>().unwrap(), PaymentMethod::Efectivo);
        assert_eq!(" debito ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Debito);
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_payment_method_wire_format() {
        let json = serde_json::to_value(PaymentMethod::Transferencia).unwrap();
        assert_eq!(json, json!("transferencia"));
    }

    #[test]
    fn test_replenish_mode_factor() {
        assert_eq!(ReplenishMode::Unitario.default_factor(), 1);
        assert_eq!(ReplenishMode::Cajon.default_factor(), 12);
        assert_eq!("cajón".parse::<ReplenishMode>().unwrap(), ReplenishMode::Cajon);
    }

    #[test]
    fn test_stock_list_query_trims_search() {
        let query = StockListQuery::active(Some("   ".to_string()), 50);
        assert_eq!(query.q, None);
        assert!(query.solo_activos);

        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, json!({"solo_activos": true, "limit": 50, "offset": 0}));
    }
}

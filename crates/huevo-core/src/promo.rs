//! # Promo Module
//!
//! Combo promotions: drafting a combo, the backend rows, and the pricing rule
//! applied when a combo is added to a sale.
//!
//! ## Apply Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  promo_combo_detalle ──► default_pack_price()                           │
//! │                            precio_pack > 0 ? precio_pack                │
//! │                                            : max(min, total_sugerido)   │
//! │        │                                                                │
//! │        ▼  cashier may override the price                                │
//! │  ensure_can_apply()  ── caja closed ─────────► CajaClosed               │
//! │                      ── price < min ─────────► PriceBelowMinimum        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  venta_aplicar_promo_combo ──► venta_listar                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::caja::CajaState;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{deserialize_flag, ComboId, ProductId, SaleId, StockItem};
use crate::validation::{validate_nombre, validate_price, validate_quantity};

// =============================================================================
// Create
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboItemInput {
    pub id_producto: ProductId,
    pub cantidad: i64,
}

/// `promo_combo_crear` input. The minimum is no longer edited from the
/// form and is always sent as zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComboCreateInput {
    pub nombre: String,
    pub precio_pack: Money,
    pub precio_min_total: Money,
    pub items: Vec<ComboItemInput>,
}

/// Products picked in the "Nueva promo" form, keyed by product id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComboDraft {
    selection: BTreeMap<ProductId, i64>,
}

impl ComboDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the product with quantity 1, or removes it if already picked.
    pub fn toggle(&mut self, id_producto: ProductId) {
        if self.selection.remove(&id_producto).is_none() {
            self.selection.insert(id_producto, 1);
        }
    }

    /// Sets a quantity; zero or less drops the product.
    pub fn set_quantity(&mut self, id_producto: ProductId, cantidad: i64) {
        if cantidad <= 0 {
            self.selection.remove(&id_producto);
        } else {
            self.selection.insert(id_producto, cantidad);
        }
    }

    pub fn remove(&mut self, id_producto: ProductId) {
        self.selection.remove(&id_producto);
    }

    pub fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    pub fn items(&self) -> Vec<ComboItemInput> {
        self.selection
            .iter()
            .map(|(&id_producto, &cantidad)| ComboItemInput {
                id_producto,
                cantidad,
            })
            .collect()
    }

    /// Reference total at current sale prices. Products missing from
    /// `catalog` are ignored.
    pub fn suggested_total(&self, catalog: &[StockItem]) -> Money {
        self.selection
            .iter()
            .filter_map(|(id, qty)| {
                catalog
                    .iter()
                    .find(|p| p.id_producto == *id)
                    .map(|p| p.precio_venta_actual.multiply_quantity(*qty))
            })
            .sum()
    }
}

/// Validates the create form.
///
/// ## Rules
/// - Name not blank
/// - Pack price ≥ 0
/// - At least one product, each with quantity > 0
pub fn plan_create_combo(
    nombre: &str,
    precio_pack: Money,
    items: Vec<ComboItemInput>,
) -> CoreResult<ComboCreateInput> {
    let nombre = validate_nombre(nombre)?;
    validate_price("Precio pack", precio_pack)?;
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "Productos".to_string(),
        }
        .into());
    }
    for item in &items {
        validate_quantity("Cantidad", item.cantidad)?;
    }

    Ok(ComboCreateInput {
        nombre,
        precio_pack,
        precio_min_total: Money::zero(),
        items,
    })
}

// =============================================================================
// Rows
// =============================================================================

/// Row of `promo_combo_listar`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboListRow {
    pub id_combo: ComboId,
    pub nombre: String,
    pub precio_pack: Money,
    pub precio_min_total: Money,
    #[serde(deserialize_with = "deserialize_flag")]
    pub activo: bool,
    #[serde(default)]
    pub resumen: String,
}

/// Combo header inside `promo_combo_detalle`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboRow {
    pub id_combo: ComboId,
    pub nombre: String,
    pub precio_pack: Money,
    pub precio_min_total: Money,
    #[serde(deserialize_with = "deserialize_flag")]
    pub activo: bool,
    #[serde(default)]
    pub creado_en: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboItemRow {
    pub id_producto: ProductId,
    pub nombre: String,
    pub cantidad: i64,
    pub precio_unitario: Money,
    pub subtotal_sugerido: Money,
}

/// `promo_combo_detalle` reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboDetail {
    pub combo: ComboRow,
    pub items: Vec<ComboItemRow>,
    pub total_sugerido: Money,
}

// =============================================================================
// Apply To Sale
// =============================================================================

/// `venta_aplicar_promo_combo` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApplyComboInput {
    pub id_venta: SaleId,
    pub id_combo: ComboId,
    pub precio_total_pack: Money,
}

/// Price the apply form opens with.
///
/// ## Example
/// ```rust
/// use huevo_core::money::Money;
/// use huevo_core::promo::default_pack_price;
///
/// let p = default_pack_price(Money::zero(), Money::from_pesos(900), Money::from_pesos(1000));
/// assert_eq!(p, Money::from_pesos(1000));
/// ```
pub fn default_pack_price(precio_pack: Money, precio_min_total: Money, total_sugerido: Money) -> Money {
    if precio_pack.is_positive() {
        precio_pack
    } else {
        precio_min_total.max(total_sugerido)
    }
}

impl ComboDetail {
    pub fn default_price(&self) -> Money {
        default_pack_price(
            self.combo.precio_pack,
            self.combo.precio_min_total,
            self.total_sugerido,
        )
    }
}

/// Client-side checks before applying a combo. Nothing is sent when this
/// fails.
pub fn ensure_can_apply(caja: CajaState, detail: &ComboDetail, precio: Money) -> CoreResult<()> {
    caja.ensure_open()?;
    validate_price("Precio pack", precio)?;
    if precio < detail.combo.precio_min_total {
        return Err(CoreError::PriceBelowMinimum {
            precio,
            minimo: detail.combo.precio_min_total,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

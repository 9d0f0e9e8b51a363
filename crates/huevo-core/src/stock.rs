//! # Stock Module
//!
//! Inventory rules of the admin stock screens: update planning, product
//! creation, shrinkage (merma), purchases, replenishment settings and the
//! merged history timeline.
//!
//! ## Update Planning
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    "Actualizar" form → command plan                     │
//! │                                                                         │
//! │  action = cantidad | precio_venta | costo | ambos                      │
//! │                                                                         │
//! │  cantidad, mode=delta ── Δ = 0 ──────────────► (no call)               │
//! │                       ── actual + Δ < 0 ─────► NegativeStock           │
//! │                       ── otherwise ──────────► stock_ajustar           │
//! │                                                 ingreso_manual (Δ > 0)  │
//! │                                                 egreso_manual  (Δ < 0)  │
//! │  cantidad, mode=fijar ── nuevo < 0 ──────────► Negative                │
//! │                       ── nuevo = actual ─────► (no call)               │
//! │                       ── otherwise ──────────► stock_fijar_absoluto    │
//! │  precio venta / costo ── value < 0 ──────────► Negative                │
//! │                       ── value = current ────► (no call)               │
//! │                       ── otherwise ──────────► precio_actualizar       │
//! │                                                                         │
//! │  Empty plan ─────────────────────────────────► NothingToUpdate         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A zero delta therefore fails when it is the only change and is silently
//! skipped when a price change rides along under "ambos".

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{PriceKind, ProductId, ReplenishMode, StockItem, UserId};
use crate::validation::{
    optional_text, validate_codigo, validate_nombre, validate_non_negative, validate_price,
    validate_quantity,
};
use crate::MAPLES_PER_CAJON;

// =============================================================================
// Motives
// =============================================================================

pub const MOTIVO_INGRESO_INICIAL: &str = "ingreso_inicial";
pub const MOTIVO_INGRESO_MANUAL: &str = "ingreso_manual";
pub const MOTIVO_EGRESO_MANUAL: &str = "egreso_manual";
pub const MOTIVO_AJUSTE_ABSOLUTO: &str = "ajuste_absoluto_ui";

/// Reference attached to the initial stock movement of a new product.
pub const REFERENCIA_ALTA_PRODUCTO: &str = "alta_producto";

// =============================================================================
// Command Inputs
// =============================================================================

/// `stock_ajustar` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockAdjustInput {
    pub id_producto: ProductId,
    pub delta: i64,
    pub motivo: String,
    pub referencia: Option<String>,
}

/// `stock_fijar_absoluto` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockSetInput {
    pub id_producto: ProductId,
    pub nuevo: i64,
    pub motivo: String,
    pub referencia: Option<String>,
}

/// `precio_actualizar` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceUpdateInput {
    pub id_producto: ProductId,
    pub tipo: PriceKind,
    pub nuevo: Money,
}

/// `producto_set_activo` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SetActiveInput {
    pub id_producto: ProductId,
    pub activo: bool,
}

/// One backend call of an update plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockCall {
    Adjust(StockAdjustInput),
    Set(StockSetInput),
    Price(PriceUpdateInput),
}

impl StockCall {
    pub const fn command(&self) -> &'static str {
        match self {
            StockCall::Adjust(_) => "stock_ajustar",
            StockCall::Set(_) => "stock_fijar_absoluto",
            StockCall::Price(_) => "precio_actualizar",
        }
    }
}

// =============================================================================
// Update Planning
// =============================================================================

/// What the "Actualizar" form changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAction {
    Cantidad,
    PrecioVenta,
    Costo,
    Ambos,
}

impl UpdateAction {
    const fn touches_quantity(&self) -> bool {
        matches!(self, UpdateAction::Cantidad | UpdateAction::Ambos)
    }

    const fn touches_venta(&self) -> bool {
        matches!(self, UpdateAction::PrecioVenta | UpdateAction::Ambos)
    }

    const fn touches_costo(&self) -> bool {
        matches!(self, UpdateAction::Costo | UpdateAction::Ambos)
    }
}

impl FromStr for UpdateAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cantidad" => Ok(UpdateAction::Cantidad),
            "precio_venta" | "venta" => Ok(UpdateAction::PrecioVenta),
            "costo" => Ok(UpdateAction::Costo),
            "ambos" => Ok(UpdateAction::Ambos),
            _ => Err(ValidationError::NotAllowed {
                field: "Acción".to_string(),
                allowed: ["cantidad", "precio_venta", "costo", "ambos"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

/// Relative or absolute quantity change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuantityMode {
    #[default]
    Delta,
    Fijar,
}

impl FromStr for QuantityMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "delta" => Ok(QuantityMode::Delta),
            "fijar" => Ok(QuantityMode::Fijar),
            _ => Err(ValidationError::NotAllowed {
                field: "Modo".to_string(),
                allowed: vec!["delta".to_string(), "fijar".to_string()],
            }),
        }
    }
}

/// Values entered in the "Actualizar" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockUpdateForm {
    pub action: UpdateAction,
    pub mode: QuantityMode,
    /// Delta or new absolute stock, depending on `mode`.
    pub cantidad: i64,
    pub precio_venta: Money,
    pub costo: Money,
    pub nota: Option<String>,
}

impl StockUpdateForm {
    /// Form as it opens for `item`: prices prefilled, quantity zero.
    pub fn for_item(item: &StockItem, action: UpdateAction) -> Self {
        StockUpdateForm {
            action,
            mode: QuantityMode::Delta,
            cantidad: 0,
            precio_venta: item.precio_venta_actual,
            costo: item.costo_actual,
            nota: None,
        }
    }
}

/// Turns the form into the ordered list of calls to issue.
///
/// Calls run in order: quantity first, then sale price, then cost.
pub fn plan_update(item: &StockItem, form: &StockUpdateForm) -> CoreResult<Vec<StockCall>> {
    let referencia = optional_text(form.nota.as_deref());
    let mut calls = Vec::new();

    if form.action.touches_quantity() {
        match form.mode {
            QuantityMode::Delta => {
                let delta = form.cantidad;
                if delta != 0 {
                    let resultante = item.stock_actual.checked_add(delta).ok_or_else(|| {
                        ValidationError::Overflow {
                            field: "Cantidad".to_string(),
                        }
                    })?;
                    if resultante < 0 {
                        return Err(CoreError::NegativeStock {
                            actual: item.stock_actual,
                            delta,
                        });
                    }
                    calls.push(StockCall::Adjust(StockAdjustInput {
                        id_producto: item.id_producto,
                        delta,
                        motivo: if delta > 0 {
                            MOTIVO_INGRESO_MANUAL
                        } else {
                            MOTIVO_EGRESO_MANUAL
                        }
                        .to_string(),
                        referencia: referencia.clone(),
                    }));
                }
            }
            QuantityMode::Fijar => {
                let nuevo = form.cantidad;
                validate_non_negative("Nuevo stock", nuevo)?;
                if nuevo != item.stock_actual {
                    calls.push(StockCall::Set(StockSetInput {
                        id_producto: item.id_producto,
                        nuevo,
                        motivo: MOTIVO_AJUSTE_ABSOLUTO.to_string(),
                        referencia: referencia.clone(),
                    }));
                }
            }
        }
    }

    if form.action.touches_venta() {
        validate_price("Precio venta", form.precio_venta)?;
        if form.precio_venta != item.precio_venta_actual {
            calls.push(StockCall::Price(PriceUpdateInput {
                id_producto: item.id_producto,
                tipo: PriceKind::Venta,
                nuevo: form.precio_venta,
            }));
        }
    }

    if form.action.touches_costo() {
        validate_price("Costo", form.costo)?;
        if form.costo != item.costo_actual {
            calls.push(StockCall::Price(PriceUpdateInput {
                id_producto: item.id_producto,
                tipo: PriceKind::Costo,
                nuevo: form.costo,
            }));
        }
    }

    if calls.is_empty() {
        return Err(CoreError::NothingToUpdate);
    }
    Ok(calls)
}

// =============================================================================
// Product Creation
// =============================================================================

/// Values entered in the "Nuevo producto" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductForm {
    pub codigo: String,
    pub nombre: String,
    pub precio_venta: Money,
    pub costo: Money,
    pub stock_inicial: i64,
    pub reposicion_modo: ReplenishMode,
    pub reposicion_factor: i64,
}

/// `producto_crear` input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCreateInput {
    pub codigo: String,
    pub nombre: String,
    pub precio_venta: Money,
    pub costo: Money,
    pub reposicion_modo: ReplenishMode,
    pub reposicion_factor: i64,
}

/// `producto_crear` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ProductIdReply {
    pub id_producto: ProductId,
}

/// Validated creation plan: the create call, then an optional initial
/// stock movement once the new id is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCreatePlan {
    pub input: ProductCreateInput,
    pub stock_inicial: i64,
}

impl ProductCreatePlan {
    /// `stock_ajustar` to issue after `producto_crear`, if any.
    pub fn initial_stock(&self, id_producto: ProductId) -> Option<StockAdjustInput> {
        (self.stock_inicial > 0).then(|| StockAdjustInput {
            id_producto,
            delta: self.stock_inicial,
            motivo: MOTIVO_INGRESO_INICIAL.to_string(),
            referencia: Some(REFERENCIA_ALTA_PRODUCTO.to_string()),
        })
    }
}

/// Validates the create form.
pub fn plan_create_product(form: &NewProductForm) -> CoreResult<ProductCreatePlan> {
    let codigo = validate_codigo(&form.codigo)?;
    let nombre = validate_nombre(&form.nombre)?;
    validate_price("Precio venta", form.precio_venta)?;
    validate_price("Costo", form.costo)?;
    validate_non_negative("Stock inicial", form.stock_inicial)?;
    let reposicion_factor = normalize_factor(form.reposicion_modo, form.reposicion_factor)?;

    Ok(ProductCreatePlan {
        input: ProductCreateInput {
            codigo,
            nombre,
            precio_venta: form.precio_venta,
            costo: form.costo,
            reposicion_modo: form.reposicion_modo,
            reposicion_factor,
        },
        stock_inicial: form.stock_inicial,
    })
}

// =============================================================================
// Replenishment Settings
// =============================================================================

/// `producto_actualizar_reposicion` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReplenishUpdateInput {
    pub id_producto: ProductId,
    pub reposicion_modo: ReplenishMode,
    pub reposicion_factor: i64,
}

/// Unitario always restocks one at a time; cajón needs a factor of at
/// least one.
pub fn normalize_factor(modo: ReplenishMode, factor: i64) -> CoreResult<i64> {
    match modo {
        ReplenishMode::Unitario => Ok(1),
        ReplenishMode::Cajon => {
            if factor < 1 {
                return Err(ValidationError::OutOfRange {
                    field: "Factor de reposición".to_string(),
                    min: 1,
                    max: i64::MAX,
                }
                .into());
            }
            Ok(factor)
        }
    }
}

pub fn plan_replenish_update(
    id_producto: ProductId,
    modo: ReplenishMode,
    factor: i64,
) -> CoreResult<ReplenishUpdateInput> {
    Ok(ReplenishUpdateInput {
        id_producto,
        reposicion_modo: modo,
        reposicion_factor: normalize_factor(modo, factor)?,
    })
}

// =============================================================================
// Activation
// =============================================================================

/// Confirmation text for toggling a product. Deactivation never deletes
/// anything and the prompt says so.
pub fn set_active_confirmation(item: &StockItem, activo: bool) -> String {
    if activo {
        format!("¿Reactivar «{}»? Vuelve a estar disponible para la venta.", item.nombre)
    } else {
        format!(
            "¿Desactivar «{}»? Deja de ofrecerse en ventas; su historial de movimientos y precios se conserva.",
            item.nombre
        )
    }
}

// =============================================================================
// Merma (Shrinkage)
// =============================================================================

/// Fixed shrinkage motives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MermaMotivo {
    Merma,
    Vencimiento,
    Rotura,
    Robo,
}

impl MermaMotivo {
    pub const ALL: [MermaMotivo; 4] = [
        MermaMotivo::Merma,
        MermaMotivo::Vencimiento,
        MermaMotivo::Rotura,
        MermaMotivo::Robo,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            MermaMotivo::Merma => "merma",
            MermaMotivo::Vencimiento => "vencimiento",
            MermaMotivo::Rotura => "rotura",
            MermaMotivo::Robo => "robo",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            MermaMotivo::Merma => "Merma general",
            MermaMotivo::Vencimiento => "Vencimiento",
            MermaMotivo::Rotura => "Rotura",
            MermaMotivo::Robo => "Robo",
        }
    }
}

impl FromStr for MermaMotivo {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        MermaMotivo::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "Motivo".to_string(),
                allowed: MermaMotivo::ALL.iter().map(|m| m.as_str().to_string()).collect(),
            })
    }
}

/// `stock_registrar_merma` input. `cantidad` is positive; the backend
/// records it as an outgoing movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MermaInput {
    pub id_producto: ProductId,
    pub cantidad: i64,
    pub motivo: MermaMotivo,
    pub observacion: Option<String>,
    pub id_usuario: UserId,
}

pub fn plan_merma(
    id_producto: ProductId,
    cantidad: i64,
    motivo: MermaMotivo,
    observacion: Option<&str>,
    id_usuario: UserId,
) -> CoreResult<MermaInput> {
    validate_quantity("Cantidad", cantidad)?;
    Ok(MermaInput {
        id_producto,
        cantidad,
        motivo,
        observacion: optional_text(observacion),
        id_usuario,
    })
}

// =============================================================================
// Purchases
// =============================================================================

/// `registrar_compra` arguments. Sent flat with camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitPurchaseInput {
    pub id_producto: ProductId,
    pub cantidad: i64,
    pub costo_unitario: Money,
    pub referencia: Option<String>,
    pub mantener_costo: bool,
}

/// Validates a purchase priced per unit.
///
/// "Mantener costo" only takes effect when the cost typed in still equals
/// the product's current cost; editing the cost overrides the checkbox.
pub fn plan_unit_purchase(
    item: &StockItem,
    cantidad: i64,
    costo_unitario: Money,
    referencia: Option<&str>,
    mantener_costo: bool,
) -> CoreResult<UnitPurchaseInput> {
    validate_quantity("Cantidad", cantidad)?;
    validate_price("Costo unitario", costo_unitario)?;

    Ok(UnitPurchaseInput {
        id_producto: item.id_producto,
        cantidad,
        costo_unitario,
        referencia: optional_text(referencia),
        mantener_costo: mantener_costo && costo_unitario == item.costo_actual,
    })
}

/// Unit in which a crate purchase is counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PurchaseUnit {
    #[default]
    Maple,
    Cajon,
}

impl PurchaseUnit {
    pub const fn maples_per_unit(&self) -> i64 {
        match self {
            PurchaseUnit::Maple => 1,
            PurchaseUnit::Cajon => MAPLES_PER_CAJON,
        }
    }
}

impl fmt::Display for PurchaseUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PurchaseUnit::Maple => "maples",
            PurchaseUnit::Cajon => "cajones",
        })
    }
}

impl FromStr for PurchaseUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "MAPLE" | "MAPLES" => Ok(PurchaseUnit::Maple),
            "CAJON" | "CAJÓN" | "CAJONES" => Ok(PurchaseUnit::Cajon),
            _ => Err(ValidationError::NotAllowed {
                field: "Unidad".to_string(),
                allowed: vec!["MAPLE".to_string(), "CAJON".to_string()],
            }),
        }
    }
}

/// `stock_compra` input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CratePurchaseInput {
    pub id_producto: ProductId,
    pub unidad: PurchaseUnit,
    pub cantidad: i64,
    pub costo_total: Money,
}

/// What a crate purchase will add, shown before confirming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CratePurchasePreview {
    pub maples: i64,
    pub costo_unitario: Money,
}

/// ## Example
/// ```rust
/// use huevo_core::money::Money;
/// use huevo_core::stock::{preview_crate_purchase, PurchaseUnit};
///
/// let p = preview_crate_purchase(PurchaseUnit::Cajon, 2, Money::from_pesos(48000));
/// assert_eq!(p.maples, 24);
/// assert_eq!(p.costo_unitario, Money::from_pesos(2000));
/// ```
pub fn preview_crate_purchase(
    unidad: PurchaseUnit,
    cantidad: i64,
    costo_total: Money,
) -> CratePurchasePreview {
    let maples = cantidad.max(0).saturating_mul(unidad.maples_per_unit());
    CratePurchasePreview {
        maples,
        costo_unitario: costo_total.split_floor(maples).unwrap_or_default(),
    }
}

pub fn plan_crate_purchase(
    id_producto: ProductId,
    unidad: PurchaseUnit,
    cantidad: i64,
    costo_total: Money,
) -> CoreResult<CratePurchaseInput> {
    validate_quantity("Cantidad", cantidad)?;
    validate_price("Costo total", costo_total)?;
    if cantidad.checked_mul(unidad.maples_per_unit()).is_none() {
        return Err(ValidationError::Overflow {
            field: "Cantidad".to_string(),
        }
        .into());
    }
    Ok(CratePurchaseInput {
        id_producto,
        unidad,
        cantidad,
        costo_total,
    })
}

// =============================================================================
// History Timeline
// =============================================================================

/// Row of `stock_mov_listar`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id_movimiento: i64,
    pub cantidad_delta: i64,
    #[serde(default)]
    pub motivo: String,
    #[serde(default)]
    pub referencia: Option<String>,
    pub fecha_hora: String,
}

/// Row of `precio_hist_listar`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    pub id_precio: i64,
    pub tipo: PriceKind,
    pub precio: i64,
    pub vigente_desde: String,
    #[serde(default)]
    pub vigente_hasta: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineKind {
    Stock,
    Precio,
}

impl TimelineKind {
    pub const fn label(&self) -> &'static str {
        match self {
            TimelineKind::Stock => "Stock",
            TimelineKind::Precio => "Precio",
        }
    }
}

/// One entry of the product history panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineEvent {
    pub t: TimelineKind,
    pub fecha: String,
    pub desc: String,
    #[serde(rename = "badgeClass")]
    pub badge_class: &'static str,
}

const BADGE_STOCK_IN: &str = "bg-emerald-50 text-emerald-700";
const BADGE_STOCK_OUT: &str = "bg-red-50 text-red-700";
const BADGE_PRICE_VENTA: &str = "bg-blue-50 text-blue-700";
const BADGE_PRICE_COSTO: &str = "bg-purple-50 text-purple-700";

/// Human label for a movement motive.
///
/// ## Example
/// ```rust
/// use huevo_core::stock::humanize_motivo;
///
/// assert_eq!(humanize_motivo("ingreso_manual", 5), "Ingreso manual");
/// assert_eq!(humanize_motivo("ajuste_absoluto_ui", -3), "Ajuste ↓");
/// assert_eq!(humanize_motivo("carga_por_lote", 1), "Carga Por Lote");
/// ```
pub fn humanize_motivo(motivo: &str, delta: i64) -> String {
    let m = motivo.trim().to_lowercase();

    let fixed = match m.as_str() {
        "ingreso_inicial" => Some("Ingreso inicial"),
        "ingreso_manual" => Some("Ingreso manual"),
        "egreso_manual" => Some("Egreso manual"),
        "venta" => Some("Venta"),
        "devolucion" => Some("Devolución"),
        "compra" => Some("Compra"),
        "merma" => Some("Merma"),
        _ => None,
    };
    if let Some(label) = fixed {
        return label.to_string();
    }

    if m.starts_with("ajuste_absoluto") {
        return if delta > 0 { "Ajuste ↑" } else { "Ajuste ↓" }.to_string();
    }

    m.replace('_', " ")
        .split(' ')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Reference suffix for a movement. Blank and internal references are hidden.
pub fn humanize_referencia(referencia: Option<&str>) -> String {
    match referencia.map(str::trim) {
        None | Some("") => String::new(),
        Some(r) if r.eq_ignore_ascii_case(REFERENCIA_ALTA_PRODUCTO) => String::new(),
        Some(r) => format!(" · Ref. {r}"),
    }
}

pub fn movement_event(mov: &StockMovement) -> TimelineEvent {
    let delta = mov.cantidad_delta;
    let sign = if delta > 0 {
        format!("+{delta}")
    } else {
        format!("-{}", delta.abs())
    };
    TimelineEvent {
        t: TimelineKind::Stock,
        fecha: mov.fecha_hora.clone(),
        desc: format!(
            "Stock {sign} · {}{}",
            humanize_motivo(&mov.motivo, delta),
            humanize_referencia(mov.referencia.as_deref())
        ),
        badge_class: if delta > 0 { BADGE_STOCK_IN } else { BADGE_STOCK_OUT },
    }
}

pub fn price_event(entry: &PriceHistoryEntry) -> TimelineEvent {
    TimelineEvent {
        t: TimelineKind::Precio,
        fecha: entry.vigente_desde.clone(),
        desc: format!("Precio {}: {}", entry.tipo, entry.precio),
        badge_class: match entry.tipo {
            PriceKind::Venta => BADGE_PRICE_VENTA,
            PriceKind::Costo => BADGE_PRICE_COSTO,
        },
    }
}

/// Merges the three history sources into the product timeline.
///
/// Events are ordered newest first by their timestamp text; equal
/// timestamps keep source order (movements, then sale prices, then costs).
/// At most `max_entries` survive.
pub fn merge_timeline(
    movimientos: &[StockMovement],
    precios_venta: &[PriceHistoryEntry],
    precios_costo: &[PriceHistoryEntry],
    max_entries: usize,
) -> Vec<TimelineEvent> {
    let mut events: Vec<TimelineEvent> = movimientos
        .iter()
        .map(movement_event)
        .chain(precios_venta.iter().map(price_event))
        .chain(precios_costo.iter().map(price_event))
        .collect();

    events.sort_by(|a, b| b.fecha.cmp(&a.fecha));
    events.truncate(max_entries);
    events
}

/// Renders a backend UTC timestamp in Buenos Aires time (UTC−3).
///
/// Accepts `YYYY-MM-DD HH:MM:SS` and RFC 3339. Anything else is returned
/// unchanged.
pub fn format_buenos_aires(fecha: &str) -> String {
    let Some(offset) = FixedOffset::west_opt(3 * 3600) else {
        return fecha.to_string();
    };

    let utc: Option<DateTime<Utc>> = NaiveDateTime::parse_from_str(fecha.trim(), "%Y-%m-%d %H:%M:%S")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(fecha.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        });

    match utc {
        Some(dt) => dt
            .with_timezone(&offset)
            .format("%d/%m/%Y %H:%M")
            .to_string(),
        None => fecha.to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(stock: i64, venta: i64, costo: i64) -> StockItem {
        StockItem {
            id_producto: 1,
            codigo: "P001".to_string(),
            nombre: "Maple blanco".to_string(),
            stock_actual: stock,
            precio_venta_actual: Money::from_pesos(venta),
            costo_actual: Money::from_pesos(costo),
            activo: true,
            reposicion_modo: None,
            reposicion_factor: None,
        }
    }

    fn form(action: UpdateAction, mode: QuantityMode, cantidad: i64, it: &StockItem) -> StockUpdateForm {
        StockUpdateForm {
            mode,
            cantidad,
            ..StockUpdateForm::for_item(it, action)
        }
    }

    #[test]
    fn test_delta_plan_motives() {
        let it = item(10, 500, 400);

        let calls = plan_update(&it, &form(UpdateAction::Cantidad, QuantityMode::Delta, 5, &it)).unwrap();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            StockCall::Adjust(input) => {
                assert_eq!(input.delta, 5);
                assert_eq!(input.motivo, "ingreso_manual");
                assert_eq!(input.referencia, None);
            }
            other => panic!("unexpected call {other:?}"),
        }

        let calls = plan_update(&it, &form(UpdateAction::Cantidad, QuantityMode::Delta, -10, &it)).unwrap();
        assert!(matches!(&calls[0], StockCall::Adjust(i) if i.motivo == "egreso_manual"));
    }

    #[test]
    fn test_delta_cannot_go_negative() {
        let it = item(3, 500, 400);
        let err = plan_update(&it, &form(UpdateAction::Cantidad, QuantityMode::Delta, -4, &it)).unwrap_err();
        assert!(matches!(err, CoreError::NegativeStock { actual: 3, delta: -4 }));
    }

    #[test]
    fn test_delta_overflow_is_validation_error() {
        let it = item(10, 500, 400);
        let err = plan_update(&it, &form(UpdateAction::Cantidad, QuantityMode::Delta, i64::MAX, &it)).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Cantidad: valor fuera de rango.");
    }

    #[test]
    fn test_zero_delta_rejected_alone_tolerated_with_ambos() {
        let it = item(10, 500, 400);

        let err = plan_update(&it, &form(UpdateAction::Cantidad, QuantityMode::Delta, 0, &it)).unwrap_err();
        assert!(matches!(err, CoreError::NothingToUpdate));

        let mut ambos = form(UpdateAction::Ambos, QuantityMode::Delta, 0, &it);
        ambos.precio_venta = Money::from_pesos(550);
        let calls = plan_update(&it, &ambos).unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].command(), "precio_actualizar");
    }

    #[test]
    fn test_fijar_plan() {
        let it = item(10, 500, 400);

        let calls = plan_update(&it, &form(UpdateAction::Cantidad, QuantityMode::Fijar, 0, &it)).unwrap();
        assert!(matches!(&calls[0], StockCall::Set(s) if s.nuevo == 0 && s.motivo == "ajuste_absoluto_ui"));

        assert!(matches!(
            plan_update(&it, &form(UpdateAction::Cantidad, QuantityMode::Fijar, 10, &it)),
            Err(CoreError::NothingToUpdate)
        ));
        assert!(plan_update(&it, &form(UpdateAction::Cantidad, QuantityMode::Fijar, -1, &it))
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_prices_only_sent_when_changed() {
        let it = item(10, 500, 400);
        let mut f = form(UpdateAction::Ambos, QuantityMode::Delta, 2, &it);
        f.costo = Money::from_pesos(450);
        f.nota = Some("  remito 44 ".to_string());

        let calls = plan_update(&it, &f).unwrap();
        let commands: Vec<_> = calls.iter().map(StockCall::command).collect();
        assert_eq!(commands, vec!["stock_ajustar", "precio_actualizar"]);
        assert!(matches!(&calls[0], StockCall::Adjust(a) if a.referencia.as_deref() == Some("remito 44")));
        assert!(matches!(&calls[1], StockCall::Price(p) if p.tipo == PriceKind::Costo));

        let mut negative = form(UpdateAction::PrecioVenta, QuantityMode::Delta, 0, &it);
        negative.precio_venta = Money::from_pesos(-1);
        assert!(plan_update(&it, &negative).is_err());
    }

    #[test]
    fn test_create_product_plan() {
        let f = NewProductForm {
            codigo: " P001 ".to_string(),
            nombre: "Maple blanco".to_string(),
            precio_venta: Money::from_pesos(5200),
            costo: Money::from_pesos(4100),
            stock_inicial: 30,
            reposicion_modo: ReplenishMode::Cajon,
            reposicion_factor: 12,
        };
        let plan = plan_create_product(&f).unwrap();
        assert_eq!(plan.input.codigo, "P001");

        let initial = plan.initial_stock(99).unwrap();
        assert_eq!(initial.delta, 30);
        assert_eq!(initial.motivo, "ingreso_inicial");
        assert_eq!(initial.referencia.as_deref(), Some("alta_producto"));

        let no_stock = NewProductForm {
            stock_inicial: 0,
            reposicion_modo: ReplenishMode::Unitario,
            reposicion_factor: 12,
            ..f.clone()
        };
        let plan = plan_create_product(&no_stock).unwrap();
        assert!(plan.initial_stock(99).is_none());
        assert_eq!(plan.input.reposicion_factor, 1);

        let bad = NewProductForm {
            codigo: "".to_string(),
            ..f
        };
        assert!(plan_create_product(&bad).is_err());
    }

    #[test]
    fn test_normalize_factor() {
        assert_eq!(normalize_factor(ReplenishMode::Unitario, 30).unwrap(), 1);
        assert_eq!(normalize_factor(ReplenishMode::Cajon, 6).unwrap(), 6);
        assert!(normalize_factor(ReplenishMode::Cajon, 0).is_err());
    }

    #[test]
    fn test_merma_plan() {
        let input = plan_merma(1, 3, MermaMotivo::Rotura, Some(" "), 5).unwrap();
        assert_eq!(input.observacion, None);
        assert!(plan_merma(1, 0, MermaMotivo::Merma, None, 5).is_err());
        assert!("perdida".parse::<MermaMotivo>().is_err());
        assert_eq!("ROBO".parse::<MermaMotivo>().unwrap(), MermaMotivo::Robo);
    }

    #[test]
    fn test_unit_purchase_keep_cost_rule() {
        let it = item(10, 500, 400);

        let keep = plan_unit_purchase(&it, 5, Money::from_pesos(400), None, true).unwrap();
        assert!(keep.mantener_costo);

        let edited = plan_unit_purchase(&it, 5, Money::from_pesos(420), None, true).unwrap();
        assert!(!edited.mantener_costo);

        assert!(plan_unit_purchase(&it, 0, Money::from_pesos(400), None, false).is_err());
        assert!(plan_unit_purchase(&it, 1, Money::from_pesos(-1), None, false).is_err());

        let json = serde_json::to_value(&keep).unwrap();
        assert_eq!(json["idProducto"], 1);
        assert_eq!(json["costoUnitario"], 400);
        assert_eq!(json["mantenerCosto"], true);
    }

    #[test]
    fn test_crate_purchase_preview() {
        let p = preview_crate_purchase(PurchaseUnit::Maple, 10, Money::from_pesos(25000));
        assert_eq!(p.maples, 10);
        assert_eq!(p.costo_unitario, Money::from_pesos(2500));

        let p = preview_crate_purchase(PurchaseUnit::Cajon, 0, Money::from_pesos(1000));
        assert_eq!(p.maples, 0);
        assert_eq!(p.costo_unitario, Money::zero());

        let input = plan_crate_purchase(1, PurchaseUnit::Cajon, 2, Money::from_pesos(48000)).unwrap();
        assert_eq!(serde_json::to_value(input).unwrap()["unidad"], "CAJON");
    }

    #[test]
    fn test_crate_purchase_too_many_crates() {
        let p = preview_crate_purchase(PurchaseUnit::Cajon, i64::MAX, Money::from_pesos(1000));
        assert_eq!(p.maples, i64::MAX);

        let err = plan_crate_purchase(1, PurchaseUnit::Cajon, i64::MAX, Money::from_pesos(1000)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_humanize_motivo_table() {
        assert_eq!(humanize_motivo(" Ingreso_Inicial ", 5), "Ingreso inicial");
        assert_eq!(humanize_motivo("devolucion", 1), "Devolución");
        assert_eq!(humanize_motivo("ajuste_absoluto_ui", 4), "Ajuste ↑");
        assert_eq!(humanize_motivo("vencimiento", -2), "Vencimiento");
        assert_eq!(humanize_motivo("", -2), "");
    }

    #[test]
    fn test_humanize_referencia() {
        assert_eq!(humanize_referencia(None), "");
        assert_eq!(humanize_referencia(Some("  ")), "");
        assert_eq!(humanize_referencia(Some("ALTA_PRODUCTO")), "");
        assert_eq!(humanize_referencia(Some(" F-12 ")), " · Ref. F-12");
    }

    #[test]
    fn test_merge_timeline_order_and_limit() {
        let movs: Vec<StockMovement> = (0..15)
            .map(|i| StockMovement {
                id_movimiento: i,
                cantidad_delta: if i % 2 == 0 { 2 } else { -1 },
                motivo: "venta".to_string(),
                referencia: None,
                fecha_hora: format!("2026-10-{:02} 10:00:00", i + 1),
            })
            .collect();
        let venta = vec![PriceHistoryEntry {
            id_precio: 1,
            tipo: PriceKind::Venta,
            precio: 5200,
            vigente_desde: "2026-10-30 09:00:00".to_string(),
            vigente_hasta: None,
        }];
        let costo: Vec<PriceHistoryEntry> = (0..10)
            .map(|i| PriceHistoryEntry {
                id_precio: 10 + i,
                tipo: PriceKind::Costo,
                precio: 4000 + i,
                vigente_desde: format!("2026-09-{:02} 08:00:00", i + 1),
                vigente_hasta: None,
            })
            .collect();

        let events = merge_timeline(&movs, &venta, &costo, 20);
        assert_eq!(events.len(), 20);
        assert_eq!(events[0].desc, "Precio venta: 5200");
        assert_eq!(events[0].badge_class, "bg-blue-50 text-blue-700");
        assert_eq!(events[1].desc, "Stock +2 · Venta");
        assert!(events.windows(2).all(|w| w[0].fecha >= w[1].fecha));
        assert_eq!(events.last().map(|e| e.badge_class), Some("bg-purple-50 text-purple-700"));
    }

    #[test]
    fn test_movement_event_negative_sign() {
        let ev = movement_event(&StockMovement {
            id_movimiento: 1,
            cantidad_delta: -3,
            motivo: "ajuste_absoluto_ui".to_string(),
            referencia: Some("conteo".to_string()),
            fecha_hora: "2026-10-19 12:00:00".to_string(),
        });
        assert_eq!(ev.desc, "Stock -3 · Ajuste ↓ · Ref. conteo");
        assert_eq!(ev.badge_class, "bg-red-50 text-red-700");
    }

    #[test]
    fn test_format_buenos_aires() {
        assert_eq!(format_buenos_aires("2026-10-19 15:30:00"), "19/10/2026 12:30");
        assert_eq!(format_buenos_aires("2026-10-19T02:00:00Z"), "18/10/2026 23:00");
        assert_eq!(format_buenos_aires("ayer"), "ayer");
    }

    #[test]
    fn test_set_active_confirmation_mentions_history() {
        let it = item(1, 1, 1);
        assert!(set_active_confirmation(&it, false).contains("se conserva"));
    }
}

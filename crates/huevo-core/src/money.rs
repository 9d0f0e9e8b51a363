//! # Money Module
//!
//! Provides the `Money` type for monetary values exchanged with the backend.
//!
//! ## Why Whole Pesos?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE WIRE CONTRACT                                                      │
//! │                                                                         │
//! │  Every price, cost, total and payment amount the backend sends or       │
//! │  accepts is an INTEGER number of Argentine pesos:                       │
//! │                                                                         │
//! │    { "precio_unitario": 100, "subtotal": 200, "total": 250 }           │
//! │                                                                         │
//! │  Floating point never enters the cart, so                               │
//! │    sum(pagos) == total                                                  │
//! │  is an exact comparison, not an epsilon check.                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use huevo_core::money::Money;
//!
//! let price = Money::from_pesos(1250);
//! assert_eq!(price.to_string(), "$ 1.250");
//!
//! let line = price.multiply_quantity(2);
//! assert_eq!(line.pesos(), 2500);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole pesos.
///
/// Serializes as a bare integer so it can sit directly in command payloads.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  StockItem.precio_venta_actual ──► CartLine.precio_unitario            │
/// │                                          │                              │
/// │                                          ▼                              │
/// │                     CartLine.subtotal ──► Cart.total (backend-computed) │
/// │                                                   │                     │
/// │                                                   ▼                     │
/// │                              Payment.monto ── sum must equal total      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole pesos.
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos)
    }

    /// Returns the value in whole pesos.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is less than zero.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Multiplies money by a quantity, saturating at the `i64` bounds.
    ///
    /// ## Example
    /// ```rust
    /// use huevo_core::money::Money;
    ///
    /// let unit_price = Money::from_pesos(2990);
    /// assert_eq!(unit_price.multiply_quantity(3).pesos(), 8970);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Addition that reports overflow instead of wrapping.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    #[inline]
    pub const fn checked_mul(&self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Sums operator-entered amounts; `None` if the total doesn't fit.
    ///
    /// ## Example
    /// ```rust
    /// use huevo_core::money::Money;
    ///
    /// let ok = [Money::from_pesos(200), Money::from_pesos(50)];
    /// assert_eq!(Money::checked_sum(ok), Some(Money::from_pesos(250)));
    ///
    /// let huge = [Money::from_pesos(i64::MAX), Money::from_pesos(1)];
    /// assert_eq!(Money::checked_sum(huge), None);
    /// ```
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }

    /// Splits an amount evenly across `units`, rounding down.
    ///
    /// Returns `None` when `units` is not positive.
    ///
    /// ## User Workflow
    /// ```text
    /// Compra por cajón: 2 cajones, costo total $ 48.000
    ///      │
    ///      ▼
    /// units = 2 × 12 = 24 maples
    ///      │
    ///      ▼
    /// split_floor(24) ← THIS FUNCTION → $ 2.000 por maple
    /// ```
    pub fn split_floor(&self, units: i64) -> Option<Money> {
        if units <= 0 {
            return None;
        }
        Some(Money(self.0.div_euclid(units)))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display uses the es-AR currency layout with no decimals: `$ 1.234.567`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}$ {}", sign, group_thousands(self.0.unsigned_abs()))
    }
}

/// Formats an unsigned integer with `.` as the thousands separator.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// Operators saturate. Amounts typed by the operator go through the
// `checked_*` methods so an overflow becomes a validation error.

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

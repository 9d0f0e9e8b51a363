//! # huevo-core: Pure Domain Logic for the Huevo Santo POS
//!
//! This crate holds every client-side rule of the point-of-sale front end as
//! pure functions and plain data. The backend owns persistence and all
//! aggregation; what lives here is the part the operator sees *before* a
//! command leaves the machine: validation, state machines, and rendering
//! helpers.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Huevo Santo POS Front End                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/terminal (screens)                      │   │
//! │  │   Login ──► Ventas ──► Caja ──► Admin (stock, promos, reports)  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            huevo-client (command transport, workflows)          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ huevo-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌─────────┐  │   │
//! │  │   │ session │ │  sale   │ │  caja   │ │  stock  │ │  promo  │  │   │
//! │  │   │ roles   │ │  FSM    │ │  FSM    │ │  plans  │ │ pricing │  │   │
//! │  │   │ routes  │ │ pagos   │ │ summary │ │ history │ │  rules  │  │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └─────────┘ └─────────┘  │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌─────────┐ ┌────────────┐           │   │
//! │  │   │ report  │ │ ledger  │ │  money  │ │ validation │           │   │
//! │  │   └─────────┘ └─────────┘ └─────────┘ └────────────┘           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Shared catalog types (products, payment methods, users)
//! - [`money`] - Whole-peso `Money` type with es-AR formatting
//! - [`error`] - Domain error types
//! - [`validation`] - Form field validators
//! - [`session`] - Role normalization, session parsing, route guard
//! - [`sale`] - Sale draft state machine and payment-split rules
//! - [`caja`] - Cash register state and daily summary
//! - [`stock`] - Stock update planning, product creation, history timeline
//! - [`promo`] - Combo promotion drafts and apply pricing
//! - [`report`] - Date-range presets and report contracts
//! - [`ledger`] - Expense and payroll entries
//!
//! ## Example Usage
//!
//! ```rust
//! use huevo_core::money::Money;
//! use huevo_core::sale::{validate_payments, Payment};
//! use huevo_core::types::PaymentMethod;
//!
//! let total = Money::from_pesos(250);
//! let pagos = vec![Payment::new(PaymentMethod::Efectivo, Money::from_pesos(250))];
//! assert!(validate_payments(&pagos, total).is_ok());
//!
//! let short = vec![Payment::new(PaymentMethod::Efectivo, Money::from_pesos(200))];
//! assert!(validate_payments(&short, total).is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod caja;
pub mod error;
pub mod ledger;
pub mod money;
pub mod promo;
pub mod report;
pub mod sale;
pub mod session;
pub mod stock;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of payments in a mixed-payment sale.
///
/// The backend accepts any list; the cashier screen offers at most two.
pub const MAX_PAYMENTS_PER_SALE: usize = 2;

/// Stock movements fetched for the history timeline.
pub const HISTORY_MOVEMENT_LIMIT: u32 = 15;

/// Price-history entries fetched per price kind for the history timeline.
pub const HISTORY_PRICE_LIMIT: u32 = 10;

/// Entries kept after merging the history timeline.
pub const HISTORY_MAX_ENTRIES: usize = 20;

/// Maples per cajón (crate) of eggs.
pub const MAPLES_PER_CAJON: i64 = 12;

/// Minimum password length accepted by the registration form.
pub const MIN_PASSWORD_LEN: usize = 4;

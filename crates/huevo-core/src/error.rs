//! # Error Types
//!
//! Domain-specific error types for huevo-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  huevo-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule rejected before any call         │
//! │  └── ValidationError  - Form field validation failures                 │
//! │                                                                         │
//! │  huevo-client errors (separate crate)                                  │
//! │  └── ClientError      - Transport, timeout, backend rejection          │
//! │                                                                         │
//! │  Terminal errors (in app)                                              │
//! │  └── ApiError         - What the operator sees (code + message)        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → ApiError → Toast    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages are in Spanish because they are shown verbatim to the operator.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations detected on the client.
///
/// None of these ever reach the backend: the workflow refuses to issue the
/// command and surfaces the message inline.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The entered payments don't add up to the cart total.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart total: $ 250
    ///      │
    ///      ▼
    /// Cashier enters { efectivo: 200 }
    ///      │
    ///      ▼
    /// PaymentMismatch { pagos: 200, total: 250 }
    ///      │
    ///      ▼
    /// Inline error, venta_finalizar is never sent
    /// ```
    #[error("La suma de los pagos ({pagos}) no coincide con el total de la venta ({total})")]
    PaymentMismatch { pagos: Money, total: Money },

    /// Finalize attempted with an empty cart.
    #[error("La venta no tiene productos.")]
    EmptyCart,

    /// An operation that needs an open cash register.
    #[error("No hay caja abierta.")]
    CajaClosed,

    /// Closing the register while a sale draft still has lines.
    #[error("Hay una venta en curso: finalizala o cancelala antes de cerrar la caja.")]
    SaleInProgress,

    /// Logging out while the register is open.
    #[error("Cerrá la caja antes de cerrar sesión.")]
    CajaOpen,

    /// A sale operation with no draft to act on.
    #[error("No hay una venta en curso.")]
    NoSaleInProgress,

    /// Event not valid for the current state of a state machine.
    #[error("Transición inválida: {event} desde {from}")]
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },

    /// Combo pack price lower than the stored minimum.
    #[error("Precio por debajo del mínimo.")]
    PriceBelowMinimum { precio: Money, minimo: Money },

    /// A delta adjustment that would leave stock below zero.
    #[error("Stock negativo: el ajuste dejaría < 0 (actual {actual}, delta {delta}).")]
    NegativeStock { actual: i64, delta: i64 },

    /// The update form would not issue a single command.
    #[error("Sin cambios: no hay nada para actualizar.")]
    NothingToUpdate,

    /// Login submitted with a blank user or password.
    #[error("Usuario y contraseña son obligatorios.")]
    MissingCredentials,

    /// The backend answered `false` to `login`.
    #[error("Credenciales incorrectas.")]
    InvalidCredentials,

    /// Registration password and confirmation differ.
    #[error("Las contraseñas no coinciden.")]
    PasswordMismatch,

    /// Backend session reply lacked a user id or a known role.
    #[error("Sesión inválida: faltan datos de usuario/rol.")]
    InvalidSession,

    /// Validation error (wraps ValidationError).
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Returns true if this error came from field validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, CoreError::Validation(_))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// `field` is the operator-facing label of the form field.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or blank.
    #[error("{field}: campo obligatorio.")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} debe tener al menos {min} caracteres.")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} debe tener como máximo {max} caracteres.")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} debe estar entre {min} y {max}.")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be strictly greater than zero.
    #[error("Valor inválido para {field} (debe ser > 0).")]
    MustBePositive { field: String },

    /// Value must not be below zero.
    #[error("Valor inválido para {field} (no puede ser negativo).")]
    Negative { field: String },

    /// Invalid format (e.g. a date that doesn't parse).
    #[error("{field} tiene un formato inválido: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value too large for the arithmetic it takes part in.
    #[error("{field}: valor fuera de rango.")]
    Overflow { field: String },

    /// Value is not in the allowed set.
    #[error("{field} debe ser uno de: {}", allowed.join(", "))]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_mismatch_message() {
        let err = CoreError::PaymentMismatch {
            pagos: Money::from_pesos(200),
            total: Money::from_pesos(250),
        };
        assert_eq!(
            err.to_string(),
            "La suma de los pagos ($ 200) no coincide con el total de la venta ($ 250)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "Nombre".to_string(),
        };
        assert_eq!(err.to_string(), "Nombre: campo obligatorio.");

        let err = ValidationError::NotAllowed {
            field: "Motivo".to_string(),
            allowed: vec!["merma".into(), "robo".into()],
        };
        assert_eq!(err.to_string(), "Motivo debe ser uno de: merma, robo");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "Cantidad".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(core_err.is_validation());
        assert_eq!(core_err.to_string(), "Valor inválido para Cantidad (debe ser > 0).");
    }

    #[test]
    fn test_price_below_minimum_message() {
        let err = CoreError::PriceBelowMinimum {
            precio: Money::from_pesos(900),
            minimo: Money::from_pesos(1000),
        };
        assert_eq!(err.to_string(), "Precio por debajo del mínimo.");
    }
}

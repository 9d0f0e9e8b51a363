//! # Validation Module
//!
//! Form field validators shared by every screen.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Terminal form                                                │
//! │  ├── Parse raw text into numbers / dates                               │
//! │  └── THIS MODULE: field rules (required, > 0, >= 0, length)            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Workflow (huevo-core rules)                                  │
//! │  └── Cross-field rules (payments vs total, pack vs minimum)            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── UNIQUE codes, foreign keys, stock ledger                          │
//! │                                                                         │
//! │  A failure in layer 1 or 2 never produces a backend call.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use huevo_core::validation::{validate_codigo, validate_quantity};
//!
//! assert_eq!(validate_codigo("  P001 ").unwrap(), "P001");
//! assert!(validate_quantity("Cantidad", 0).is_err());
//! ```

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest product code the catalog accepts.
pub const MAX_CODIGO_LEN: usize = 50;

/// Longest product or combo name the catalog accepts.
pub const MAX_NOMBRE_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Trims `value` and rejects it when blank.
///
/// Returns the trimmed text so callers send exactly what was validated.
pub fn validate_required(field: &str, value: &str) -> ValidationResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(value.to_string())
}

/// Validates a product code.
///
/// ## Rules
/// - Must not be blank
/// - At most 50 characters
///
/// Uniqueness is the backend's job; a duplicate comes back as a UNIQUE
/// violation.
pub fn validate_codigo(codigo: &str) -> ValidationResult<String> {
    let codigo = validate_required("Código", codigo)?;
    if codigo.chars().count() > MAX_CODIGO_LEN {
        return Err(ValidationError::TooLong {
            field: "Código".to_string(),
            max: MAX_CODIGO_LEN,
        });
    }
    Ok(codigo)
}

/// Validates a product or combo name.
pub fn validate_nombre(nombre: &str) -> ValidationResult<String> {
    let nombre = validate_required("Nombre", nombre)?;
    if nombre.chars().count() > MAX_NOMBRE_LEN {
        return Err(ValidationError::TooLong {
            field: "Nombre".to_string(),
            max: MAX_NOMBRE_LEN,
        });
    }
    Ok(nombre)
}

/// Validates a search box value.
///
/// Blank means "no filter" and yields `None`.
pub fn validate_search_query(query: &str) -> ValidationResult<Option<String>> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "Búsqueda".to_string(),
            max: 100,
        });
    }

    Ok(if query.is_empty() {
        None
    } else {
        Some(query.to_string())
    })
}

/// Validates a password against the minimum length.
pub fn validate_password(password: &str, min: usize) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "Contraseña".to_string(),
        });
    }
    if password.chars().count() < min {
        return Err(ValidationError::TooShort {
            field: "Contraseña".to_string(),
            min,
        });
    }
    Ok(())
}

/// Normalizes an optional free-text note: blank becomes `None`.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity that must be strictly positive.
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Venta: Agregar producto                                               │
/// │                                                                         │
/// │  Cashier enters cantidad: 2                                            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity("Cantidad", 2) ← THIS FUNCTION                      │
/// │       │                                                                 │
/// │       ├── qty <= 0? → "Valor inválido para Cantidad (debe ser > 0)."   │
/// │       │                                                                 │
/// │       └── OK → venta_agregar_item                                      │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(field: &str, qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a value that may be zero but never negative.
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a price or cost: zero allowed, negative rejected.
///
/// ## Example
/// ```rust
/// use huevo_core::money::Money;
/// use huevo_core::validation::validate_price;
///
/// assert!(validate_price("Precio venta", Money::from_pesos(0)).is_ok());
/// assert!(validate_price("Precio venta", Money::from_pesos(-1)).is_err());
/// ```
pub fn validate_price(field: &str, price: Money) -> ValidationResult<()> {
    validate_non_negative(field, price.pesos())
}

/// Validates an amount that must be strictly positive (payments, expenses).
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Parsers
// =============================================================================

/// Parses an integer typed into a form field.
///
/// Accepts a leading sign and `.` thousands separators (`1.250`).
pub fn parse_int(field: &str, raw: &str) -> ValidationResult<i64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '.' && *c != '$' && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    cleaned
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "debe ser un número entero".to_string(),
        })
}

/// Parses a money amount typed into a form field.
pub fn parse_money(field: &str, raw: &str) -> ValidationResult<Money> {
    parse_int(field, raw).map(Money::from_pesos)
}

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(field: &str, raw: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "usar AAAA-MM-DD".to_string(),
        }
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_codigo() {
        assert_eq!(validate_codigo("P001").unwrap(), "P001");
        assert_eq!(validate_codigo("  HUEVO-BL  ").unwrap(), "HUEVO-BL");

        assert!(validate_codigo("").is_err());
        assert!(validate_codigo("   ").is_err());
        assert!(validate_codigo(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_nombre() {
        assert!(validate_nombre("Maple blanco x30").is_ok());
        assert!(validate_nombre("").is_err());
        assert!(validate_nombre(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_search_query() {
        assert_eq!(validate_search_query("  ").unwrap(), None);
        assert_eq!(validate_search_query(" maple ").unwrap(), Some("maple".to_string()));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity("Cantidad", 1).is_ok());
        assert!(validate_quantity("Cantidad", 0).is_err());
        assert!(validate_quantity("Cantidad", -3).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price("Costo", Money::from_pesos(0)).is_ok());
        assert!(validate_price("Costo", Money::from_pesos(4100)).is_ok());
        let err = validate_price("Costo", Money::from_pesos(-1)).unwrap_err();
        assert_eq!(err.to_string(), "Valor inválido para Costo (no puede ser negativo).");
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("Monto", Money::from_pesos(1)).is_ok());
        assert!(validate_amount("Monto", Money::zero()).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("abcd", 4).is_ok());
        assert!(validate_password("abc", 4).is_err());
        assert!(validate_password("", 4).is_err());
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("Monto", "1.250").unwrap(), 1250);
        assert_eq!(parse_int("Monto", "$ 48.000").unwrap(), 48000);
        assert_eq!(parse_int("Delta", "-5").unwrap(), -5);
        assert!(parse_int("Monto", "").is_err());
        assert!(parse_int("Monto", "doce").is_err());
    }

    #[test]
    fn test_parse_date() {
        let date = parse_date("Desde", "2026-03-01").unwrap();
        assert_eq!(date.to_string(), "2026-03-01");
        assert!(parse_date("Desde", "01/03/2026").is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(Some("  ")), None);
        assert_eq!(optional_text(Some(" Factura 12 ")), Some("Factura 12".to_string()));
        assert_eq!(optional_text(None), None);
    }
}

//! # Validation Module
//!
//! Input validation utilities for Paluto POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Request envelope                                              │
//! │  ├── Type validation (deserialization)                                  │
//! │  └── Missing field detection                                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: Business rule validation                         │
//! │  ├── Table and token format                                             │
//! │  ├── Quantity / weight bounds                                           │
//! │  └── Payment amount sanity                                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL constraints                                               │
//! │  └── Foreign key constraints                                            │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use paluto_core::validation::{validate_table_id, validate_quantity};
//!
//! // Validate table before opening an order
//! validate_table_id(12).unwrap();
//!
//! // Validate quantity before staging a line
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::Uom;
use crate::{MAX_BATCH_ITEMS, MAX_LINE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Dining tables are numbered 1-50.
pub const TABLE_RANGE: (i64, i64) = (1, 50);

/// Kubo huts carry their own band so they never collide with tables.
pub const HUT_RANGE: (i64, i64) = (101, 106);

/// Transaction tokens are fixed-length alphanumeric strings.
pub const TOKEN_LENGTH: usize = 8;

// =============================================================================
// Table Validators
// =============================================================================

/// Validates a table or hut number.
///
/// ## Rules
/// - Tables: 1-50
/// - Huts: 101-106
///
/// ## Example
/// ```rust
/// use paluto_core::validation::validate_table_id;
///
/// assert!(validate_table_id(1).is_ok());
/// assert!(validate_table_id(103).is_ok());
/// assert!(validate_table_id(51).is_err());
/// ```
pub fn validate_table_id(table_id: i64) -> ValidationResult<()> {
    let in_tables = (TABLE_RANGE.0..=TABLE_RANGE.1).contains(&table_id);
    let in_huts = (HUT_RANGE.0..=HUT_RANGE.1).contains(&table_id);

    if !in_tables && !in_huts {
        return Err(ValidationError::OutOfRange {
            field: "table_id".to_string(),
            min: TABLE_RANGE.0,
            max: HUT_RANGE.1,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a transaction token.
///
/// ## Rules
/// - Exactly 8 characters
/// - Alphanumeric only
///
/// ## Example
/// ```rust
/// use paluto_core::validation::validate_token;
///
/// assert!(validate_token("A1B2C3D4").is_ok());
/// assert!(validate_token("short").is_err());
/// assert!(validate_token("A1B2-3D4").is_err());
/// ```
pub fn validate_token(token: &str) -> ValidationResult<()> {
    let token = token.trim();

    if token.is_empty() {
        return Err(ValidationError::Required {
            field: "transaction_id".to_string(),
        });
    }

    if token.len() != TOKEN_LENGTH || !token.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "transaction_id".to_string(),
            reason: format!("must be {TOKEN_LENGTH} alphanumeric characters"),
        });
    }

    Ok(())
}

/// Validates a product row id.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 64 characters
pub fn validate_product_id(id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "product_id".to_string(),
        });
    }

    if id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: "product_id".to_string(),
            max: 64,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value for per-serve products.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_LINE_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_LINE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates gram weight for per-kilo products.
///
/// ## Rules
/// - Must be finite
/// - Must be positive (> 0)
pub fn validate_grams(grams: f64) -> ValidationResult<()> {
    if !grams.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "grams".to_string(),
        });
    }

    if grams <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "grams".to_string(),
        });
    }

    Ok(())
}

/// Validates the measured portion of an order line against its pricing unit.
///
/// Per-serve products need a quantity; per-kilo products need a gram weight.
pub fn validate_portion(uom: Uom, quantity: i64, grams: f64) -> ValidationResult<()> {
    match uom {
        Uom::Serve => validate_quantity(quantity),
        Uom::Kg => validate_grams(grams),
    }
}

/// Validates a tendered payment amount.
///
/// ## Rules
/// - Must be finite
/// - Must be positive (> 0)
///
/// ## Example
/// ```rust
/// use paluto_core::validation::validate_payment_amount;
///
/// assert!(validate_payment_amount(500.0).is_ok());
/// assert!(validate_payment_amount(0.0).is_err());
/// assert!(validate_payment_amount(f64::NAN).is_err());
/// ```
pub fn validate_payment_amount(amount: f64) -> ValidationResult<()> {
    if !amount.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "amount".to_string(),
        });
    }

    if amount <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates checkout batch size (number of staged lines).
///
/// ## Rules
/// - Must not exceed MAX_BATCH_ITEMS (100)
pub fn validate_batch_size(item_count: usize) -> ValidationResult<()> {
    if item_count > MAX_BATCH_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "checkout items".to_string(),
            min: 0,
            max: MAX_BATCH_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_table_id() {
        // Tables
        assert!(validate_table_id(1).is_ok());
        assert!(validate_table_id(50).is_ok());

        // Huts
        assert!(validate_table_id(101).is_ok());
        assert!(validate_table_id(106).is_ok());

        // Gaps and bounds
        assert!(validate_table_id(0).is_err());
        assert!(validate_table_id(51).is_err());
        assert!(validate_table_id(100).is_err());
        assert!(validate_table_id(107).is_err());
        assert!(validate_table_id(-3).is_err());
    }

    #[test]
    fn test_validate_token() {
        assert!(validate_token("A1B2C3D4").is_ok());
        assert!(validate_token("abcdefgh").is_ok());
        assert!(validate_token("12345678").is_ok());

        assert!(validate_token("").is_err());
        assert!(validate_token("   ").is_err());
        assert!(validate_token("SHORT").is_err());
        assert!(validate_token("TOOLONGTOKEN").is_err());
        assert!(validate_token("A1B2-3D4").is_err());
    }

    #[test]
    fn test_validate_product_id() {
        assert!(validate_product_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_product_id("").is_err());
        assert!(validate_product_id(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_grams() {
        assert!(validate_grams(250.0).is_ok());
        assert!(validate_grams(0.5).is_ok());

        assert!(validate_grams(0.0).is_err());
        assert!(validate_grams(-10.0).is_err());
        assert!(validate_grams(f64::NAN).is_err());
        assert!(validate_grams(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_portion_follows_uom() {
        // Serve ignores grams
        assert!(validate_portion(Uom::Serve, 2, 0.0).is_ok());
        assert!(validate_portion(Uom::Serve, 0, 500.0).is_err());

        // Kg ignores quantity
        assert!(validate_portion(Uom::Kg, 0, 500.0).is_ok());
        assert!(validate_portion(Uom::Kg, 2, 0.0).is_err());
    }

    #[test]
    fn test_validate_payment_amount() {
        assert!(validate_payment_amount(0.01).is_ok());
        assert!(validate_payment_amount(1_000_000.0).is_ok());

        assert!(validate_payment_amount(0.0).is_err());
        assert!(validate_payment_amount(-5.0).is_err());
        assert!(validate_payment_amount(f64::NAN).is_err());
    }

    #[test]
    fn test_validate_batch_size() {
        assert!(validate_batch_size(0).is_ok());
        assert!(validate_batch_size(100).is_ok());
        assert!(validate_batch_size(101).is_err());
    }
}

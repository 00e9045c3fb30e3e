//! # Error Types
//!
//! Domain-specific error types for paluto-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  paluto-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  paluto-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  paluto-service errors                                                 │
//! │  └── ApiError         - What the routing layer sees (serialized)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Frontend     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (token, status, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every variant classifies into one of four categories the routing layer
//!    understands: invalid input, invalid state, not found, external failure

use thiserror::Error;

use crate::types::OrderStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They are detected before any mutation happens (validate-then-commit).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or out-of-range parameters.
    ///
    /// ## When This Occurs
    /// - Custom discount percent outside [0, 100]
    /// - Senior/PWD headcount exceeding total diners
    /// - Unknown discount kind from the routing layer
    /// - Non-finite or negative tendered amounts
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Discounting an order with nothing on it.
    #[error("Cannot apply discount to an empty order")]
    EmptyOrder,

    /// Checkout received no items.
    #[error("Checkout batch is empty")]
    EmptyCheckout,

    /// Requested status transition is not allowed by the order state machine.
    ///
    /// ## When This Occurs
    /// - Kitchen trying to serve an order that is not READY
    /// - Any backward transition (READY → ACTIVE, etc.)
    #[error("Transaction {transaction_id} cannot move from {from:?} to {to:?}")]
    IllegalTransition {
        transaction_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Transaction cannot be found (no line items under the token).
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an `InvalidInput` error from any displayable reason.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Whether this error is an invalid-state rejection (as opposed to bad
    /// input). The routing layer maps the two categories to different codes.
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            CoreError::EmptyOrder | CoreError::IllegalTransition { .. }
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Monetary amount is NaN or infinite.
    #[error("{field} is not a finite number")]
    NotFinite { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g. a token with non-alphanumeric characters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Senior/PWD headcount larger than the party size.
    #[error("Senior/PWD count cannot exceed total diners ({headcount} > {total_diners})")]
    HeadcountExceedsDiners { headcount: i64, total_diners: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

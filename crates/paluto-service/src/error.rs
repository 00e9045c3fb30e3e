//! # API Error Type
//!
//! Unified error type for service operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Paluto POS                             │
//! │                                                                         │
//! │  Client                      Rust Backend                               │
//! │  ──────                      ────────────                               │
//! │                                                                         │
//! │  apply_discount(...)                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service Operation                                               │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Database Error?  ── DbError::QueryFailed("...")  ──┐            │  │
//! │  │         │                                           │            │  │
//! │  │         ▼                                           ▼            │  │
//! │  │  Business Error?  ── CoreError::EmptyOrder ────── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  { "code": "INVALID_STATE",                                             │
//! │    "message": "Cannot apply discount to an empty order" }               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;

use paluto_core::{CoreError, ValidationError};
use paluto_db::DbError;

/// API error returned from service operations.
///
/// ## Serialization
/// This is what the client receives when an operation fails:
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Product not found: 550e8400-..."
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    InvalidInput,

    /// Operation not allowed in the order's current state (422)
    InvalidState,

    /// Database operation failed (500)
    DatabaseError,

    /// A collaborator outside the process failed (printer, file sink)
    ExternalFailure,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidInput, message)
    }

    /// Creates an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidState, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::InvalidInput,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::InvalidInput, "Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
///
/// State-machine violations and empty-order rejections map to
/// `INVALID_STATE`; every other domain rejection is `INVALID_INPUT`.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match &err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", id),
            CoreError::TransactionNotFound(id) => ApiError::not_found("Transaction", id),
            _ if err.is_invalid_state() => ApiError::invalid_state(err.to_string()),
            _ => ApiError::invalid_input(err.to_string()),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::invalid_input(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for service operations.
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Unit Tests
// =============================================================================

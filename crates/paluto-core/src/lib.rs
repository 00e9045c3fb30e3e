//! # paluto-core: Pure Business Logic for Paluto POS
//!
//! This crate is the **heart** of Paluto POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Paluto POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Cashier / Kitchen Clients                    │   │
//! │  │    Table grid ──► Order UI ──► Billing UI ──► Kitchen board    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              paluto-service (Orchestration Layer)               │   │
//! │  │    orders, discounts, payments, table overview, printing        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ paluto-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  ledger   │  │ discount  │  │  receipt  │  │   │
//! │  │   │  Product  │  │OrderLedger│  │   ratio   │  │ formatter │  │   │
//! │  │   │ LineItem  │  │  merges   │  │  VAT math │  │  renderer │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    paluto-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, LineItem, Payment, statuses)
//! - [`money`] - VAT-inclusive totals and the single rounding point
//! - [`ledger`] - Order line merging, checkout staging, status machine
//! - [`discount`] - Statutory and custom discount ratios
//! - [`reconcile`] - Tendered-amount reconciliation
//! - [`receipt`] - Fixed-width receipt formatting
//! - [`render`] - Paginated printable receipt documents
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Late Rounding**: Amounts stay full-precision f64 until display formatting
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use paluto_core::discount::{compute_discount, apply_ratio};
//! use paluto_core::types::DiscountRequest;
//!
//! # let mut items: Vec<paluto_core::types::LineItem> = Vec::new();
//! // A 1,000.00 order, 4 diners, 2 of them seniors
//! let request = DiscountRequest::Senior { headcount: 2, total_diners: 4 };
//! let outcome = compute_discount(1000.0, &request).unwrap();
//!
//! // Each line carries its share of the deduction
//! apply_ratio(&mut items, outcome.ratio, outcome.tag);
//! assert_eq!(outcome.message, "Applied 2 SENIOR discount.");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod discount;
pub mod error;
pub mod ledger;
pub mod money;
pub mod receipt;
pub mod reconcile;
pub mod render;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use paluto_core::OrderLedger` instead of
// `use paluto_core::ledger::OrderLedger`

pub use discount::{compute_discount, DiscountOutcome};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::OrderLedger;
pub use money::{order_totals, OrderTotals, VAT_RATE};
pub use reconcile::{reconcile, Reconciled};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single checkout batch
///
/// ## Business Reason
/// Prevents runaway staging queues and ensures reasonable order sizes.
pub const MAX_BATCH_ITEMS: usize = 100;

/// Maximum quantity of a single per-serve line
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_LINE_QUANTITY: i64 = 999;

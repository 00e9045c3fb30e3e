//! # paluto-db: Database Layer for Paluto POS
//!
//! This crate provides database access for the Paluto POS system.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Paluto POS Data Flow                             │
//! │                                                                         │
//! │  Service Operation (merge_or_insert_item)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     paluto-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │  (order.rs)   │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ ProductRepo   │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │◄───│ OrderRepo     │    │ ...          │  │   │
//! │  │   │ Management    │    │ PaymentRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                     ./data/paluto.db                            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (product, order, payment)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use paluto_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let db = Database::new(DbConfig::new("path/to/db.sqlite")).await?;
//!
//! // Use repositories
//! let items = db.orders().items_for_transaction("A1B2C3D4").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::order::{OccupiedTable, OrderRepository};
pub use repository::payment::PaymentRepository;
pub use repository::product::ProductRepository;

//! # paluto-service: Orchestration Layer for Paluto POS
//!
//! Exposed POS operations: the glue between the pure core, the database
//! and the printer.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Paluto POS Service Layer                            │
//! │                                                                         │
//! │  Routing layer (HTTP, IPC, ...)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                ★ paluto-service (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   PosService                                                    │   │
//! │  │   ├── orders:    checkout, merge_or_insert, cancel, status      │   │
//! │  │   ├── discounts: apply_discount                                 │   │
//! │  │   ├── payments:  record_payment, complete_payment               │   │
//! │  │   ├── overview:  table_overview, kitchen_orders                 │   │
//! │  │   └── printing:  receipt assembly + sink dispatch               │   │
//! │  │                                                                 │   │
//! │  │   Every mutation runs inside the transaction's critical         │   │
//! │  │   section (TxnLocks) with an explicit RequestContext.           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                          │                                      │
//! │       ▼                          ▼                                      │
//! │  paluto-core (pure math)    paluto-db (SQLite)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use paluto_db::{Database, DbConfig};
//! use paluto_service::{PosService, RequestContext, Settings};
//!
//! let db = Database::new(DbConfig::new("./paluto.db")).await?;
//! let service = PosService::new(db, Settings::default());
//!
//! let ctx = RequestContext::new("ANA", "counter-1");
//! let txn = PosService::new_transaction_token();
//! service.checkout(&ctx, &txn, 7, batch, OrderMode::Regular).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod context;
pub mod discounts;
pub mod error;
pub mod locks;
pub mod orders;
pub mod payments;
pub mod printing;
pub mod settings;

// =============================================================================
// Re-exports
// =============================================================================

pub use context::RequestContext;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use orders::{KitchenItem, KitchenOrder, TableStatus};
pub use payments::Settlement;
pub use printing::{FilePrintSink, PrintArtifact, PrintError, PrintSink};
pub use settings::Settings;

use std::sync::Arc;

use uuid::Uuid;

use crate::locks::TxnLocks;
use paluto_db::Database;

/// Length of a transaction token.
const TOKEN_LENGTH: usize = 8;

/// The POS service: one instance per store, shared across counters.
///
/// Cheap to clone via `Arc` by callers; internally everything is already
/// shareable.
pub struct PosService {
    db: Database,
    settings: Settings,
    locks: TxnLocks,
    printer: Arc<dyn PrintSink>,
}

impl PosService {
    /// Creates a service with the file-save print sink.
    pub fn new(db: Database, settings: Settings) -> Self {
        let printer = Arc::new(FilePrintSink::new(settings.receipt_fallback_dir.clone()));
        PosService {
            db,
            settings,
            locks: TxnLocks::new(),
            printer,
        }
    }

    /// Creates a service with a custom print sink.
    pub fn with_printer(db: Database, settings: Settings, printer: Arc<dyn PrintSink>) -> Self {
        PosService {
            db,
            settings,
            locks: TxnLocks::new(),
            printer,
        }
    }

    /// The underlying database handle.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// The service settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub(crate) fn locks(&self) -> &TxnLocks {
        &self.locks
    }

    pub(crate) fn printer(&self) -> &dyn PrintSink {
        self.printer.as_ref()
    }

    /// Generates a fresh transaction token: 8 alphanumeric characters.
    ///
    /// Tokens are opaque; uniqueness comes from the UUID space they are
    /// cut from, which is plenty for one store's daily volume.
    pub fn new_transaction_token() -> String {
        Uuid::new_v4().simple().to_string()[..TOKEN_LENGTH].to_uppercase()
    }

    /// Generates a row id.
    pub(crate) fn new_row_id() -> String {
        Uuid::new_v4().to_string()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use paluto_core::validation::validate_token;

    #[test]
    fn test_generated_tokens_are_valid() {
        for _ in 0..32 {
            let token = PosService::new_transaction_token();
            assert_eq!(token.len(), TOKEN_LENGTH);
            validate_token(&token).unwrap();
        }
    }

    #[test]
    fn test_tokens_are_unique_enough() {
        let a = PosService::new_transaction_token();
        let b = PosService::new_transaction_token();
        assert_ne!(a, b);
    }
}

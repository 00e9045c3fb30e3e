//! # Per-Transaction Locks
//!
//! Serializes all mutations to one transaction behind an async mutex.
//!
//! ## Why Per-Transaction, Not Global
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two counters settle different tables at the same time:                 │
//! │                                                                         │
//! │  Counter 1: record_payment("TXN-A") ──► lock(A) ─── proceeds            │
//! │  Counter 2: record_payment("TXN-B") ──► lock(B) ─── proceeds            │
//! │                                                                         │
//! │  Two taps race on the same table:                                       │
//! │                                                                         │
//! │  Counter 1: apply_discount("TXN-A") ──► lock(A) ─── proceeds            │
//! │  Counter 2: record_payment("TXN-A") ──► lock(A) ─── waits ──► proceeds  │
//! │                                                                         │
//! │  The ledger, discount and payments of one transaction never interleave; │
//! │  unrelated transactions never wait on each other.                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lock entries are created on first use and kept for the life of the
//! service; a token is 8 characters, so the map stays small.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Map of transaction token to its mutex.
#[derive(Debug, Default)]
pub struct TxnLocks {
    inner: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TxnLocks {
    pub fn new() -> Self {
        TxnLocks::default()
    }

    /// Acquires the exclusive critical section for one transaction.
    ///
    /// The returned guard holds only the per-transaction mutex; the map
    /// lock is released before waiting, so contention on one transaction
    /// never blocks lookups for others.
    pub async fn acquire(&self, transaction_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(transaction_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        lock.lock_owned().await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

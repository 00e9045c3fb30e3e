//! # Payment Reconciler
//!
//! Applies a tendered amount against the outstanding balance.
//!
//! ## The Cap Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  remaining = (subtotal − total_discount) − already_paid                 │
//! │                                                                         │
//! │  applied = min(tendered, remaining), floored at 0                       │
//! │  change  = max(tendered − remaining, 0)                                 │
//! │                                                                         │
//! │  Only `applied` is ever persisted. Stored payments can therefore       │
//! │  never sum past the bill, no matter how much cash the customer hands   │
//! │  over or how many partial payments are taken.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};

/// Outcome of reconciling one tendered amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Reconciled {
    /// Portion credited toward the balance (what gets persisted).
    pub applied_amount: f64,
    /// Cash handed back to the customer.
    pub change: f64,
}

/// Reconciles a tendered amount against the remaining balance.
///
/// The tendered amount must be a finite, non-negative number; the remaining
/// balance may already be zero or negative (fully settled), in which case
/// nothing is applied and the whole tender comes back as change.
pub fn reconcile(amount_given: f64, remaining: f64) -> CoreResult<Reconciled> {
    if !amount_given.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "amount".to_string(),
        }
        .into());
    }
    if amount_given < 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        }
        .into());
    }

    let applied_amount = amount_given.min(remaining).max(0.0);
    let change = (amount_given - remaining).max(0.0);

    Ok(Reconciled {
        applied_amount,
        change,
    })
}

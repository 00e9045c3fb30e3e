//! # Request Context
//!
//! Identity of the request performing an operation.
//!
//! There is no ambient session: every operation receives the acting cashier
//! and terminal explicitly, so the same service instance can serve several
//! counters at once and audit logs always carry who did what.

use serde::{Deserialize, Serialize};

/// Who is performing the operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    /// Cashier display name, printed on receipts.
    pub cashier: String,

    /// Terminal identifier, for audit logs.
    pub terminal: String,
}

impl RequestContext {
    pub fn new(cashier: impl Into<String>, terminal: impl Into<String>) -> Self {
        RequestContext {
            cashier: cashier.into(),
            terminal: terminal.into(),
        }
    }
}

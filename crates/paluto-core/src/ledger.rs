//! # Order Ledger
//!
//! Item accumulation and status transitions as pure functions.
//!
//! ## Merge Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  One line per (transaction, product) while ACTIVE.                      │
//! │                                                                         │
//! │  add(2 servings) ─┐                                                     │
//! │  add(3 servings) ─┼─► quantity = 5, subtotal = price × 5               │
//! │                   │                                                     │
//! │  The subtotal is ALWAYS recomputed from the merged quantity/weight,    │
//! │  never by adding two subtotals — repeated merges of KG items would     │
//! │  otherwise drift (price × a + price × b ≠ price × (a + b) in floats).  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The database layer persists these rules; this module is the single place
//! they are defined, so the repository only ever stores what a ledger
//! function computed.

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::types::{LineItem, OrderMode, OrderStatus, Product, Uom};

/// Grams per kilogram; the POS UI collects weight input in grams.
pub const GRAMS_PER_KG: f64 = 1000.0;

// =============================================================================
// Line Construction
// =============================================================================

/// Subtotal from the unit-of-measure rule: SERVE → price × quantity,
/// KG → price × weight in kilograms.
pub fn line_subtotal(price: f64, uom: Uom, quantity: i64, weight_kg: f64) -> f64 {
    match uom {
        Uom::Serve => price * quantity as f64,
        Uom::Kg => price * weight_kg,
    }
}

/// Builds a fresh line item for a product.
///
/// The caller supplies the row id (the core stays free of randomness) and the
/// status fitting its context: ACTIVE for direct adds to a confirmed order,
/// PENDING for checkout staging.
#[allow(clippy::too_many_arguments)]
pub fn new_line(
    id: String,
    transaction_id: &str,
    table_id: i64,
    product: &Product,
    quantity: i64,
    grams: f64,
    status: OrderStatus,
    order_mode: OrderMode,
    now: DateTime<Utc>,
) -> LineItem {
    let weight_kg = grams / GRAMS_PER_KG;
    let subtotal = line_subtotal(product.price, product.uom, quantity, weight_kg);
    LineItem {
        id,
        transaction_id: transaction_id.to_string(),
        table_id,
        product_id: product.id.clone(),
        quantity,
        weight_kg,
        subtotal,
        discount: 0.0,
        total: subtotal,
        discount_type: None,
        status,
        order_mode,
        created_at: now,
    }
}

/// Merges a repeated add into an existing ACTIVE line for the same product.
///
/// Quantities and weights are summed, then the subtotal is recomputed from
/// the merged totals. Any discount on the line keeps its absolute amount
/// until the next discount request recomputes the ratio transaction-wide.
pub fn merge_line(existing: &mut LineItem, product: &Product, quantity: i64, grams: f64) {
    existing.quantity += quantity;
    existing.weight_kg += grams / GRAMS_PER_KG;
    existing.subtotal = line_subtotal(
        product.price,
        product.uom,
        existing.quantity,
        existing.weight_kg,
    );
    existing.total = existing.subtotal - existing.discount;
}

// =============================================================================
// Checkout
// =============================================================================

/// One entry of a checkout batch as received from the POS screen.
#[derive(Debug, Clone)]
pub struct CheckoutEntry {
    pub product_id: String,
    pub quantity: i64,
    pub grams: f64,
}

/// Builds the PENDING lines for a checkout batch.
///
/// Row ids are supplied alongside (one per entry, same order); products are
/// resolved by the caller. Fails with `InvalidInput` when the batch is empty —
/// a checkout that saves nothing is a caller bug, not a no-op.
pub fn build_checkout_lines(
    transaction_id: &str,
    table_id: i64,
    entries: &[(CheckoutEntry, Product, String)],
    order_mode: OrderMode,
    now: DateTime<Utc>,
) -> CoreResult<Vec<LineItem>> {
    if entries.is_empty() {
        return Err(CoreError::EmptyCheckout);
    }

    Ok(entries
        .iter()
        .map(|(entry, product, id)| {
            new_line(
                id.clone(),
                transaction_id,
                table_id,
                product,
                entry.quantity,
                entry.grams,
                OrderStatus::Pending,
                order_mode,
                now,
            )
        })
        .collect())
}

// =============================================================================
// Status Transitions
// =============================================================================

/// Validates a kitchen status change for a transaction currently at `from`.
///
/// Settlement (`PAID`) does not pass through here; `complete_payment` sets it
/// unconditionally.
pub fn validate_kitchen_transition(
    transaction_id: &str,
    from: OrderStatus,
    to: OrderStatus,
) -> CoreResult<()> {
    if from.is_kitchen_transition(to) {
        Ok(())
    } else {
        Err(CoreError::IllegalTransition {
            transaction_id: transaction_id.to_string(),
            from,
            to,
        })
    }
}

// =============================================================================
// In-Memory Ledger
// =============================================================================

/// A transaction's line items materialized for computation.
///
/// The service layer loads rows into a ledger to evaluate totals or drive the
/// receipt pipeline; mutations still go through the pure functions above so
/// persisted state and in-memory state follow identical rules.
#[derive(Debug, Clone, Default)]
pub struct OrderLedger {
    lines: Vec<LineItem>,
}

impl OrderLedger {
    /// Wraps rows fetched for one transaction, ordered by time.
    pub fn from_lines(mut lines: Vec<LineItem>) -> Self {
        lines.sort_by_key(|line| line.created_at);
        OrderLedger { lines }
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Σ line.subtotal.
    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(|line| line.subtotal).sum()
    }

    /// Σ line.discount.
    pub fn total_discount(&self) -> f64 {
        self.lines.iter().map(|line| line.discount).sum()
    }

    /// What the customer owes: subtotal − total discount.
    pub fn total_due(&self) -> f64 {
        self.subtotal() - self.total_discount()
    }

    /// Adds a product, merging into an existing ACTIVE line when one exists
    /// for the same product.
    pub fn add_or_merge(
        &mut self,
        id: String,
        transaction_id: &str,
        table_id: i64,
        product: &Product,
        quantity: i64,
        grams: f64,
        status: OrderStatus,
        order_mode: OrderMode,
        now: DateTime<Utc>,
    ) -> &LineItem {
        if let Some(index) = self.lines.iter().position(|line| {
            line.product_id == product.id && line.status == OrderStatus::Active
        }) {
            merge_line(&mut self.lines[index], product, quantity, grams);
            return &self.lines[index];
        }

        self.lines.push(new_line(
            id,
            transaction_id,
            table_id,
            product,
            quantity,
            grams,
            status,
            order_mode,
            now,
        ));
        let last = self.lines.len() - 1;
        &self.lines[last]
    }

    /// Deletes all PENDING lines (cancellation before confirmation); returns
    /// how many were removed. Confirmed lines are untouched.
    pub fn cancel_pending(&mut self) -> usize {
        let before = self.lines.len();
        self.lines.retain(|line| line.status != OrderStatus::Pending);
        before - self.lines.len()
    }

    /// Moves every line to `to` after validating the kitchen state machine
    /// against the furthest-along line.
    pub fn set_status(&mut self, transaction_id: &str, to: OrderStatus) -> CoreResult<()> {
        let from = self
            .lines
            .iter()
            .map(|line| line.status)
            .max_by_key(|status| *status as u8)
            .ok_or_else(|| CoreError::TransactionNotFound(transaction_id.to_string()))?;

        validate_kitchen_transition(transaction_id, from, to)?;
        for line in &mut self.lines {
            line.status = to;
        }
        Ok(())
    }

    /// Marks every line PAID (settlement; no validation by design).
    pub fn mark_paid(&mut self) {
        for line in &mut self.lines {
            line.status = OrderStatus::Paid;
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn serve_product(price: f64) -> Product {
        Product {
            id: "p-serve".to_string(),
            category: "RICE".to_string(),
            product_type: "RICE".to_string(),
            variety_1: "GARLIC".to_string(),
            variety_2: String::new(),
            state_1: String::new(),
            state_2: String::new(),
            luto: None,
            uom: Uom::Serve,
            price,
        }
    }

    fn kg_product(price: f64) -> Product {
        Product {
            id: "p-kg".to_string(),
            category: "SEAFOOD".to_string(),
            product_type: "FISH".to_string(),
            variety_1: "MAYA-MAYA".to_string(),
            variety_2: String::new(),
            state_1: String::new(),
            state_2: String::new(),
            luto: Some("SINIGANG".to_string()),
            uom: Uom::Kg,
            price,
        }
    }

    #[test]
    fn test_subtotal_follows_uom() {
        assert_eq!(line_subtotal(80.0, Uom::Serve, 3, 0.0), 240.0);
        assert_eq!(line_subtotal(450.0, Uom::Kg, 0, 1.5), 675.0);
    }

    #[test]
    fn test_grams_divided_into_kilograms() {
        let product = kg_product(450.0);
        let line = new_line(
            "l1".to_string(),
            "TX",
            4,
            &product,
            0,
            750.0,
            OrderStatus::Active,
            OrderMode::Regular,
            Utc::now(),
        );
        assert_eq!(line.weight_kg, 0.75);
        assert_eq!(line.subtotal, 337.5);
        assert_eq!(line.total, line.subtotal);
    }

    #[test]
    fn test_merge_recomputes_from_merged_totals() {
        let product = kg_product(450.0);
        let mut line = new_line(
            "l1".to_string(),
            "TX",
            4,
            &product,
            0,
            300.0,
            OrderStatus::Active,
            OrderMode::Regular,
            Utc::now(),
        );
        merge_line(&mut line, &product, 0, 300.0);
        merge_line(&mut line, &product, 0, 400.0);

        assert_eq!(line.weight_kg, 1.0);
        // price × merged weight, not a sum of per-add subtotals
        assert_eq!(line.subtotal, 450.0);
    }

    /// Merge associativity: however adds are grouped, the result equals
    /// price × (sum of quantities).
    #[test]
    fn test_merge_associativity() {
        let product = serve_product(75.0);
        let groupings: [&[i64]; 3] = [&[6], &[1, 2, 3], &[2, 2, 1, 1]];

        for adds in groupings {
            let mut ledger = OrderLedger::default();
            for (i, qty) in adds.iter().enumerate() {
                ledger.add_or_merge(
                    format!("l{i}"),
                    "TX",
                    2,
                    &product,
                    *qty,
                    0.0,
                    OrderStatus::Active,
                    OrderMode::Regular,
                    Utc::now(),
                );
            }
            assert_eq!(ledger.len(), 1);
            assert_eq!(ledger.lines()[0].quantity, 6);
            assert_eq!(ledger.subtotal(), 75.0 * 6.0);
        }
    }

    #[test]
    fn test_pending_lines_do_not_merge() {
        let product = serve_product(75.0);
        let mut ledger = OrderLedger::default();
        ledger.add_or_merge(
            "l1".to_string(),
            "TX",
            2,
            &product,
            1,
            0.0,
            OrderStatus::Pending,
            OrderMode::Regular,
            Utc::now(),
        );
        ledger.add_or_merge(
            "l2".to_string(),
            "TX",
            2,
            &product,
            1,
            0.0,
            OrderStatus::Pending,
            OrderMode::Regular,
            Utc::now(),
        );
        // Merge only applies to ACTIVE lines
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_cancel_pending_spares_confirmed_lines() {
        let product = serve_product(75.0);
        let now = Utc::now();
        let mut lines = vec![
            new_line(
                "l1".to_string(),
                "TX",
                2,
                &product,
                1,
                0.0,
                OrderStatus::Active,
                OrderMode::Regular,
                now,
            ),
            new_line(
                "l2".to_string(),
                "TX",
                2,
                &product,
                2,
                0.0,
                OrderStatus::Pending,
                OrderMode::Regular,
                now,
            ),
        ];
        lines[0].status = OrderStatus::Served;

        let mut ledger = OrderLedger::from_lines(lines);
        assert_eq!(ledger.cancel_pending(), 1);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.lines()[0].status, OrderStatus::Served);
    }

    #[test]
    fn test_checkout_requires_items() {
        let err = build_checkout_lines("TX", 2, &[], OrderMode::Regular, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCheckout));
    }

    #[test]
    fn test_checkout_stages_pending_lines() {
        let product = serve_product(120.0);
        let entries = vec![(
            CheckoutEntry {
                product_id: product.id.clone(),
                quantity: 2,
                grams: 0.0,
            },
            product,
            "l1".to_string(),
        )];
        let lines =
            build_checkout_lines("TX", 7, &entries, OrderMode::Takeout, Utc::now()).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].status, OrderStatus::Pending);
        assert_eq!(lines[0].order_mode, OrderMode::Takeout);
        assert_eq!(lines[0].subtotal, 240.0);
    }

    #[test]
    fn test_kitchen_transitions_enforced() {
        assert!(validate_kitchen_transition("TX", OrderStatus::Active, OrderStatus::Ready).is_ok());
        assert!(validate_kitchen_transition("TX", OrderStatus::Ready, OrderStatus::Served).is_ok());

        let err = validate_kitchen_transition("TX", OrderStatus::Served, OrderStatus::Ready)
            .unwrap_err();
        assert!(err.is_invalid_state());
        assert!(
            validate_kitchen_transition("TX", OrderStatus::Active, OrderStatus::Served).is_err()
        );
    }

    #[test]
    fn test_ledger_set_status() {
        let product = serve_product(75.0);
        let mut ledger = OrderLedger::default();
        ledger.add_or_merge(
            "l1".to_string(),
            "TX",
            2,
            &product,
            1,
            0.0,
            OrderStatus::Active,
            OrderMode::Regular,
            Utc::now(),
        );

        ledger.set_status("TX", OrderStatus::Ready).unwrap();
        assert_eq!(ledger.lines()[0].status, OrderStatus::Ready);

        assert!(ledger.set_status("TX", OrderStatus::Active).is_err());

        ledger.mark_paid();
        assert_eq!(ledger.lines()[0].status, OrderStatus::Paid);
    }
}

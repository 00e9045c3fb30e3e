//! # Discount Operations
//!
//! Applies, replaces and removes discounts on a transaction.
//!
//! ## Recompute, Don't Accumulate
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Discounts are a single ratio over the whole order, never a stack:      │
//! │                                                                         │
//! │  apply(senior 2/4)  ──► ratio 0.1428..  ──► every line recomputed       │
//! │  apply(employee)    ──► ratio 0.10      ──► every line recomputed       │
//! │  apply(remove)      ──► ratio 0         ──► every line back to full     │
//! │                                                                         │
//! │  Applying twice is idempotent; switching kinds replaces cleanly.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::info;

use crate::context::RequestContext;
use crate::error::ApiResult;
use crate::PosService;
use paluto_core::discount::{apply_ratio, compute_discount};
use paluto_core::validation::validate_token;
use paluto_core::{DiscountRequest, OrderLedger};

impl PosService {
    /// Applies a discount request to a transaction and returns the
    /// confirmation message.
    ///
    /// The whole order's lines are re-fetched, the ratio computed once over
    /// the order subtotal, and every line's share persisted.
    pub async fn apply_discount(
        &self,
        ctx: &RequestContext,
        transaction_id: &str,
        request: DiscountRequest,
    ) -> ApiResult<String> {
        validate_token(transaction_id)?;

        let _guard = self.locks().acquire(transaction_id).await;

        let items = self
            .db()
            .orders()
            .items_for_transaction(transaction_id)
            .await?;
        let mut ledger = OrderLedger::from_lines(items);

        let outcome = compute_discount(ledger.subtotal(), &request)?;

        let mut lines = ledger.lines().to_vec();
        apply_ratio(&mut lines, outcome.ratio, outcome.tag);

        for line in &lines {
            self.db()
                .orders()
                .update_discount(&line.id, line.discount, line.total, line.discount_type)
                .await?;
        }
        ledger = OrderLedger::from_lines(lines);

        info!(
            transaction_id = %transaction_id,
            cashier = %ctx.cashier,
            ratio = outcome.ratio,
            total_due = ledger.total_due(),
            "Discount applied"
        );
        Ok(outcome.message)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use paluto_core::ledger::CheckoutEntry;
    use paluto_core::{DiscountKind, OrderMode, Product, Uom};
    use paluto_db::{Database, DbConfig};

    async fn service_with_order() -> PosService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let dish = Product {
            id: "p-1".to_string(),
            category: "COOKED".to_string(),
            product_type: "PORK".to_string(),
            variety_1: "SISIG".to_string(),
            variety_2: String::new(),
            state_1: String::new(),
            state_2: String::new(),
            luto: None,
            uom: Uom::Serve,
            price: 250.0,
        };
        db.products().insert(&dish).await.unwrap();

        let service = PosService::new(db, Settings::default());
        service
            .checkout(
                &ctx(),
                "TXN00001",
                7,
                vec![CheckoutEntry {
                    product_id: "p-1".to_string(),
                    quantity: 4,
                    grams: 0.0,
                }],
                OrderMode::Regular,
            )
            .await
            .unwrap();
        service
    }

    fn ctx() -> RequestContext {
        RequestContext::new("ANA", "counter-1")
    }

    #[tokio::test]
    async fn test_senior_discount_reference_scenario() {
        let service = service_with_order().await;

        // Order subtotal is 1000: 4 diners, 2 seniors
        let message = service
            .apply_discount(
                &ctx(),
                "TXN00001",
                DiscountRequest::Senior {
                    headcount: 2,
                    total_diners: 4,
                },
            )
            .await
            .unwrap();
        assert_eq!(message, "Applied 2 SENIOR discount.");

        let items = service
            .db()
            .orders()
            .items_for_transaction("TXN00001")
            .await
            .unwrap();
        let discount: f64 = items.iter().map(|i| i.discount).sum();
        assert!((discount - 142.85714285714286).abs() < 1e-6);
        assert_eq!(items[0].discount_type, Some(DiscountKind::Senior));
    }

    #[tokio::test]
    async fn test_replace_then_remove() {
        let service = service_with_order().await;

        service
            .apply_discount(&ctx(), "TXN00001", DiscountRequest::Employee)
            .await
            .unwrap();
        service
            .apply_discount(&ctx(), "TXN00001", DiscountRequest::Custom { percent: 50.0 })
            .await
            .unwrap();

        let items = service
            .db()
            .orders()
            .items_for_transaction("TXN00001")
            .await
            .unwrap();
        let discount: f64 = items.iter().map(|i| i.discount).sum();
        // Replaced, not stacked: 50% of 1000
        assert!((discount - 500.0).abs() < 1e-9);

        service
            .apply_discount(&ctx(), "TXN00001", DiscountRequest::Remove)
            .await
            .unwrap();
        let items = service
            .db()
            .orders()
            .items_for_transaction("TXN00001")
            .await
            .unwrap();
        assert!(items.iter().all(|i| i.discount == 0.0));
        assert!(items.iter().all(|i| i.discount_type.is_none()));
        assert!(items.iter().all(|i| i.total == i.subtotal));
    }

    #[tokio::test]
    async fn test_percent_out_of_range() {
        let service = service_with_order().await;

        let err = service
            .apply_discount(&ctx(), "TXN00001", DiscountRequest::Custom { percent: 150.0 })
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_empty_order_rejected() {
        let service = service_with_order().await;

        let err = service
            .apply_discount(&ctx(), "TXN99999", DiscountRequest::Employee)
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::InvalidState);
    }
}

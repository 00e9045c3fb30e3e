//! # Payment Operations
//!
//! Tender reconciliation and settlement.
//!
//! ## Settlement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_payment(500)         remaining 300                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  reconcile: applied = 300, change = 200                                 │
//! │       │                                                                 │
//! │       ▼                         (balance math uses the applied 300;     │
//! │  persist applied 300, given 500  the 200 goes back to the customer)     │
//! │       │                                                                 │
//! │       ▼  remaining now 0                                                │
//! │  complete_payment()                                                     │
//! │       ├── mark every line PAID (table released)                         │
//! │       ├── format + render receipt                                       │
//! │       └── dispatch to print sink ── failure is non-fatal                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::context::RequestContext;
use crate::error::ApiResult;
use crate::printing::PrintArtifact;
use crate::PosService;
use paluto_core::money::{order_totals, remaining_balance, total_paid, total_tendered};
use paluto_core::receipt::{format_receipt, ReceiptEntry, ReceiptInput, ReceiptLine};
use paluto_core::render::render_receipt;
use paluto_core::validation::{validate_payment_amount, validate_token};
use paluto_core::{
    reconcile, CoreError, OrderLedger, OrderTotals, Payment, PaymentMethod, Reconciled,
};

/// Outcome of settling a transaction.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub transaction_id: String,
    pub totals: OrderTotals,
    /// Raw cash tendered across payments, change included.
    pub tendered: f64,
    /// Change handed back across tenders: `tendered - total paid`.
    pub change: f64,
    /// Whether the receipt reached the print sink.
    pub printed: bool,
    /// Where the receipt was saved when the sink fell back to disk.
    pub receipt_path: Option<std::path::PathBuf>,
}

impl PosService {
    /// Records a tender against a transaction.
    ///
    /// Only the applied portion is persisted; change is returned to the
    /// caller and never enters the books. `Σ payments ≤ total due` holds
    /// after every call.
    pub async fn record_payment(
        &self,
        ctx: &RequestContext,
        transaction_id: &str,
        amount_given: f64,
        method: PaymentMethod,
    ) -> ApiResult<Reconciled> {
        validate_token(transaction_id)?;
        validate_payment_amount(amount_given)?;

        let _guard = self.locks().acquire(transaction_id).await;

        let items = self
            .db()
            .orders()
            .items_for_transaction(transaction_id)
            .await?;
        if items.is_empty() {
            return Err(CoreError::TransactionNotFound(transaction_id.to_string()).into());
        }
        let payments = self
            .db()
            .payments()
            .for_transaction(transaction_id)
            .await?;

        let remaining = remaining_balance(&items, &payments);
        let reconciled = reconcile(amount_given, remaining)?;

        if reconciled.applied_amount > 0.0 {
            let payment = Payment {
                id: Self::new_row_id(),
                transaction_id: transaction_id.to_string(),
                amount: reconciled.applied_amount,
                amount_given,
                method,
                created_at: Utc::now(),
            };
            self.db().payments().insert(&payment).await?;
        }

        info!(
            transaction_id = %transaction_id,
            cashier = %ctx.cashier,
            given = amount_given,
            applied = reconciled.applied_amount,
            change = reconciled.change,
            method = ?method,
            "Payment recorded"
        );
        Ok(reconciled)
    }

    /// Settles a transaction: marks it PAID, generates the receipt and
    /// dispatches it to the print sink.
    ///
    /// The PAID transition is unconditional; a print failure is logged and
    /// reported in the settlement, never propagated as an error.
    pub async fn complete_payment(
        &self,
        ctx: &RequestContext,
        transaction_id: &str,
    ) -> ApiResult<Settlement> {
        validate_token(transaction_id)?;

        let _guard = self.locks().acquire(transaction_id).await;

        let items = self
            .db()
            .orders()
            .items_for_transaction(transaction_id)
            .await?;
        if items.is_empty() {
            return Err(CoreError::TransactionNotFound(transaction_id.to_string()).into());
        }
        let payments = self
            .db()
            .payments()
            .for_transaction(transaction_id)
            .await?;

        self.db().orders().mark_paid(transaction_id).await?;

        let totals = order_totals(&items);
        let tendered = total_tendered(&payments);
        let change = (tendered - total_paid(&payments)).max(0.0);

        let lines = self.build_receipt(ctx, &items, tendered, change).await?;
        let document = render_receipt(&lines, &self.settings().render);

        let (printed, receipt_path) = match self.printer().print(transaction_id, &document) {
            Ok(PrintArtifact::Printed) => (true, None),
            Ok(PrintArtifact::SavedTo(path)) => (true, Some(path)),
            Err(e) => {
                warn!(
                    transaction_id = %transaction_id,
                    error = %e,
                    "Receipt print failed; settlement proceeds"
                );
                (false, None)
            }
        };

        info!(
            transaction_id = %transaction_id,
            cashier = %ctx.cashier,
            total = totals.total,
            tendered = tendered,
            printed = printed,
            "Transaction settled"
        );

        Ok(Settlement {
            transaction_id: transaction_id.to_string(),
            totals,
            tendered,
            change,
            printed,
            receipt_path,
        })
    }

    /// Formats the receipt for a transaction as tagged lines.
    ///
    /// Available before or after settlement; used for reprints and print
    /// preview.
    pub async fn format_receipt(
        &self,
        ctx: &RequestContext,
        transaction_id: &str,
    ) -> ApiResult<Vec<ReceiptLine>> {
        validate_token(transaction_id)?;

        let items = self
            .db()
            .orders()
            .items_for_transaction(transaction_id)
            .await?;
        if items.is_empty() {
            return Err(CoreError::TransactionNotFound(transaction_id.to_string()).into());
        }
        let payments = self
            .db()
            .payments()
            .for_transaction(transaction_id)
            .await?;

        let tendered = total_tendered(&payments);
        let change = (tendered - total_paid(&payments)).max(0.0);

        self.build_receipt(ctx, &items, tendered, change).await
    }

    async fn build_receipt(
        &self,
        ctx: &RequestContext,
        items: &[paluto_core::LineItem],
        tendered: f64,
        change: f64,
    ) -> ApiResult<Vec<ReceiptLine>> {
        let ledger = OrderLedger::from_lines(items.to_vec());

        let mut entries = Vec::with_capacity(ledger.len());
        for line in ledger.lines() {
            let product = self.require_product(&line.product_id).await?;
            entries.push(ReceiptEntry::from_line(line, &product));
        }

        let table_id = ledger.lines().first().map(|l| l.table_id).unwrap_or(0);

        let input = ReceiptInput {
            store_name: self.settings().store_name.clone(),
            address: self.settings().store_address.clone(),
            table_id,
            cashier: ctx.cashier.clone(),
            entries,
            totals: order_totals(ledger.lines()),
            tendered,
            change,
            timestamp: Utc::now(),
        };

        Ok(format_receipt(&input))
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
    use paluto_core::{OrderMode, OrderStatus, Product, Uom};
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
            price: 100.0,
        };
        db.products().insert(&dish).await.unwrap();

        let mut settings = Settings::default();
        settings.receipt_fallback_dir =
            std::env::temp_dir().join(format!("paluto-receipts-{}", uuid::Uuid::new_v4()));

        let service = PosService::new(db, settings);
        // Order totalling 300
        service
            .checkout(
                &ctx(),
                "TXN00001",
                7,
                vec![CheckoutEntry {
                    product_id: "p-1".to_string(),
                    quantity: 3,
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
    async fn test_overtender_caps_applied() {
        let service = service_with_order().await;

        let reconciled = service
            .record_payment(&ctx(), "TXN00001", 500.0, PaymentMethod::Cash)
            .await
            .unwrap();

        assert_eq!(reconciled.applied_amount, 300.0);
        assert_eq!(reconciled.change, 200.0);

        // Only the applied portion is in the books
        let paid = service
            .db()
            .payments()
            .total_paid("TXN00001")
            .await
            .unwrap();
        assert_eq!(paid, 300.0);
    }

    #[tokio::test]
    async fn test_partial_payments_never_exceed_total() {
        let service = service_with_order().await;

        service
            .record_payment(&ctx(), "TXN00001", 120.0, PaymentMethod::Cash)
            .await
            .unwrap();
        service
            .record_payment(&ctx(), "TXN00001", 120.0, PaymentMethod::Gcash)
            .await
            .unwrap();
        let last = service
            .record_payment(&ctx(), "TXN00001", 120.0, PaymentMethod::Cash)
            .await
            .unwrap();

        // Third tender only needed 60
        assert_eq!(last.applied_amount, 60.0);
        assert_eq!(last.change, 60.0);

        let paid = service
            .db()
            .payments()
            .total_paid("TXN00001")
            .await
            .unwrap();
        assert_eq!(paid, 300.0);
    }

    #[tokio::test]
    async fn test_invalid_tender_rejected() {
        let service = service_with_order().await;

        for bad in [0.0, -5.0, f64::NAN] {
            let err = service
                .record_payment(&ctx(), "TXN00001", bad, PaymentMethod::Cash)
                .await
                .unwrap_err();
            assert_eq!(err.code, crate::ErrorCode::InvalidInput);
        }
    }

    #[tokio::test]
    async fn test_settlement_marks_paid_and_saves_receipt() {
        let service = service_with_order().await;

        service
            .record_payment(&ctx(), "TXN00001", 500.0, PaymentMethod::Cash)
            .await
            .unwrap();
        let settlement = service
            .complete_payment(&ctx(), "TXN00001")
            .await
            .unwrap();

        // The customer handed over 500 in cash; 200 went back as change
        assert_eq!(settlement.tendered, 500.0);
        assert_eq!(settlement.change, 200.0);
        assert!(settlement.printed);
        let path = settlement.receipt_path.expect("file sink saves to disk");
        assert!(path.exists());

        // Every line is PAID, so the table is free
        let items = service
            .db()
            .orders()
            .items_for_transaction("TXN00001")
            .await
            .unwrap();
        assert!(items.iter().all(|i| i.status == OrderStatus::Paid));
        assert!(service
            .db()
            .orders()
            .occupied_tables()
            .await
            .unwrap()
            .is_empty());

        std::fs::remove_file(path).ok();
    }

    #[tokio::test]
    async fn test_receipt_contents() {
        let service = service_with_order().await;

        service
            .record_payment(&ctx(), "TXN00001", 300.0, PaymentMethod::Cash)
            .await
            .unwrap();

        let lines = service.format_receipt(&ctx(), "TXN00001").await.unwrap();
        let text: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();

        assert!(text.iter().any(|l| l.contains("PALUTO SEAFOOD HOUSE")));
        assert!(text.iter().any(|l| l.contains("SISIG")));
        assert!(text.iter().any(|l| l.starts_with("TOTAL:")));
        assert!(text.iter().any(|l| l.starts_with("CASHIER:") && l.ends_with("ANA")));
    }

    #[tokio::test]
    async fn test_receipt_footer_shows_raw_tender_and_change() {
        let service = service_with_order().await;

        service
            .record_payment(&ctx(), "TXN00001", 500.0, PaymentMethod::Cash)
            .await
            .unwrap();

        let lines = service.format_receipt(&ctx(), "TXN00001").await.unwrap();
        let text: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();

        // The footer reflects the cash that crossed the counter, not the
        // capped applied amount
        assert!(text
            .iter()
            .any(|l| l.starts_with("AMOUNT TENDERED:") && l.ends_with("500.00")));
        assert!(text
            .iter()
            .any(|l| l.starts_with("CHANGE:") && l.ends_with("200.00")));
    }

    #[tokio::test]
    async fn test_settle_unknown_transaction() {
        let service = service_with_order().await;

        let err = service
            .complete_payment(&ctx(), "TXN99999")
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::NotFound);
    }
}

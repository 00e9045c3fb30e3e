//! # Order Operations
//!
//! Checkout, running-order edits, cancellation, kitchen progress and the
//! floor overview.
//!
//! ## Operation Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier                         Kitchen                                │
//! │  ───────                         ───────                                │
//! │                                                                         │
//! │  checkout() ──────► PENDING ──► ACTIVE ──► set_status(READY)           │
//! │                        │                        │                       │
//! │  cancel_pending() ◄────┘                        ▼                       │
//! │                                          set_status(SERVED)            │
//! │  merge_or_insert_item()                                                 │
//! │    └── same ACTIVE dish? merge : insert                                 │
//! │                                                                         │
//! │  table_overview()  ─── who sits where                                   │
//! │  kitchen_orders()  ─── what still needs cooking                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::context::RequestContext;
use crate::error::{ApiError, ApiResult};
use crate::PosService;
use paluto_core::ledger::{self, CheckoutEntry};
use paluto_core::validation::{
    validate_batch_size, validate_portion, validate_table_id, validate_token,
};
use paluto_core::{CoreError, LineItem, OrderMode, OrderStatus, Product};

// =============================================================================
// Payloads
// =============================================================================

/// One slot in the floor overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableStatus {
    pub table_id: i64,
    /// True for kubo huts (their own number band).
    pub is_hut: bool,
    pub occupied: bool,
    /// The transaction seated here, when occupied.
    pub transaction_id: Option<String>,
}

/// One dish on the kitchen board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KitchenItem {
    /// Composed dish name with the D./A. state prefix.
    pub name: String,
    pub quantity: i64,
    pub weight_kg: f64,
    pub status: OrderStatus,
}

/// One transaction's outstanding dishes, for the kitchen board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KitchenOrder {
    pub transaction_id: String,
    pub table_id: i64,
    pub items: Vec<KitchenItem>,
}

// =============================================================================
// Operations
// =============================================================================

impl PosService {
    /// Stages a checkout batch and confirms it in one step.
    ///
    /// Lines land as PENDING, then the whole transaction moves to ACTIVE so
    /// the kitchen sees it. An empty batch is rejected before anything is
    /// written.
    pub async fn checkout(
        &self,
        ctx: &RequestContext,
        transaction_id: &str,
        table_id: i64,
        batch: Vec<CheckoutEntry>,
        order_mode: OrderMode,
    ) -> ApiResult<Vec<LineItem>> {
        validate_token(transaction_id)?;
        validate_table_id(table_id)?;
        validate_batch_size(batch.len())?;

        let _guard = self.locks().acquire(transaction_id).await;

        if batch.is_empty() {
            return Err(CoreError::EmptyCheckout.into());
        }

        // Resolve products and validate each portion before building
        let mut entries = Vec::with_capacity(batch.len());
        for entry in batch {
            let product = self.require_product(&entry.product_id).await?;
            validate_portion(product.uom, entry.quantity, entry.grams)?;
            entries.push((entry, product, Self::new_row_id()));
        }

        let lines =
            ledger::build_checkout_lines(transaction_id, table_id, &entries, order_mode, Utc::now())?;

        self.db().orders().insert_items(&lines).await?;
        self.db()
            .orders()
            .set_status(transaction_id, OrderStatus::Pending, OrderStatus::Active)
            .await?;

        info!(
            transaction_id = %transaction_id,
            table_id = table_id,
            cashier = %ctx.cashier,
            items = lines.len(),
            "Checkout confirmed"
        );

        // Return the lines as the kitchen now sees them
        let mut confirmed = lines;
        for line in &mut confirmed {
            line.status = OrderStatus::Active;
        }
        Ok(confirmed)
    }

    /// Adds a product to a running order, merging into an existing ACTIVE
    /// line for the same dish when one exists.
    pub async fn merge_or_insert_item(
        &self,
        ctx: &RequestContext,
        transaction_id: &str,
        table_id: i64,
        product_id: &str,
        quantity: i64,
        grams: f64,
        order_mode: OrderMode,
    ) -> ApiResult<LineItem> {
        validate_token(transaction_id)?;
        validate_table_id(table_id)?;

        let _guard = self.locks().acquire(transaction_id).await;

        let product = self.require_product(product_id).await?;
        validate_portion(product.uom, quantity, grams)?;

        let existing = self
            .db()
            .orders()
            .find_merge_target(transaction_id, product_id)
            .await?;

        let line = match existing {
            Some(mut line) => {
                ledger::merge_line(&mut line, &product, quantity, grams);
                self.db().orders().update_portion(&line).await?;
                debug!(
                    transaction_id = %transaction_id,
                    line_id = %line.id,
                    "Merged repeat order into existing line"
                );
                line
            }
            None => {
                let line = ledger::new_line(
                    Self::new_row_id(),
                    transaction_id,
                    table_id,
                    &product,
                    quantity,
                    grams,
                    OrderStatus::Active,
                    order_mode,
                    Utc::now(),
                );
                self.db().orders().insert_item(&line).await?;
                line
            }
        };

        info!(
            transaction_id = %transaction_id,
            cashier = %ctx.cashier,
            product_id = %product_id,
            "Order line added"
        );
        Ok(line)
    }

    /// Removes everything still PENDING from a transaction.
    ///
    /// Confirmed lines stay: the kitchen may already be cooking them.
    /// Returns the number of lines removed.
    pub async fn cancel_pending(
        &self,
        ctx: &RequestContext,
        transaction_id: &str,
    ) -> ApiResult<u64> {
        validate_token(transaction_id)?;

        let _guard = self.locks().acquire(transaction_id).await;

        let removed = self.db().orders().delete_pending(transaction_id).await?;

        info!(
            transaction_id = %transaction_id,
            cashier = %ctx.cashier,
            removed = removed,
            "Pending lines cancelled"
        );
        Ok(removed)
    }

    /// Advances a transaction through the kitchen: ACTIVE→READY or
    /// READY→SERVED. Everything else is rejected; PAID is reached only
    /// through settlement.
    pub async fn set_status(
        &self,
        ctx: &RequestContext,
        transaction_id: &str,
        new_status: OrderStatus,
    ) -> ApiResult<u64> {
        validate_token(transaction_id)?;

        let _guard = self.locks().acquire(transaction_id).await;

        let items = self
            .db()
            .orders()
            .items_for_transaction(transaction_id)
            .await?;
        let current = items
            .iter()
            .map(|item| item.status)
            .max_by_key(|status| *status as u8)
            .ok_or_else(|| CoreError::TransactionNotFound(transaction_id.to_string()))
            .map_err(ApiError::from)?;

        ledger::validate_kitchen_transition(transaction_id, current, new_status)?;

        let moved = self
            .db()
            .orders()
            .set_status(transaction_id, current, new_status)
            .await?;

        info!(
            transaction_id = %transaction_id,
            cashier = %ctx.cashier,
            from = ?current,
            to = ?new_status,
            moved = moved,
            "Order advanced"
        );
        Ok(moved)
    }

    /// The floor overview: every table and hut with its occupancy.
    pub async fn table_overview(&self) -> ApiResult<Vec<TableStatus>> {
        let occupied = self.db().orders().occupied_tables().await?;

        let slot = |table_id: i64, is_hut: bool| {
            let seat = occupied.iter().find(|o| o.table_id == table_id);
            TableStatus {
                table_id,
                is_hut,
                occupied: seat.is_some(),
                transaction_id: seat.map(|o| o.transaction_id.clone()),
            }
        };

        let (table_lo, table_hi) = self.settings().table_range;
        let (hut_lo, hut_hi) = self.settings().hut_range;

        let mut overview: Vec<TableStatus> =
            (table_lo..=table_hi).map(|id| slot(id, false)).collect();
        overview.extend((hut_lo..=hut_hi).map(|id| slot(id, true)));

        Ok(overview)
    }

    /// The kitchen board: every ACTIVE and READY dish, grouped per
    /// transaction, with composed kitchen names.
    pub async fn kitchen_orders(&self) -> ApiResult<Vec<KitchenOrder>> {
        let items = self.db().orders().kitchen_items().await?;

        let mut orders: Vec<KitchenOrder> = Vec::new();
        for item in items {
            let product = self.require_product(&item.product_id).await?;

            let kitchen_item = KitchenItem {
                name: product.kitchen_name(),
                quantity: item.quantity,
                weight_kg: item.weight_kg,
                status: item.status,
            };

            match orders
                .iter_mut()
                .find(|o| o.transaction_id == item.transaction_id)
            {
                Some(order) => order.items.push(kitchen_item),
                None => orders.push(KitchenOrder {
                    transaction_id: item.transaction_id.clone(),
                    table_id: item.table_id,
                    items: vec![kitchen_item],
                }),
            }
        }

        Ok(orders)
    }

    pub(crate) async fn require_product(&self, product_id: &str) -> ApiResult<Product> {
        self.db()
            .products()
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()).into())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Settings;
    use paluto_db::{Database, DbConfig};
    use paluto_core::Uom;

    async fn service_with_menu() -> PosService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let fish = Product {
            id: "p-fish".to_string(),
            category: "SEAFOOD".to_string(),
            product_type: "FISH".to_string(),
            variety_1: "MAYA-MAYA".to_string(),
            variety_2: String::new(),
            state_1: "DEAD".to_string(),
            state_2: String::new(),
            luto: Some("SINIGANG".to_string()),
            uom: Uom::Kg,
            price: 450.0,
        };
        let rice = Product {
            id: "p-rice".to_string(),
            category: "RICE".to_string(),
            product_type: "RICE".to_string(),
            variety_1: "GARLIC".to_string(),
            variety_2: String::new(),
            state_1: String::new(),
            state_2: String::new(),
            luto: None,
            uom: Uom::Serve,
            price: 35.0,
        };
        db.products().insert(&fish).await.unwrap();
        db.products().insert(&rice).await.unwrap();

        PosService::new(db, Settings::default())
    }

    fn ctx() -> RequestContext {
        RequestContext::new("ANA", "counter-1")
    }

    fn entry(product_id: &str, quantity: i64, grams: f64) -> CheckoutEntry {
        CheckoutEntry {
            product_id: product_id.to_string(),
            quantity,
            grams,
        }
    }

    #[tokio::test]
    async fn test_checkout_confirms_batch() {
        let service = service_with_menu().await;

        let lines = service
            .checkout(
                &ctx(),
                "TXN00001",
                7,
                vec![entry("p-fish", 0, 750.0), entry("p-rice", 2, 0.0)],
                OrderMode::Regular,
            )
            .await
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.status == OrderStatus::Active));

        // 0.75 kg at 450/kg and 2 garlic rice at 35
        let stored = service
            .db()
            .orders()
            .items_for_transaction("TXN00001")
            .await
            .unwrap();
        let total: f64 = stored.iter().map(|l| l.total).sum();
        assert!((total - (337.5 + 70.0)).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_oversized_batch_rejected() {
        let service = service_with_menu().await;

        let batch: Vec<CheckoutEntry> = (0..101).map(|_| entry("p-rice", 1, 0.0)).collect();
        let err = service
            .checkout(&ctx(), "TXN00001", 7, batch, OrderMode::Regular)
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_empty_checkout_rejected() {
        let service = service_with_menu().await;

        let err = service
            .checkout(&ctx(), "TXN00001", 7, vec![], OrderMode::Regular)
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_repeat_order_merges() {
        let service = service_with_menu().await;

        service
            .checkout(
                &ctx(),
                "TXN00001",
                7,
                vec![entry("p-rice", 2, 0.0)],
                OrderMode::Regular,
            )
            .await
            .unwrap();

        let merged = service
            .merge_or_insert_item(&ctx(), "TXN00001", 7, "p-rice", 3, 0.0, OrderMode::Regular)
            .await
            .unwrap();

        assert_eq!(merged.quantity, 5);
        assert!((merged.subtotal - 175.0).abs() < 1e-9);

        // Still one line
        let stored = service
            .db()
            .orders()
            .items_for_transaction("TXN00001")
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_kitchen_flow_and_rejections() {
        let service = service_with_menu().await;

        service
            .checkout(
                &ctx(),
                "TXN00001",
                7,
                vec![entry("p-fish", 0, 500.0)],
                OrderMode::Regular,
            )
            .await
            .unwrap();

        // Cannot jump ACTIVE → SERVED
        let err = service
            .set_status(&ctx(), "TXN00001", OrderStatus::Served)
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::InvalidState);

        service
            .set_status(&ctx(), "TXN00001", OrderStatus::Ready)
            .await
            .unwrap();
        service
            .set_status(&ctx(), "TXN00001", OrderStatus::Served)
            .await
            .unwrap();

        // No backward transition
        let err = service
            .set_status(&ctx(), "TXN00001", OrderStatus::Ready)
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::InvalidState);
    }

    #[tokio::test]
    async fn test_table_overview_marks_occupancy() {
        let service = service_with_menu().await;

        service
            .checkout(
                &ctx(),
                "TXN00001",
                103,
                vec![entry("p-rice", 1, 0.0)],
                OrderMode::Regular,
            )
            .await
            .unwrap();

        let overview = service.table_overview().await.unwrap();
        // 50 tables + 6 huts
        assert_eq!(overview.len(), 56);

        let hut = overview.iter().find(|t| t.table_id == 103).unwrap();
        assert!(hut.is_hut);
        assert!(hut.occupied);
        assert_eq!(hut.transaction_id.as_deref(), Some("TXN00001"));

        let table = overview.iter().find(|t| t.table_id == 1).unwrap();
        assert!(!table.occupied);
    }

    #[tokio::test]
    async fn test_kitchen_board_names_and_grouping() {
        let service = service_with_menu().await;

        service
            .checkout(
                &ctx(),
                "TXN00001",
                7,
                vec![entry("p-fish", 0, 750.0), entry("p-rice", 2, 0.0)],
                OrderMode::Regular,
            )
            .await
            .unwrap();

        let board = service.kitchen_orders().await.unwrap();
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].items.len(), 2);

        // Dead fish gets the D. prefix
        let names: Vec<&str> = board[0].items.iter().map(|i| i.name.as_str()).collect();
        assert!(names.iter().any(|n| n.starts_with("D. MAYA-MAYA")));
    }

    #[tokio::test]
    async fn test_cancel_pending_only() {
        let service = service_with_menu().await;

        // Confirmed order on the table
        service
            .checkout(
                &ctx(),
                "TXN00001",
                7,
                vec![entry("p-rice", 1, 0.0)],
                OrderMode::Regular,
            )
            .await
            .unwrap();

        let removed = service.cancel_pending(&ctx(), "TXN00001").await.unwrap();
        assert_eq!(removed, 0);

        let stored = service
            .db()
            .orders()
            .items_for_transaction("TXN00001")
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_product_rejected() {
        let service = service_with_menu().await;

        let err = service
            .merge_or_insert_item(&ctx(), "TXN00001", 7, "p-nope", 1, 0.0, OrderMode::Regular)
            .await
            .unwrap_err();
        assert_eq!(err.code, crate::ErrorCode::NotFound);
    }
}

//! # Order Repository
//!
//! Database operations for the order ledger.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. STAGE AT CHECKOUT                                                  │
//! │     └── insert_items() → rows with status PENDING                      │
//! │                                                                         │
//! │  2. CONFIRM                                                            │
//! │     └── set_status(txn, ACTIVE) → kitchen picks the order up           │
//! │                                                                         │
//! │  3. ADD TO A RUNNING ORDER                                             │
//! │     └── find_merge_target() + update_portion()  (same dish)            │
//! │     └── insert_item()                           (new dish)             │
//! │                                                                         │
//! │  4. KITCHEN PROGRESS                                                   │
//! │     └── set_status(txn, READY) → set_status(txn, SERVED)               │
//! │                                                                         │
//! │  5. SETTLE                                                             │
//! │     └── update_discounts() + mark_paid()                               │
//! │                                                                         │
//! │  (ANY TIME BEFORE CONFIRM) CANCEL                                      │
//! │     └── delete_pending() → PENDING rows removed, confirmed rows stay   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status transitions are validated in paluto-core before any of these
//! mutations run; this layer only persists what the ledger decided.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use paluto_core::{DiscountKind, LineItem, OrderStatus};

/// Repository for order ledger operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

/// One occupied table in the floor overview.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct OccupiedTable {
    pub table_id: i64,
    pub transaction_id: String,
}

const ITEM_COLUMNS: &str = r#"
    id, transaction_id, table_id, product_id,
    quantity, weight_kg, subtotal, discount, total,
    discount_type, status, order_mode, created_at
"#;

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Gets all line items for a transaction, oldest first.
    pub async fn items_for_transaction(&self, transaction_id: &str) -> DbResult<Vec<LineItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE transaction_id = ?1 ORDER BY created_at, id"
        );

        let items = sqlx::query_as::<_, LineItem>(&sql)
            .bind(transaction_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Finds the confirmed line for a product within a transaction, if any.
    ///
    /// Used as the merge target when the same dish is ordered again:
    /// only ACTIVE lines absorb repeats, dishes already in progress don't.
    pub async fn find_merge_target(
        &self,
        transaction_id: &str,
        product_id: &str,
    ) -> DbResult<Option<LineItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items \
             WHERE transaction_id = ?1 AND product_id = ?2 AND status = 'ACTIVE' \
             ORDER BY created_at LIMIT 1"
        );

        let item = sqlx::query_as::<_, LineItem>(&sql)
            .bind(transaction_id)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// Inserts a single line item.
    pub async fn insert_item(&self, item: &LineItem) -> DbResult<()> {
        debug!(
            transaction_id = %item.transaction_id,
            product_id = %item.product_id,
            "Inserting order line"
        );

        sqlx::query(
            r#"
            INSERT INTO order_items (
                id, transaction_id, table_id, product_id,
                quantity, weight_kg, subtotal, discount, total,
                discount_type, status, order_mode, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&item.id)
        .bind(&item.transaction_id)
        .bind(item.table_id)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.weight_kg)
        .bind(item.subtotal)
        .bind(item.discount)
        .bind(item.total)
        .bind(item.discount_type)
        .bind(item.status)
        .bind(item.order_mode)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a checkout batch atomically.
    ///
    /// Either every staged line lands or none do.
    pub async fn insert_items(&self, items: &[LineItem]) -> DbResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    id, transaction_id, table_id, product_id,
                    quantity, weight_kg, subtotal, discount, total,
                    discount_type, status, order_mode, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                "#,
            )
            .bind(&item.id)
            .bind(&item.transaction_id)
            .bind(item.table_id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.weight_kg)
            .bind(item.subtotal)
            .bind(item.discount)
            .bind(item.total)
            .bind(item.discount_type)
            .bind(item.status)
            .bind(item.order_mode)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Updates the measured portion and amounts of a merged line.
    pub async fn update_portion(&self, item: &LineItem) -> DbResult<()> {
        debug!(id = %item.id, "Updating merged line");

        let result = sqlx::query(
            r#"
            UPDATE order_items SET
                quantity = ?2,
                weight_kg = ?3,
                subtotal = ?4,
                total = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&item.id)
        .bind(item.quantity)
        .bind(item.weight_kg)
        .bind(item.subtotal)
        .bind(item.total)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order line", &item.id));
        }

        Ok(())
    }

    /// Deletes all PENDING lines of a transaction.
    ///
    /// Confirmed lines are untouched. Returns the number of rows removed.
    pub async fn delete_pending(&self, transaction_id: &str) -> DbResult<u64> {
        let result =
            sqlx::query("DELETE FROM order_items WHERE transaction_id = ?1 AND status = 'PENDING'")
                .bind(transaction_id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Moves every line of a transaction from one status to the next.
    ///
    /// The `from` guard makes the update a no-op for lines that already
    /// advanced, so a double-tap on the kitchen board can't regress anything.
    pub async fn set_status(
        &self,
        transaction_id: &str,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<u64> {
        debug!(
            transaction_id = %transaction_id,
            from = ?from,
            to = ?to,
            "Advancing order status"
        );

        let result = sqlx::query(
            "UPDATE order_items SET status = ?3 WHERE transaction_id = ?1 AND status = ?2",
        )
        .bind(transaction_id)
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Marks every line of a transaction PAID, whatever state it was in.
    pub async fn mark_paid(&self, transaction_id: &str) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE order_items SET status = 'PAID' WHERE transaction_id = ?1 AND status != 'PAID'",
        )
        .bind(transaction_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Persists a recomputed discount for one line.
    pub async fn update_discount(
        &self,
        item_id: &str,
        discount: f64,
        total: f64,
        discount_type: Option<DiscountKind>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE order_items SET discount = ?2, total = ?3, discount_type = ?4 WHERE id = ?1",
        )
        .bind(item_id)
        .bind(discount)
        .bind(total)
        .bind(discount_type)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order line", item_id));
        }

        Ok(())
    }

    /// Lists tables currently holding an unsettled, confirmed order.
    ///
    /// PENDING lines don't occupy a table (the cart was never confirmed)
    /// and PAID lines have released it.
    pub async fn occupied_tables(&self) -> DbResult<Vec<OccupiedTable>> {
        let tables = sqlx::query_as::<_, OccupiedTable>(
            r#"
            SELECT DISTINCT table_id, transaction_id
            FROM order_items
            WHERE status IN ('ACTIVE', 'READY', 'SERVED')
            ORDER BY table_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(tables)
    }

    /// Gets every line the kitchen still has to move: ACTIVE and READY.
    pub async fn kitchen_items(&self) -> DbResult<Vec<LineItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items \
             WHERE status IN ('ACTIVE', 'READY') \
             ORDER BY created_at, id"
        );

        let items = sqlx::query_as::<_, LineItem>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use paluto_core::{OrderMode, Product, Uom};

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let product = Product {
            id: "p-1".to_string(),
            category: "SEAFOOD".to_string(),
            product_type: "FISH".to_string(),
            variety_1: "MAYA-MAYA".to_string(),
            variety_2: String::new(),
            state_1: "DEAD".to_string(),
            state_2: String::new(),
            luto: Some("SINIGANG".to_string()),
            uom: Uom::Serve,
            price: 250.0,
        };
        db.products().insert(&product).await.unwrap();

        db
    }

    fn line(id: &str, txn: &str, status: OrderStatus) -> LineItem {
        LineItem {
            id: id.to_string(),
            transaction_id: txn.to_string(),
            table_id: 7,
            product_id: "p-1".to_string(),
            quantity: 2,
            weight_kg: 0.0,
            subtotal: 500.0,
            discount: 0.0,
            total: 500.0,
            discount_type: None,
            status,
            order_mode: OrderMode::Regular,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_fetch_roundtrip() {
        let db = setup().await;
        let repo = db.orders();

        repo.insert_item(&line("l-1", "TXN00001", OrderStatus::Active))
            .await
            .unwrap();

        let items = repo.items_for_transaction("TXN00001").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status, OrderStatus::Active);
        assert_eq!(items[0].total, 500.0);
    }

    #[tokio::test]
    async fn test_merge_target_only_matches_active() {
        let db = setup().await;
        let repo = db.orders();

        repo.insert_item(&line("l-1", "TXN00001", OrderStatus::Ready))
            .await
            .unwrap();
        assert!(repo
            .find_merge_target("TXN00001", "p-1")
            .await
            .unwrap()
            .is_none());

        repo.insert_item(&line("l-2", "TXN00001", OrderStatus::Active))
            .await
            .unwrap();
        let target = repo.find_merge_target("TXN00001", "p-1").await.unwrap();
        assert_eq!(target.unwrap().id, "l-2");
    }

    #[tokio::test]
    async fn test_delete_pending_spares_confirmed() {
        let db = setup().await;
        let repo = db.orders();

        repo.insert_item(&line("l-1", "TXN00001", OrderStatus::Pending))
            .await
            .unwrap();
        repo.insert_item(&line("l-2", "TXN00001", OrderStatus::Active))
            .await
            .unwrap();

        let removed = repo.delete_pending("TXN00001").await.unwrap();
        assert_eq!(removed, 1);

        let items = repo.items_for_transaction("TXN00001").await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "l-2");
    }

    #[tokio::test]
    async fn test_status_guard_ignores_other_states() {
        let db = setup().await;
        let repo = db.orders();

        repo.insert_item(&line("l-1", "TXN00001", OrderStatus::Active))
            .await
            .unwrap();
        repo.insert_item(&line("l-2", "TXN00001", OrderStatus::Served))
            .await
            .unwrap();

        let moved = repo
            .set_status("TXN00001", OrderStatus::Active, OrderStatus::Ready)
            .await
            .unwrap();
        assert_eq!(moved, 1);

        let items = repo.items_for_transaction("TXN00001").await.unwrap();
        let statuses: Vec<OrderStatus> = items.iter().map(|i| i.status).collect();
        assert!(statuses.contains(&OrderStatus::Ready));
        assert!(statuses.contains(&OrderStatus::Served));
    }

    #[tokio::test]
    async fn test_mark_paid_releases_table() {
        let db = setup().await;
        let repo = db.orders();

        repo.insert_item(&line("l-1", "TXN00001", OrderStatus::Served))
            .await
            .unwrap();
        assert_eq!(repo.occupied_tables().await.unwrap().len(), 1);

        repo.mark_paid("TXN00001").await.unwrap();
        assert!(repo.occupied_tables().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_kitchen_items_excludes_served() {
        let db = setup().await;
        let repo = db.orders();

        repo.insert_item(&line("l-1", "TXN00001", OrderStatus::Active))
            .await
            .unwrap();
        repo.insert_item(&line("l-2", "TXN00001", OrderStatus::Ready))
            .await
            .unwrap();
        repo.insert_item(&line("l-3", "TXN00001", OrderStatus::Served))
            .await
            .unwrap();

        let board = repo.kitchen_items().await.unwrap();
        assert_eq!(board.len(), 2);
    }

    #[tokio::test]
    async fn test_update_discount() {
        let db = setup().await;
        let repo = db.orders();

        repo.insert_item(&line("l-1", "TXN00001", OrderStatus::Active))
            .await
            .unwrap();

        repo.update_discount("l-1", 100.0, 400.0, Some(DiscountKind::Senior))
            .await
            .unwrap();

        let items = repo.items_for_transaction("TXN00001").await.unwrap();
        assert_eq!(items[0].discount, 100.0);
        assert_eq!(items[0].total, 400.0);
        assert_eq!(items[0].discount_type, Some(DiscountKind::Senior));
    }
}

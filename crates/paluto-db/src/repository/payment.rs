//! # Payment Repository
//!
//! Database operations for payments.
//!
//! Payments accumulate against a transaction until the balance reaches
//! zero; the applied amount is capped in paluto-core before it gets here,
//! so `SUM(amount)` can never exceed the order total.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use paluto_core::Payment;

/// Repository for payment database operations.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRepository { pool }
    }

    /// Records a payment.
    pub async fn insert(&self, payment: &Payment) -> DbResult<()> {
        debug!(
            transaction_id = %payment.transaction_id,
            amount = payment.amount,
            method = ?payment.method,
            "Recording payment"
        );

        sqlx::query(
            r#"
            INSERT INTO payments (id, transaction_id, amount, amount_given, method, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.transaction_id)
        .bind(payment.amount)
        .bind(payment.amount_given)
        .bind(payment.method)
        .bind(payment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets all payments for a transaction, oldest first.
    pub async fn for_transaction(&self, transaction_id: &str) -> DbResult<Vec<Payment>> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT id, transaction_id, amount, amount_given, method, created_at
            FROM payments
            WHERE transaction_id = ?1
            ORDER BY created_at, id
            "#,
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(payments)
    }

    /// Gets the total applied amount for a transaction.
    pub async fn total_paid(&self, transaction_id: &str) -> DbResult<f64> {
        let total: Option<f64> =
            sqlx::query_scalar("SELECT SUM(amount) FROM payments WHERE transaction_id = ?1")
                .bind(transaction_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(total.unwrap_or(0.0))
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
    use paluto_core::PaymentMethod;

    fn payment(id: &str, amount: f64, method: PaymentMethod) -> Payment {
        Payment {
            id: id.to_string(),
            transaction_id: "TXN00001".to_string(),
            amount,
            amount_given: amount,
            method,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_payments_accumulate() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.payments();

        repo.insert(&payment("pay-1", 300.0, PaymentMethod::Cash))
            .await
            .unwrap();
        let mut overtender = payment("pay-2", 200.0, PaymentMethod::Gcash);
        overtender.amount_given = 250.0;
        repo.insert(&overtender).await.unwrap();

        let payments = repo.for_transaction("TXN00001").await.unwrap();
        assert_eq!(payments.len(), 2);
        assert_eq!(payments[1].amount_given, 250.0);
        assert_eq!(repo.total_paid("TXN00001").await.unwrap(), 500.0);
    }

    #[tokio::test]
    async fn test_total_paid_defaults_to_zero() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.payments();

        assert_eq!(repo.total_paid("UNKNOWN1").await.unwrap(), 0.0);
    }
}

//! # Product Repository
//!
//! Database operations for the menu.
//!
//! ## Menu Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  A seafood house menu is a taxonomy, not a flat list:                   │
//! │                                                                         │
//! │  category ──► product_type ──► variety ──► state ──► luto               │
//! │  SEAFOOD      FISH            MAYA-MAYA   DEAD       SINIGANG           │
//! │                                                                         │
//! │  The same fish sold live, cooked, or by weight is a separate row with  │
//! │  its own price and unit of measure (SERVE vs KG).                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use paluto_core::Product;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category, product_type, variety_1, variety_2,
                   state_1, state_2, luto, uom, price
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by ID, failing if it doesn't exist.
    pub async fn require(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Lists the whole menu ordered by taxonomy.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category, product_type, variety_1, variety_2,
                   state_1, state_2, luto, uom, price
            FROM products
            ORDER BY category, product_type, variety_1, variety_2
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists products in one menu category.
    pub async fn list_by_category(&self, category: &str) -> DbResult<Vec<Product>> {
        debug!(category = %category, "Listing products by category");

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, category, product_type, variety_1, variety_2,
                   state_1, state_2, luto, uom, price
            FROM products
            WHERE category = ?1
            ORDER BY product_type, variety_1, variety_2
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Inserts a product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, category, product_type, variety_1, variety_2,
                state_1, state_2, luto, uom, price
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.category)
        .bind(&product.product_type)
        .bind(&product.variety_1)
        .bind(&product.variety_2)
        .bind(&product.state_1)
        .bind(&product.state_2)
        .bind(&product.luto)
        .bind(product.uom)
        .bind(product.price)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts products in the menu.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Product Repository
//!
//! Database operations for products.
//!
//! Products are the one entity with a **hard** delete: the legacy data
//! model keeps a deleted_at column on the table, but only the search
//! path filters on it and the delete operation removes the row
//! physically. The list-all read applies no deleted_at filter unless
//! [`ReadPolicy`] says otherwise.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::ReadPolicy;
use mercado_core::Product;

/// Fields for a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub brand: String,
}

/// Partial update for a product. `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price_cents: Option<i64>,
    pub brand: Option<String>,
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, price_cents, brand, created_at, updated_at, deleted_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    policy: ReadPolicy,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool, policy: ReadPolicy) -> Self {
        ProductRepository { pool, policy }
    }

    /// Lists products.
    ///
    /// Whether soft-deleted rows appear is governed by
    /// `ReadPolicy::product_list_includes_deleted` (legacy default: they do).
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        debug!("Listing products");

        let sql = if self.policy.product_list_includes_deleted {
            format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at")
        } else {
            format!(
                "SELECT {PRODUCT_COLUMNS} FROM products \
                 WHERE deleted_at IS NULL ORDER BY created_at"
            )
        };

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Searches products by name substring.
    ///
    /// Unlike list, search always excludes soft-deleted rows. An empty
    /// query matches every row.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        debug!(query = %query, "Searching products");

        let pattern = format!("%{}%", query);
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE name LIKE ?1 AND deleted_at IS NULL ORDER BY created_at"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Inserts a new product.
    pub async fn create(&self, input: NewProduct) -> DbResult<Product> {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            price_cents: input.price_cents,
            brand: input.brand,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            "INSERT INTO products (id, name, description, price_cents, brand, \
             created_at, updated_at, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(&product.brand)
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(product.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Applies a partial update to a product.
    ///
    /// There is no pre-query existence check; a missing id surfaces as
    /// NotFound from the zero-rows-affected result.
    pub async fn update(&self, id: &str, patch: ProductPatch) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET \
                name = COALESCE(?2, name), \
                description = COALESCE(?3, description), \
                price_cents = COALESCE(?4, price_cents), \
                brand = COALESCE(?5, brand), \
                updated_at = ?6 \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.price_cents)
        .bind(patch.brand)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Hard-deletes a product and returns the removed row.
    pub async fn delete(&self, id: &str) -> DbResult<Product> {
        debug!(id = %id, "Deleting product");

        let product = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(product)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

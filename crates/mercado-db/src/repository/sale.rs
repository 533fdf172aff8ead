//! # Sale Repository
//!
//! Database operations for sales and their line items.
//!
//! ## Aggregate Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Sale Aggregate                                │
//! │                                                                     │
//! │  sales ──────────────┬── customer_id ──► customers                  │
//! │    │                 │                                              │
//! │    │ owns            └── sale_date, name, description               │
//! │    ▼                                                                │
//! │  sale_products ── product_id ──► products                           │
//! │                                                                     │
//! │  CREATE: header + all line items in ONE transaction                 │
//! │  READ:   header + embedded customer + lines with embedded product   │
//! │  UPDATE: customer_id and sale_date only (lines are immutable)       │
//! │  DELETE: soft (deleted_at)                                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::ReadPolicy;
use mercado_core::{Customer, Product, Sale, SaleLineView, SaleProduct, SaleView};

/// One line item of a new sale.
#[derive(Debug, Clone)]
pub struct NewSaleLine {
    pub product_id: String,
    pub quantity: i64,
}

/// Fields for a new sale, line items included.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub name: String,
    pub description: String,
    pub customer_id: String,
    pub sale_date: DateTime<Utc>,
    pub products: Vec<NewSaleLine>,
}

/// Update for a sale. Only the customer and the sale date can change.
#[derive(Debug, Clone, Default)]
pub struct SaleUpdate {
    pub customer_id: Option<String>,
    pub sale_date: Option<DateTime<Utc>>,
}

const SALE_COLUMNS: &str =
    "id, name, description, customer_id, sale_date, created_at, updated_at, deleted_at";

/// Flat row for a sale line joined with its product.
#[derive(sqlx::FromRow)]
struct SaleLineRow {
    id: String,
    sale_id: String,
    product_id: String,
    quantity: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    p_name: String,
    p_description: String,
    p_price_cents: i64,
    p_brand: String,
    p_created_at: DateTime<Utc>,
    p_updated_at: DateTime<Utc>,
    p_deleted_at: Option<DateTime<Utc>>,
}

impl From<SaleLineRow> for SaleLineView {
    fn from(row: SaleLineRow) -> Self {
        let product = Product {
            id: row.product_id.clone(),
            name: row.p_name,
            description: row.p_description,
            price_cents: row.p_price_cents,
            brand: row.p_brand,
            created_at: row.p_created_at,
            updated_at: row.p_updated_at,
            deleted_at: row.p_deleted_at,
        };
        SaleLineView {
            line: SaleProduct {
                id: row.id,
                sale_id: row.sale_id,
                product_id: row.product_id,
                quantity: row.quantity,
                created_at: row.created_at,
                updated_at: row.updated_at,
                deleted_at: row.deleted_at,
            },
            product,
        }
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    policy: ReadPolicy,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool, policy: ReadPolicy) -> Self {
        SaleRepository { pool, policy }
    }

    /// Lists live sales with embedded customer and line items.
    pub async fn list(&self) -> DbResult<Vec<SaleView>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE deleted_at IS NULL ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut views = Vec::with_capacity(sales.len());
        for sale in sales {
            views.push(self.load_view(sale).await?);
        }
        Ok(views)
    }

    /// Gets a live sale by ID with embedded customer and line items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleView>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match sale {
            Some(sale) => Ok(Some(self.load_view(sale).await?)),
            None => Ok(None),
        }
    }

    /// Searches live sales by name substring.
    pub async fn search(&self, query: &str) -> DbResult<Vec<SaleView>> {
        debug!(query = %query, "Searching sales");

        let pattern = format!("%{}%", query);
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE name LIKE ?1 AND deleted_at IS NULL ORDER BY created_at"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        let mut views = Vec::with_capacity(sales.len());
        for sale in sales {
            views.push(self.load_view(sale).await?);
        }
        Ok(views)
    }

    /// Creates a sale and all of its line items in one transaction.
    ///
    /// Line-item product ids are not pre-validated: a dangling reference
    /// fails the whole transaction with a foreign-key violation.
    pub async fn create(&self, input: NewSale) -> DbResult<SaleView> {
        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            customer_id: input.customer_id,
            sale_date: input.sale_date,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        debug!(id = %sale.id, lines = input.products.len(), "Inserting sale");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO sales (id, name, description, customer_id, sale_date, \
             created_at, updated_at, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&sale.id)
        .bind(&sale.name)
        .bind(&sale.description)
        .bind(&sale.customer_id)
        .bind(sale.sale_date)
        .bind(sale.created_at)
        .bind(sale.updated_at)
        .bind(sale.deleted_at)
        .execute(&mut *tx)
        .await?;

        for line in &input.products {
            sqlx::query(
                "INSERT INTO sale_products (id, sale_id, product_id, quantity, \
                 created_at, updated_at, deleted_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale.id)
            .bind(&line.product_id)
            .bind(line.quantity)
            .bind(now)
            .bind(now)
            .bind(Option::<DateTime<Utc>>::None)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.load_view(sale).await
    }

    /// Updates a sale's customer and sale date.
    ///
    /// Fails with NotFound when no row with that id exists. Whether the
    /// existence check requires the sale to be live is governed by
    /// `ReadPolicy::sale_update_checks_deleted` (legacy default: it
    /// does not, so soft-deleted sales pass the check).
    pub async fn update(&self, id: &str, update: SaleUpdate) -> DbResult<SaleView> {
        debug!(id = %id, "Updating sale");

        let check_sql = if self.policy.sale_update_checks_deleted {
            "SELECT id FROM sales WHERE id = ?1 AND deleted_at IS NULL"
        } else {
            "SELECT id FROM sales WHERE id = ?1"
        };

        let exists: Option<String> = sqlx::query_scalar(check_sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Err(DbError::not_found("Sale", id));
        }

        let now = Utc::now();

        sqlx::query(
            "UPDATE sales SET \
                customer_id = COALESCE(?2, customer_id), \
                sale_date = COALESCE(?3, sale_date), \
                updated_at = ?4 \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(update.customer_id)
        .bind(update.sale_date)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let sale = self
            .fetch_any(id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;
        self.load_view(sale).await
    }

    /// Soft-deletes a sale and returns its nested view.
    pub async fn delete(&self, id: &str) -> DbResult<SaleView> {
        debug!(id = %id, "Soft-deleting sale");

        let now = Utc::now();

        let result =
            sqlx::query("UPDATE sales SET deleted_at = ?2, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        let sale = self
            .fetch_any(id)
            .await?
            .ok_or_else(|| DbError::not_found("Sale", id))?;
        self.load_view(sale).await
    }

    /// Fetches a sale row regardless of soft-delete state.
    async fn fetch_any(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Loads the nested view for a sale header row.
    async fn load_view(&self, sale: Sale) -> DbResult<SaleView> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, name, cpf_or_cnpj, email, phone, created_at, updated_at, deleted_at \
             FROM customers WHERE id = ?1",
        )
        .bind(&sale.customer_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, SaleLineRow>(
            "SELECT sp.id, sp.sale_id, sp.product_id, sp.quantity, \
                    sp.created_at, sp.updated_at, sp.deleted_at, \
                    p.name AS p_name, p.description AS p_description, \
                    p.price_cents AS p_price_cents, p.brand AS p_brand, \
                    p.created_at AS p_created_at, p.updated_at AS p_updated_at, \
                    p.deleted_at AS p_deleted_at \
             FROM sale_products sp \
             INNER JOIN products p ON p.id = sp.product_id \
             WHERE sp.sale_id = ?1 \
             ORDER BY sp.created_at",
        )
        .bind(&sale.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(SaleView {
            sale,
            customer,
            products: rows.into_iter().map(SaleLineView::from).collect(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::customer::NewCustomer;
    use crate::repository::product::NewProduct;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_customer(db: &Database) -> String {
        db.customers()
            .create(NewCustomer {
                name: "Ellie Williams".to_string(),
                cpf_or_cnpj: "391.945.720-03".to_string(),
                email: "ellie@example.com".to_string(),
                phone: "(84) 9 9110-6666".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_product(db: &Database, name: &str) -> String {
        db.products()
            .create(NewProduct {
                name: name.to_string(),
                description: "test product".to_string(),
                price_cents: 50_000,
                brand: "Razer".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    async fn seed_sale(db: &Database, name: &str, product_id: &str, quantity: i64) -> SaleView {
        let customer_id = seed_customer(db).await;
        db.sales()
            .create(NewSale {
                name: name.to_string(),
                description: "test sale".to_string(),
                customer_id,
                sale_date: Utc::now(),
                products: vec![NewSaleLine {
                    product_id: product_id.to_string(),
                    quantity,
                }],
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_round_trip_with_embedded_product() {
        let db = test_db().await;
        let product_id = seed_product(&db, "Headset Kraken").await;

        let created = seed_sale(&db, "October sale", &product_id, 3).await;
        let fetched = db.sales().get_by_id(&created.sale.id).await.unwrap().unwrap();

        assert_eq!(fetched.products.len(), 1);
        assert_eq!(fetched.products[0].line.quantity, 3);
        assert_eq!(fetched.products[0].product.id, product_id);
        assert_eq!(fetched.products[0].product.name, "Headset Kraken");
        assert_eq!(fetched.customer.name, "Ellie Williams");
    }

    #[tokio::test]
    async fn test_create_with_dangling_product_fails_whole_transaction() {
        let db = test_db().await;
        let customer_id = seed_customer(&db).await;

        let err = db
            .sales()
            .create(NewSale {
                name: "Broken sale".to_string(),
                description: "dangling product".to_string(),
                customer_id,
                sale_date: Utc::now(),
                products: vec![NewSaleLine {
                    product_id: "no-such-product".to_string(),
                    quantity: 1,
                }],
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        // The header insert must have rolled back with the line.
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_update_missing_sale_is_not_found() {
        let db = test_db().await;

        let err = db
            .sales()
            .update("missing", SaleUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_touches_only_customer_and_date() {
        let db = test_db().await;
        let product_id = seed_product(&db, "Headset Kraken").await;
        let created = seed_sale(&db, "October sale", &product_id, 2).await;

        let other_customer = db
            .customers()
            .create(NewCustomer {
                name: "Joel Miller".to_string(),
                cpf_or_cnpj: "111.222.333-44".to_string(),
                email: "joel@example.com".to_string(),
                phone: "(84) 9 0000-0000".to_string(),
            })
            .await
            .unwrap();

        let updated = db
            .sales()
            .update(
                &created.sale.id,
                SaleUpdate {
                    customer_id: Some(other_customer.id.clone()),
                    sale_date: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.customer.id, other_customer.id);
        assert_eq!(updated.sale.name, "October sale");
        assert_eq!(updated.products.len(), 1);
    }

    #[tokio::test]
    async fn test_soft_deleted_sale_still_passes_update_check_by_default() {
        let db = test_db().await;
        let product_id = seed_product(&db, "Headset Kraken").await;
        let created = seed_sale(&db, "October sale", &product_id, 1).await;

        db.sales().delete(&created.sale.id).await.unwrap();

        // Legacy quirk: the existence check ignores deleted_at.
        let updated = db
            .sales()
            .update(&created.sale.id, SaleUpdate::default())
            .await
            .unwrap();
        assert!(updated.sale.deleted_at.is_some());
    }

    #[tokio::test]
    async fn test_soft_delete_hides_sale_from_reads() {
        let db = test_db().await;
        let product_id = seed_product(&db, "Headset Kraken").await;
        let created = seed_sale(&db, "October sale", &product_id, 1).await;

        let deleted = db.sales().delete(&created.sale.id).await.unwrap();
        assert!(deleted.sale.deleted_at.is_some());
        // The delete response still carries the nested view.
        assert_eq!(deleted.products.len(), 1);

        assert!(db.sales().get_by_id(&created.sale.id).await.unwrap().is_none());
        assert!(db.sales().list().await.unwrap().is_empty());
        assert!(db.sales().search("October").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_by_name_substring() {
        let db = test_db().await;
        let product_id = seed_product(&db, "Headset Kraken").await;
        seed_sale(&db, "October sale", &product_id, 1).await;

        assert_eq!(db.sales().search("ctober").await.unwrap().len(), 1);
        assert_eq!(db.sales().search("December").await.unwrap().len(), 0);
        assert_eq!(db.sales().search("").await.unwrap().len(), 1);
    }
}

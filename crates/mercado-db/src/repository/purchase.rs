//! # Purchase Repository
//!
//! Database operations for purchases and their line items, including the
//! one real business rule in the system: a sale line item can be
//! purchased **at most once** across live purchases.
//!
//! ## How the invariant is enforced
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 create() — single transaction                       │
//! │                                                                     │
//! │  BEGIN                                                              │
//! │    │                                                                │
//! │    ├── conflict query: requested sale_product_ids already           │
//! │    │   referenced by a line of a live purchase?                     │
//! │    │        │                                                       │
//! │    │        ├── yes ──► ROLLBACK, Conflict error naming the         │
//! │    │        │           first conflicting product and its sale      │
//! │    │        ▼                                                       │
//! │    ├── INSERT purchase header                                       │
//! │    ├── INSERT one line per sale_product_id                          │
//! │    ▼                                                                │
//! │  COMMIT                                                             │
//! │                                                                     │
//! │  Backstop: partial unique index on                                  │
//! │  purchase_sale_products(sale_product_id) WHERE deleted_at IS NULL   │
//! │  (soft-deleting a purchase stamps its lines, releasing the items)   │
//! │                                                                     │
//! │  Two concurrent create() calls serialize on the SQLite write        │
//! │  lock; the loser fails in the check or on the index.                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use mercado_core::{
    Product, Purchase, PurchaseLineView, PurchaseSaleProduct, PurchaseView, Sale, SaleProduct,
    Supplier,
};

/// Fields for a new purchase: the supplier and the sale line items being
/// restocked.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub name: String,
    pub description: String,
    pub supplier_id: String,
    pub sale_product_ids: Vec<String>,
}

const PURCHASE_COLUMNS: &str =
    "id, name, description, supplier_id, created_at, updated_at, deleted_at";

/// First conflicting line found by the pre-insert check.
#[derive(sqlx::FromRow)]
struct ConflictRow {
    product_name: String,
    sale_id: String,
}

/// Flat row for a purchase line joined with its sale line item, product,
/// and parent sale.
#[derive(sqlx::FromRow)]
struct PurchaseLineRow {
    id: String,
    purchase_id: String,
    sale_product_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    sp_sale_id: String,
    sp_product_id: String,
    sp_quantity: i64,
    sp_created_at: DateTime<Utc>,
    sp_updated_at: DateTime<Utc>,
    sp_deleted_at: Option<DateTime<Utc>>,
    p_name: String,
    p_description: String,
    p_price_cents: i64,
    p_brand: String,
    p_created_at: DateTime<Utc>,
    p_updated_at: DateTime<Utc>,
    p_deleted_at: Option<DateTime<Utc>>,
    s_name: String,
    s_description: String,
    s_customer_id: String,
    s_sale_date: DateTime<Utc>,
    s_created_at: DateTime<Utc>,
    s_updated_at: DateTime<Utc>,
    s_deleted_at: Option<DateTime<Utc>>,
}

impl PurchaseLineRow {
    /// Builds the view; `embed_sale` matches the legacy wire format,
    /// which carries the parent sale on list/search reads only.
    fn into_view(self, embed_sale: bool) -> PurchaseLineView {
        let sale = embed_sale.then(|| Sale {
            id: self.sp_sale_id.clone(),
            name: self.s_name,
            description: self.s_description,
            customer_id: self.s_customer_id,
            sale_date: self.s_sale_date,
            created_at: self.s_created_at,
            updated_at: self.s_updated_at,
            deleted_at: self.s_deleted_at,
        });

        PurchaseLineView {
            line: PurchaseSaleProduct {
                id: self.id,
                purchase_id: self.purchase_id,
                sale_product_id: self.sale_product_id.clone(),
                created_at: self.created_at,
                updated_at: self.updated_at,
                deleted_at: self.deleted_at,
            },
            sale_product: SaleProduct {
                id: self.sale_product_id,
                sale_id: self.sp_sale_id,
                product_id: self.sp_product_id.clone(),
                quantity: self.sp_quantity,
                created_at: self.sp_created_at,
                updated_at: self.sp_updated_at,
                deleted_at: self.sp_deleted_at,
            },
            product: Product {
                id: self.sp_product_id,
                name: self.p_name,
                description: self.p_description,
                price_cents: self.p_price_cents,
                brand: self.p_brand,
                created_at: self.p_created_at,
                updated_at: self.p_updated_at,
                deleted_at: self.p_deleted_at,
            },
            sale,
        }
    }
}

/// Repository for purchase database operations.
///
/// Purchases have no update path: create and soft-delete only.
#[derive(Debug, Clone)]
pub struct PurchaseRepository {
    pool: SqlitePool,
}

impl PurchaseRepository {
    /// Creates a new PurchaseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseRepository { pool }
    }

    /// Lists live purchases with supplier, line items, and parent sales.
    pub async fn list(&self) -> DbResult<Vec<PurchaseView>> {
        let purchases = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases \
             WHERE deleted_at IS NULL ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        let mut views = Vec::with_capacity(purchases.len());
        for purchase in purchases {
            views.push(self.load_view(purchase, true).await?);
        }
        Ok(views)
    }

    /// Gets a live purchase by ID with supplier and line items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PurchaseView>> {
        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases \
             WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match purchase {
            Some(purchase) => Ok(Some(self.load_view(purchase, false).await?)),
            None => Ok(None),
        }
    }

    /// Searches live purchases by name substring.
    pub async fn search(&self, query: &str) -> DbResult<Vec<PurchaseView>> {
        debug!(query = %query, "Searching purchases");

        let pattern = format!("%{}%", query);
        let purchases = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases \
             WHERE name LIKE ?1 AND deleted_at IS NULL ORDER BY created_at"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        let mut views = Vec::with_capacity(purchases.len());
        for purchase in purchases {
            views.push(self.load_view(purchase, true).await?);
        }
        Ok(views)
    }

    /// Creates a purchase for a set of sale line items.
    ///
    /// The conflict check and the inserts run in one transaction; see the
    /// module docs for the full enforcement picture.
    ///
    /// ## Errors
    /// * `DbError::AlreadyPurchased` - one of the requested sale line
    ///   items is already covered by a live purchase (fail-fast on the
    ///   first conflict found)
    /// * `DbError::ForeignKeyViolation` - unknown supplier_id or
    ///   sale_product_id
    pub async fn create(&self, input: NewPurchase) -> DbResult<PurchaseView> {
        let now = Utc::now();
        let purchase = Purchase {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            supplier_id: input.supplier_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        debug!(
            id = %purchase.id,
            lines = input.sale_product_ids.len(),
            "Inserting purchase"
        );

        let mut tx = self.pool.begin().await?;

        if !input.sale_product_ids.is_empty() {
            let placeholders = input
                .sale_product_ids
                .iter()
                .map(|_| "?")
                .collect::<Vec<_>>()
                .join(", ");
            let conflict_sql = format!(
                "SELECT p.name AS product_name, sp.sale_id \
                 FROM purchase_sale_products psp \
                 INNER JOIN purchases pu ON pu.id = psp.purchase_id \
                 INNER JOIN sale_products sp ON sp.id = psp.sale_product_id \
                 INNER JOIN products p ON p.id = sp.product_id \
                 WHERE pu.deleted_at IS NULL \
                   AND psp.deleted_at IS NULL \
                   AND psp.sale_product_id IN ({placeholders}) \
                 LIMIT 1"
            );

            let mut conflict_query = sqlx::query_as::<_, ConflictRow>(&conflict_sql);
            for sale_product_id in &input.sale_product_ids {
                conflict_query = conflict_query.bind(sale_product_id);
            }

            if let Some(conflict) = conflict_query.fetch_optional(&mut *tx).await? {
                return Err(DbError::AlreadyPurchased {
                    product_name: conflict.product_name,
                    sale_id: conflict.sale_id,
                });
            }
        }

        sqlx::query(
            "INSERT INTO purchases (id, name, description, supplier_id, \
             created_at, updated_at, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&purchase.id)
        .bind(&purchase.name)
        .bind(&purchase.description)
        .bind(&purchase.supplier_id)
        .bind(purchase.created_at)
        .bind(purchase.updated_at)
        .bind(purchase.deleted_at)
        .execute(&mut *tx)
        .await?;

        for sale_product_id in &input.sale_product_ids {
            sqlx::query(
                "INSERT INTO purchase_sale_products (id, purchase_id, sale_product_id, \
                 created_at, updated_at, deleted_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&purchase.id)
            .bind(sale_product_id)
            .bind(now)
            .bind(now)
            .bind(Option::<DateTime<Utc>>::None)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.load_view(purchase, false).await
    }

    /// Soft-deletes a purchase and its line rows, returning the view.
    ///
    /// Stamping the lines keeps the partial unique index accurate: the
    /// referenced sale line items become purchasable again.
    pub async fn delete(&self, id: &str) -> DbResult<PurchaseView> {
        debug!(id = %id, "Soft-deleting purchase");

        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let result =
            sqlx::query("UPDATE purchases SET deleted_at = ?2, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(now)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Purchase", id));
        }

        sqlx::query(
            "UPDATE purchase_sale_products SET deleted_at = ?2, updated_at = ?2 \
             WHERE purchase_id = ?1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let purchase = sqlx::query_as::<_, Purchase>(&format!(
            "SELECT {PURCHASE_COLUMNS} FROM purchases WHERE id = ?1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        self.load_view(purchase, false).await
    }

    /// Loads the nested view for a purchase header row.
    ///
    /// Line rows are loaded regardless of their deleted_at stamp so that
    /// the delete response still shows what the purchase contained.
    async fn load_view(&self, purchase: Purchase, embed_sale: bool) -> DbResult<PurchaseView> {
        let supplier = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, email, phone, cnpj, address, created_at, updated_at, deleted_at \
             FROM suppliers WHERE id = ?1",
        )
        .bind(&purchase.supplier_id)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, PurchaseLineRow>(
            "SELECT psp.id, psp.purchase_id, psp.sale_product_id, \
                    psp.created_at, psp.updated_at, psp.deleted_at, \
                    sp.sale_id AS sp_sale_id, sp.product_id AS sp_product_id, \
                    sp.quantity AS sp_quantity, sp.created_at AS sp_created_at, \
                    sp.updated_at AS sp_updated_at, sp.deleted_at AS sp_deleted_at, \
                    p.name AS p_name, p.description AS p_description, \
                    p.price_cents AS p_price_cents, p.brand AS p_brand, \
                    p.created_at AS p_created_at, p.updated_at AS p_updated_at, \
                    p.deleted_at AS p_deleted_at, \
                    s.name AS s_name, s.description AS s_description, \
                    s.customer_id AS s_customer_id, s.sale_date AS s_sale_date, \
                    s.created_at AS s_created_at, s.updated_at AS s_updated_at, \
                    s.deleted_at AS s_deleted_at \
             FROM purchase_sale_products psp \
             INNER JOIN sale_products sp ON sp.id = psp.sale_product_id \
             INNER JOIN products p ON p.id = sp.product_id \
             INNER JOIN sales s ON s.id = sp.sale_id \
             WHERE psp.purchase_id = ?1 \
             ORDER BY psp.created_at",
        )
        .bind(&purchase.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(PurchaseView {
            purchase,
            supplier,
            lines: rows
                .into_iter()
                .map(|row| row.into_view(embed_sale))
                .collect(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Supplier Repository
//!
//! Database operations for suppliers. Follows the same soft-delete CRUD
//! pattern as customers, without identity uniqueness checks.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use mercado_core::Supplier;

/// Fields for a new supplier.
#[derive(Debug, Clone)]
pub struct NewSupplier {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cnpj: String,
    pub address: String,
}

/// Partial update for a supplier. `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct SupplierPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub cnpj: Option<String>,
    pub address: Option<String>,
}

const SUPPLIER_COLUMNS: &str =
    "id, name, email, phone, cnpj, address, created_at, updated_at, deleted_at";

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Lists live suppliers.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers \
             WHERE deleted_at IS NULL ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    /// Gets a live supplier by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers \
             WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Searches live suppliers by name substring.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Supplier>> {
        debug!(query = %query, "Searching suppliers");

        let pattern = format!("%{}%", query);
        let suppliers = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers \
             WHERE name LIKE ?1 AND deleted_at IS NULL ORDER BY created_at"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }

    /// Inserts a new supplier.
    pub async fn create(&self, input: NewSupplier) -> DbResult<Supplier> {
        let now = Utc::now();
        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            cnpj: input.cnpj,
            address: input.address,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        debug!(id = %supplier.id, name = %supplier.name, "Inserting supplier");

        sqlx::query(
            "INSERT INTO suppliers (id, name, email, phone, cnpj, address, \
             created_at, updated_at, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.email)
        .bind(&supplier.phone)
        .bind(&supplier.cnpj)
        .bind(&supplier.address)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .bind(supplier.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Applies a partial update to a supplier.
    ///
    /// No pre-query existence check; a missing id surfaces as NotFound
    /// from the zero-rows-affected result.
    pub async fn update(&self, id: &str, patch: SupplierPatch) -> DbResult<Supplier> {
        debug!(id = %id, "Updating supplier");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE suppliers SET \
                name = COALESCE(?2, name), \
                email = COALESCE(?3, email), \
                phone = COALESCE(?4, phone), \
                cnpj = COALESCE(?5, cnpj), \
                address = COALESCE(?6, address), \
                updated_at = ?7 \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.email)
        .bind(patch.phone)
        .bind(patch.cnpj)
        .bind(patch.address)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        self.fetch_any(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// Soft-deletes a supplier and returns the stamped row.
    pub async fn delete(&self, id: &str) -> DbResult<Supplier> {
        debug!(id = %id, "Soft-deleting supplier");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE suppliers SET deleted_at = ?2, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        self.fetch_any(id)
            .await?
            .ok_or_else(|| DbError::not_found("Supplier", id))
    }

    /// Fetches a supplier row regardless of soft-delete state.
    async fn fetch_any(&self, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(&format!(
            "SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn supplier_inc() -> NewSupplier {
        NewSupplier {
            name: "Supplier Inc.".to_string(),
            email: "contact@supplier.com".to_string(),
            phone: "+5511999999999".to_string(),
            cnpj: "12.345.678/0001-99".to_string(),
            address: "123 Supplier St, Sao Paulo, SP".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_list_search() {
        let db = test_db().await;
        let repo = db.suppliers();

        repo.create(supplier_inc()).await.unwrap();

        assert_eq!(repo.list().await.unwrap().len(), 1);
        assert_eq!(repo.search("Supplier").await.unwrap().len(), 1);
        assert_eq!(repo.search("Nobody").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found() {
        let db = test_db().await;
        let repo = db.suppliers();

        let err = repo
            .update("missing", SupplierPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_supplier() {
        let db = test_db().await;
        let repo = db.suppliers();

        let created = repo.create(supplier_inc()).await.unwrap();
        let deleted = repo.delete(&created.id).await.unwrap();

        assert!(deleted.deleted_at.is_some());
        assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());
    }
}

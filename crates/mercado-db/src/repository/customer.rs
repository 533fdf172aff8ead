//! # Customer Repository
//!
//! Database operations for customers.
//!
//! ## Identity Uniqueness
//! `cpf_or_cnpj` and `email` must be unique among live customers at
//! creation time. The check is two sequential existence queries before
//! the insert, scoped to `deleted_at IS NULL`, so a soft-deleted
//! customer's identity can be registered again.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use mercado_core::Customer;

/// Fields for a new customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub cpf_or_cnpj: String,
    pub email: String,
    pub phone: String,
}

/// Partial update for a customer. `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub cpf_or_cnpj: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

const CUSTOMER_COLUMNS: &str =
    "id, name, cpf_or_cnpj, email, phone, created_at, updated_at, deleted_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists live customers.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE deleted_at IS NULL ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Gets a live customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Searches live customers by name substring.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Customer>> {
        debug!(query = %query, "Searching customers");

        let pattern = format!("%{}%", query);
        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers \
             WHERE name LIKE ?1 AND deleted_at IS NULL ORDER BY created_at"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Inserts a new customer after checking identity uniqueness.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - cpf_or_cnpj or email already used
    ///   by a live customer (checked in that order, fail-fast)
    pub async fn create(&self, input: NewCustomer) -> DbResult<Customer> {
        debug!(cpf_or_cnpj = %input.cpf_or_cnpj, "Inserting customer");

        let by_tax_id: Option<String> = sqlx::query_scalar(
            "SELECT id FROM customers WHERE cpf_or_cnpj = ?1 AND deleted_at IS NULL LIMIT 1",
        )
        .bind(&input.cpf_or_cnpj)
        .fetch_optional(&self.pool)
        .await?;

        if by_tax_id.is_some() {
            return Err(DbError::duplicate("cpfOrCnpj", &input.cpf_or_cnpj));
        }

        let by_email: Option<String> = sqlx::query_scalar(
            "SELECT id FROM customers WHERE email = ?1 AND deleted_at IS NULL LIMIT 1",
        )
        .bind(&input.email)
        .fetch_optional(&self.pool)
        .await?;

        if by_email.is_some() {
            return Err(DbError::duplicate("email", &input.email));
        }

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            cpf_or_cnpj: input.cpf_or_cnpj,
            email: input.email,
            phone: input.phone,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        sqlx::query(
            "INSERT INTO customers (id, name, cpf_or_cnpj, email, phone, \
             created_at, updated_at, deleted_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.cpf_or_cnpj)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .bind(customer.deleted_at)
        .execute(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Applies a partial update to a customer.
    pub async fn update(&self, id: &str, patch: CustomerPatch) -> DbResult<Customer> {
        debug!(id = %id, "Updating customer");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE customers SET \
                name = COALESCE(?2, name), \
                cpf_or_cnpj = COALESCE(?3, cpf_or_cnpj), \
                email = COALESCE(?4, email), \
                phone = COALESCE(?5, phone), \
                updated_at = ?6 \
             WHERE id = ?1",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.cpf_or_cnpj)
        .bind(patch.email)
        .bind(patch.phone)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.fetch_any(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Soft-deletes a customer and returns the stamped row.
    pub async fn delete(&self, id: &str) -> DbResult<Customer> {
        debug!(id = %id, "Soft-deleting customer");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE customers SET deleted_at = ?2, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.fetch_any(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Fetches a customer row regardless of soft-delete state.
    async fn fetch_any(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
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

    fn ellie() -> NewCustomer {
        NewCustomer {
            name: "Ellie Williams".to_string(),
            cpf_or_cnpj: "391.945.720-03".to_string(),
            email: "ellie.williams@example.com".to_string(),
            phone: "(84) 9 9110-6666".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_with_unique_identity_succeeds() {
        let db = test_db().await;
        let repo = db.customers();

        let created = repo.create(ellie()).await.unwrap();
        assert_eq!(
            repo.get_by_id(&created.id).await.unwrap().unwrap().email,
            "ellie.williams@example.com"
        );
    }

    #[tokio::test]
    async fn test_duplicate_cpf_or_cnpj_conflicts() {
        let db = test_db().await;
        let repo = db.customers();

        repo.create(ellie()).await.unwrap();

        let mut dup = ellie();
        dup.email = "other@example.com".to_string();
        let err = repo.create(dup).await.unwrap_err();

        assert!(matches!(
            err,
            DbError::UniqueViolation { ref field, .. } if field == "cpfOrCnpj"
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let db = test_db().await;
        let repo = db.customers();

        repo.create(ellie()).await.unwrap();

        let mut dup = ellie();
        dup.cpf_or_cnpj = "12.345.678/0001-99".to_string();
        let err = repo.create(dup).await.unwrap_err();

        assert!(matches!(
            err,
            DbError::UniqueViolation { ref field, .. } if field == "email"
        ));
    }

    #[tokio::test]
    async fn test_soft_deleted_identity_can_be_reused() {
        let db = test_db().await;
        let repo = db.customers();

        let first = repo.create(ellie()).await.unwrap();
        let deleted = repo.delete(&first.id).await.unwrap();
        assert!(deleted.deleted_at.is_some());

        // Same identity is accepted again once the old row is dead.
        let second = repo.create(ellie()).await.unwrap();
        assert_ne!(second.id, first.id);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_reads_but_keeps_row() {
        let db = test_db().await;
        let repo = db.customers();

        let created = repo.create(ellie()).await.unwrap();
        repo.delete(&created.id).await.unwrap();

        assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
        assert!(repo.list().await.unwrap().is_empty());
        assert!(repo.search("Ellie").await.unwrap().is_empty());

        let stamped: Option<String> =
            sqlx::query_scalar("SELECT deleted_at FROM customers WHERE id = ?1")
                .bind(&created.id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert!(stamped.is_some());
    }

    #[tokio::test]
    async fn test_search_empty_query_equals_list() {
        let db = test_db().await;
        let repo = db.customers();

        repo.create(ellie()).await.unwrap();

        let listed = repo.list().await.unwrap();
        let searched = repo.search("").await.unwrap();
        assert_eq!(listed.len(), searched.len());
    }
}

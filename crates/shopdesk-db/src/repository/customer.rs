//! # Customer Repository
//!
//! Database operations for customers. A customer with any sale cannot be
//! deleted.

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;
use crate::pool::WriteLock;
use crate::repository::{generate_id, sort_by_name};
use shopdesk_core::validation::{validate_customer, validate_new_customer};
use shopdesk_core::{CoreError, Customer, Entity, NewCustomer};

const SELECT_CUSTOMER: &str = r#"
    SELECT id, name, email, created_at, updated_at
    FROM customers
"#;

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
    write_lock: WriteLock,
}

impl CustomerRepository {
    pub(crate) fn new(pool: SqlitePool, write_lock: WriteLock) -> Self {
        CustomerRepository { pool, write_lock }
    }

    /// Lists all customers sorted by name (case-insensitive), then id.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        debug!("Listing customers");
        fetch_all(&self.pool).await
    }

    /// Gets a customer by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        find_by_id(&self.pool, id).await
    }

    /// Validates and inserts a new customer with a fresh id.
    pub async fn create(&self, new: &NewCustomer) -> DbResult<Customer> {
        let _guard = self.write_lock.lock().await;
        insert(&self.pool, new).await
    }

    /// Replaces name and email of an existing customer.
    ///
    /// ## Errors
    /// * `Validation` - empty name or malformed email
    /// * `NotFound` - no customer with this id
    pub async fn update(&self, customer: &Customer) -> DbResult<Customer> {
        validate_customer(&customer.name, &customer.email)?;

        let _guard = self.write_lock.lock().await;
        debug!(id = %customer.id, "Updating customer");

        let result = sqlx::query(
            r#"
            UPDATE customers SET
                name = ?2,
                email = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(&customer.id)
        .bind(customer.name.trim())
        .bind(customer.email.trim())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(Entity::Customer, &customer.id).into());
        }

        find_by_id(&self.pool, &customer.id)
            .await?
            .ok_or_else(|| CoreError::not_found(Entity::Customer, &customer.id).into())
    }

    /// Deletes a customer with no sales.
    ///
    /// ## Errors
    /// * `NotFound` - no customer with this id
    /// * `Conflict` - the customer has at least one sale
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let _guard = self.write_lock.lock().await;
        debug!(id = %id, "Deleting customer");

        let mut tx = self.pool.begin().await?;

        if find_by_id(&mut *tx, id).await?.is_none() {
            return Err(CoreError::not_found(Entity::Customer, id).into());
        }

        let sales: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE customer_id = ?1")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        if sales > 0 {
            return Err(CoreError::conflict(
                Entity::Customer,
                id,
                format!("referenced by {} sale(s)", sales),
            )
            .into());
        }

        sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(id = %id, "Customer deleted");
        Ok(())
    }

    /// Counts total customers (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Validates and inserts a customer through any executor.
pub(crate) async fn insert<'e, E>(executor: E, new: &NewCustomer) -> DbResult<Customer>
where
    E: Executor<'e, Database = Sqlite>,
{
    validate_new_customer(new)?;

    let now = Utc::now();
    let customer = Customer {
        id: generate_id(),
        name: new.name.trim().to_string(),
        email: new.email.trim().to_string(),
        created_at: now,
        updated_at: now,
    };

    debug!(id = %customer.id, name = %customer.name, "Inserting customer");

    sqlx::query(
        r#"
        INSERT INTO customers (id, name, email, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(&customer.id)
    .bind(&customer.name)
    .bind(&customer.email)
    .bind(customer.created_at)
    .bind(customer.updated_at)
    .execute(executor)
    .await?;

    Ok(customer)
}

pub(crate) async fn find_by_id<'e, E>(executor: E, id: &str) -> DbResult<Option<Customer>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let customer = sqlx::query_as::<_, Customer>(&format!("{SELECT_CUSTOMER} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(customer)
}

pub(crate) async fn fetch_all<'e, E>(executor: E) -> DbResult<Vec<Customer>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut customers = sqlx::query_as::<_, Customer>(SELECT_CUSTOMER)
        .fetch_all(executor)
        .await?;

    sort_by_name(&mut customers, |c| (c.name.as_str(), c.id.as_str()));
    Ok(customers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use shopdesk_core::ErrorKind;

    fn new_customer(name: &str, email: &str) -> NewCustomer {
        NewCustomer {
            name: name.to_string(),
            email: email.to_string(),
        }
    }

    #[tokio::test]
    async fn test_customer_crud() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();

        let created = repo
            .create(&new_customer("Inova Corp", "compras@inovacorp.com"))
            .await
            .unwrap();
        assert_eq!(repo.count().await.unwrap(), 1);

        let mut changed = created.clone();
        changed.email = "financeiro@inovacorp.com".to_string();
        let updated = repo.update(&changed).await.unwrap();
        assert_eq!(updated.email, "financeiro@inovacorp.com");
        assert_eq!(updated.created_at, created.created_at);

        repo.delete(&created.id).await.unwrap();
        assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_invalid_email_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .customers()
            .create(&new_customer("Nobody", "not-an-email"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Validation));
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.customers();
        repo.create(&new_customer("mercado Digital", "m@d.com")).await.unwrap();
        repo.create(&new_customer("Inova Corp", "i@c.com")).await.unwrap();

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Inova Corp", "mercado Digital"]);
    }
}

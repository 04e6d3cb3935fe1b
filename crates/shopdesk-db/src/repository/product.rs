//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Stock Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create/update    → stock set explicitly, must be >= 0                  │
//! │  create_sale      → stock - quantity, only WHERE stock >= quantity      │
//! │  delete           → rejected while any sale item references the product │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::DbResult;
use crate::pool::WriteLock;
use crate::repository::{generate_id, sort_by_name};
use shopdesk_core::validation::{validate_new_product, validate_product};
use shopdesk_core::{CoreError, Entity, NewProduct, Product};

const SELECT_PRODUCT: &str = r#"
    SELECT id, name, price_cents, stock, created_at, updated_at
    FROM products
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    write_lock: WriteLock,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub(crate) fn new(pool: SqlitePool, write_lock: WriteLock) -> Self {
        ProductRepository { pool, write_lock }
    }

    /// Lists all products sorted by name (case-insensitive), then id.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        debug!("Listing products");
        fetch_all(&self.pool).await
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        find_by_id(&self.pool, id).await
    }

    /// Validates and inserts a new product with a fresh id.
    ///
    /// ## Errors
    /// * `Validation` - empty name, price <= 0, or negative stock
    pub async fn create(&self, new: &NewProduct) -> DbResult<Product> {
        let _guard = self.write_lock.lock().await;
        insert(&self.pool, new).await
    }

    /// Replaces name, price and stock of an existing product.
    ///
    /// `created_at` is kept; `updated_at` is bumped.
    ///
    /// ## Errors
    /// * `Validation` - invalid fields
    /// * `NotFound` - no product with this id
    pub async fn update(&self, product: &Product) -> DbResult<Product> {
        validate_product(&product.name, product.price_cents, product.stock)?;

        let _guard = self.write_lock.lock().await;
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                price_cents = ?3,
                stock = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(product.name.trim())
        .bind(product.price_cents)
        .bind(product.stock)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found(Entity::Product, &product.id).into());
        }

        find_by_id(&self.pool, &product.id)
            .await?
            .ok_or_else(|| CoreError::not_found(Entity::Product, &product.id).into())
    }

    /// Deletes a product that no sale references.
    ///
    /// ## Errors
    /// * `NotFound` - no product with this id
    /// * `Conflict` - at least one sale item references the product
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let _guard = self.write_lock.lock().await;
        debug!(id = %id, "Deleting product");

        let mut tx = self.pool.begin().await?;

        if find_by_id(&mut *tx, id).await?.is_none() {
            return Err(CoreError::not_found(Entity::Product, id).into());
        }

        let references: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sale_items WHERE product_id = ?1")
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;

        if references > 0 {
            return Err(CoreError::conflict(
                Entity::Product,
                id,
                format!("referenced by {} sale item(s)", references),
            )
            .into());
        }

        sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(id = %id, "Product deleted");
        Ok(())
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Validates and inserts a product through any executor (pool or open transaction).
pub(crate) async fn insert<'e, E>(executor: E, new: &NewProduct) -> DbResult<Product>
where
    E: Executor<'e, Database = Sqlite>,
{
    validate_new_product(new)?;

    let now = Utc::now();
    let product = Product {
        id: generate_id(),
        name: new.name.trim().to_string(),
        price_cents: new.price_cents,
        stock: new.stock,
        created_at: now,
        updated_at: now,
    };

    debug!(id = %product.id, name = %product.name, "Inserting product");

    sqlx::query(
        r#"
        INSERT INTO products (id, name, price_cents, stock, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(&product.id)
    .bind(&product.name)
    .bind(product.price_cents)
    .bind(product.stock)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(executor)
    .await?;

    Ok(product)
}

/// Loads one product through any executor (pool or open transaction).
pub(crate) async fn find_by_id<'e, E>(executor: E, id: &str) -> DbResult<Option<Product>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let product = sqlx::query_as::<_, Product>(&format!("{SELECT_PRODUCT} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(executor)
        .await?;

    Ok(product)
}

/// Loads every product in display order.
pub(crate) async fn fetch_all<'e, E>(executor: E) -> DbResult<Vec<Product>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let mut products = sqlx::query_as::<_, Product>(SELECT_PRODUCT)
        .fetch_all(executor)
        .await?;

    sort_by_name(&mut products, |p| (p.name.as_str(), p.id.as_str()));
    Ok(products)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use shopdesk_core::ErrorKind;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_product(name: &str, price_cents: i64, stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price_cents,
            stock,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = setup().await;
        let repo = db.products();

        let created = repo
            .create(&new_product("Monitor Gamer 4K", 280000, 30))
            .await
            .unwrap();
        let loaded = repo.get_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(loaded.name, "Monitor Gamer 4K");
        assert_eq!(loaded.price_cents, 280000);
        assert_eq!(loaded.stock, 30);
        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let db = setup().await;
        let repo = db.products();

        for bad in [
            new_product("", 100, 1),
            new_product("Zero", 0, 1),
            new_product("Negative", 100, -1),
        ] {
            let err = repo.create(&bad).await.unwrap_err();
            assert_eq!(err.kind(), Some(ErrorKind::Validation));
        }
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_sorted_case_insensitive() {
        let db = setup().await;
        let repo = db.products();

        for name in ["webcam", "Monitor", "Teclado", "mouse"] {
            repo.create(&new_product(name, 100, 1)).await.unwrap();
        }

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["Monitor", "mouse", "Teclado", "webcam"]);
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let db = setup().await;
        let repo = db.products();

        let created = repo.create(&new_product("Mouse", 19990, 150)).await.unwrap();
        let mut changed = created.clone();
        changed.price_cents = 17990;
        changed.stock = 140;

        let updated = repo.update(&changed).await.unwrap();
        assert_eq!(updated.price_cents, 17990);
        assert_eq!(updated.stock, 140);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let db = setup().await;
        let repo = db.products();

        let ghost = Product {
            id: "ghost".to_string(),
            name: "Ghost".to_string(),
            price_cents: 100,
            stock: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(
            repo.update(&ghost).await.unwrap_err().kind(),
            Some(ErrorKind::NotFound)
        );
        assert_eq!(
            repo.delete("ghost").await.unwrap_err().kind(),
            Some(ErrorKind::NotFound)
        );
    }

    #[tokio::test]
    async fn test_delete_unreferenced() {
        let db = setup().await;
        let repo = db.products();

        let created = repo.create(&new_product("Webcam", 35000, 80)).await.unwrap();
        repo.delete(&created.id).await.unwrap();

        assert!(repo.get_by_id(&created.id).await.unwrap().is_none());
    }
}

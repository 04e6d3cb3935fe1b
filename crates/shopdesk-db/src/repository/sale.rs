//! # Sale Repository
//!
//! Transactional sale creation and sale reads.
//!
//! ## Sale Commit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       create_sale(request)                              │
//! │                                                                         │
//! │  0. validate request shape              (no lock, no I/O)              │
//! │  1. take write lock                                                     │
//! │  2. BEGIN                                                               │
//! │  3. load customer + requested products  (inside the transaction)        │
//! │  4. plan_sale()                         NotFound / InsufficientStock    │
//! │  5. UPDATE products SET stock = stock - q WHERE stock >= q              │
//! │  6. INSERT sales, INSERT sale_items (line_no keeps request order)       │
//! │  7. COMMIT                                                              │
//! │                                                                         │
//! │  Any early return drops the transaction → ROLLBACK. Nothing is written  │
//! │  unless every step succeeds.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Sales are immutable once committed: there is no update or delete.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::DbResult;
use crate::pool::WriteLock;
use crate::repository::{customer, generate_id, product};
use shopdesk_core::sale::plan_sale;
use shopdesk_core::validation::validate_new_sale;
use shopdesk_core::{CoreError, NewSale, Sale, SaleItem};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    write_lock: WriteLock,
}

impl SaleRepository {
    pub(crate) fn new(pool: SqlitePool, write_lock: WriteLock) -> Self {
        SaleRepository { pool, write_lock }
    }

    /// Creates a sale atomically: validates, decrements stock, persists.
    ///
    /// ## Errors
    /// * `Validation` - empty items, bad quantity, missing ids
    /// * `NotFound` - unknown customer or product
    /// * `InsufficientStock` - summed quantity for a product exceeds its stock
    ///
    /// On any error the store is unchanged.
    pub async fn create_sale(&self, request: &NewSale) -> DbResult<Sale> {
        self.create_sale_at(request, Utc::now()).await
    }

    /// Same as [`create_sale`](Self::create_sale) with an explicit sale date.
    ///
    /// Used to load historical sales (demo data, imports).
    pub async fn create_sale_at(&self, request: &NewSale, date: DateTime<Utc>) -> DbResult<Sale> {
        validate_new_sale(request)?;

        let _guard = self.write_lock.lock().await;
        debug!(
            customer_id = %request.customer_id,
            lines = request.items.len(),
            "Creating sale"
        );

        let mut tx = self.pool.begin().await?;
        let sale = commit_sale(&mut *tx, request, date).await?;
        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            customer_id = %sale.customer_id,
            total_cents = sale.total_cents,
            "Sale committed"
        );

        Ok(sale)
    }

    /// Gets a sale with its items.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let mut tx = self.pool.begin().await?;

        let sale: Option<Sale> = sqlx::query_as(
            "SELECT id, customer_id, date, total_cents FROM sales WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut sale) = sale else {
            return Ok(None);
        };
        sale.items = get_items(&mut tx, id).await?;

        tx.commit().await?;
        Ok(Some(sale))
    }

    /// Lists all sales with items, most recent first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        debug!("Listing sales");
        let mut tx = self.pool.begin().await?;
        let sales = fetch_all(&mut tx).await?;
        tx.commit().await?;
        Ok(sales)
    }

    /// Counts total sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Loads one sale's items in request order.
async fn get_items(conn: &mut SqliteConnection, sale_id: &str) -> DbResult<Vec<SaleItem>> {
    let items = sqlx::query_as::<_, SaleItem>(
        r#"
        SELECT sale_id, product_id, quantity, price_cents
        FROM sale_items
        WHERE sale_id = ?1
        ORDER BY line_no
        "#,
    )
    .bind(sale_id)
    .fetch_all(conn)
    .await?;

    Ok(items)
}

/// Loads, plans, and writes one sale on an open transaction.
///
/// Leaves committing to the caller. On error the caller must drop the
/// transaction so the stock updates are rolled back.
pub(crate) async fn commit_sale(
    conn: &mut SqliteConnection,
    request: &NewSale,
    date: DateTime<Utc>,
) -> DbResult<Sale> {
    let customer = customer::find_by_id(&mut *conn, &request.customer_id).await?;

    let mut products = HashMap::new();
    for product_id in request.product_ids() {
        if let Some(found) = product::find_by_id(&mut *conn, product_id).await? {
            products.insert(found.id.clone(), found);
        }
    }

    let plan = match plan_sale(
        generate_id(),
        date,
        request,
        customer.as_ref(),
        &products,
    ) {
        Ok(plan) => plan,
        Err(err) => {
            warn!(customer_id = %request.customer_id, error = %err, "Sale rejected");
            return Err(err.into());
        }
    };

    let now = Utc::now();
    for decrement in &plan.decrements {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?1, updated_at = ?2
            WHERE id = ?3 AND stock >= ?1
            "#,
        )
        .bind(decrement.quantity)
        .bind(now)
        .bind(&decrement.product_id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            let product = products
                .get(&decrement.product_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| decrement.product_id.clone());
            warn!(product_id = %decrement.product_id, "Stock changed during sale");
            return Err(CoreError::InsufficientStock {
                product,
                available: decrement.available,
                requested: decrement.quantity,
            }
            .into());
        }
    }

    let sale = plan.sale;

    sqlx::query(
        r#"
        INSERT INTO sales (id, customer_id, date, total_cents)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.customer_id)
    .bind(sale.date)
    .bind(sale.total_cents)
    .execute(&mut *conn)
    .await?;

    for (line_no, item) in sale.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO sale_items (sale_id, line_no, product_id, quantity, price_cents)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&item.sale_id)
        .bind(line_no as i64)
        .bind(&item.product_id)
        .bind(item.quantity)
        .bind(item.price_cents)
        .execute(&mut *conn)
        .await?;
    }

    Ok(sale)
}

/// Loads every sale with its items, most recent first then by id.
///
/// Run inside a transaction so sales and items come from one snapshot.
pub(crate) async fn fetch_all(conn: &mut SqliteConnection) -> DbResult<Vec<Sale>> {
    let mut sales = sqlx::query_as::<_, Sale>(
        "SELECT id, customer_id, date, total_cents FROM sales",
    )
    .fetch_all(&mut *conn)
    .await?;

    let items = sqlx::query_as::<_, SaleItem>(
        r#"
        SELECT sale_id, product_id, quantity, price_cents
        FROM sale_items
        ORDER BY sale_id, line_no
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut by_sale: HashMap<String, Vec<SaleItem>> = HashMap::new();
    for item in items {
        by_sale.entry(item.sale_id.clone()).or_default().push(item);
    }
    for sale in &mut sales {
        sale.items = by_sale.remove(&sale.id).unwrap_or_default();
    }

    sales.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
    Ok(sales)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use shopdesk_core::{ErrorKind, NewCustomer, NewProduct, SaleLine};

    async fn setup() -> (Database, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = db
            .customers()
            .create(&NewCustomer {
                name: "Tech Solutions Ltda".to_string(),
                email: "contato@techsolutions.com".to_string(),
            })
            .await
            .unwrap();
        let product = db
            .products()
            .create(&NewProduct {
                name: "Widget".to_string(),
                price_cents: 10000,
                stock: 5,
            })
            .await
            .unwrap();
        (db, customer.id, product.id)
    }

    #[tokio::test]
    async fn test_create_sale_decrements_stock() {
        let (db, customer_id, product_id) = setup().await;

        let sale = db
            .sales()
            .create_sale(&NewSale::new(&customer_id, vec![SaleLine::new(&product_id, 3)]))
            .await
            .unwrap();

        assert_eq!(sale.total_cents, 30000);
        assert_eq!(sale.items[0].price_cents, 10000);

        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 2);

        let loaded = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(loaded.total_cents, 30000);
        assert_eq!(loaded.items, sale.items);
        assert_eq!(loaded.date, sale.date);
    }

    #[tokio::test]
    async fn test_rejected_sale_writes_nothing() {
        let (db, customer_id, product_id) = setup().await;

        let err = db
            .sales()
            .create_sale(&NewSale::new(&customer_id, vec![SaleLine::new(&product_id, 10)]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Some(ErrorKind::InsufficientStock));
        assert!(err.to_string().contains("Widget"));
        assert_eq!(db.sales().count().await.unwrap(), 0);
        let product = db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 5);
    }

    #[tokio::test]
    async fn test_get_missing_sale() {
        let (db, _, _) = setup().await;
        assert!(db.sales().get_by_id("nope").await.unwrap().is_none());
    }
}

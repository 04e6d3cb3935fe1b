//! # Demo Data
//!
//! A small catalog, three customers and four historical sales (May to July
//! 2024), used by the `seed` binary and `backoffice seed`.
//!
//! Sales go through the same commit path as
//! [`SaleRepository::create_sale_at`](crate::SaleRepository::create_sale_at),
//! so totals come from the item snapshots and stock is decremented like any
//! other sale. The whole seed is one transaction: it lands completely or not
//! at all.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::DbResult;
use crate::pool::Database;
use crate::repository::{customer, product, sale};
use shopdesk_core::{CoreError, NewCustomer, NewProduct, NewSale, SaleLine, ValidationError};

/// `(name, price_cents, stock)`
const PRODUCTS: &[(&str, i64, i64)] = &[
    ("Laptop Pro X2", 750000, 50),
    ("Monitor Gamer 4K", 280000, 30),
    ("Teclado Mecânico RGB", 45050, 100),
    ("Mouse Sem Fio Ergonômico", 19990, 150),
    ("Webcam Full HD", 35000, 80),
];

/// `(name, email)`
const CUSTOMERS: &[(&str, &str)] = &[
    ("Tech Solutions Ltda", "contato@techsolutions.com"),
    ("Inova Corp", "compras@inovacorp.com"),
    ("Mercado Digital ABC", "financeiro@mercadoabc.com"),
];

/// `(customer index, (year, month, day, hour, minute), [(product index, quantity)])`
type DemoSale = (usize, (i32, u32, u32, u32, u32), &'static [(usize, i64)]);

const SALES: &[DemoSale] = &[
    (0, (2024, 5, 10, 10, 0), &[(0, 1), (1, 1)]),
    (1, (2024, 5, 15, 14, 30), &[(2, 1), (3, 1)]),
    (0, (2024, 6, 2, 11, 20), &[(1, 1)]),
    (2, (2024, 7, 20, 9, 5), &[(3, 1)]),
];

/// What [`seed_demo_data`] wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SeedSummary {
    pub products: usize,
    pub customers: usize,
    pub sales: usize,
}

impl SeedSummary {
    pub fn is_empty(&self) -> bool {
        self.products == 0 && self.customers == 0 && self.sales == 0
    }
}

/// Loads the demo data into an empty store.
///
/// Does nothing and returns an empty summary when the store already holds
/// any product, customer, or sale.
pub async fn seed_demo_data(db: &Database) -> DbResult<SeedSummary> {
    seed(db, PRODUCTS, CUSTOMERS, SALES).await
}

async fn seed(
    db: &Database,
    products: &[(&str, i64, i64)],
    customers: &[(&str, &str)],
    sales: &[DemoSale],
) -> DbResult<SeedSummary> {
    let dates = sales
        .iter()
        .map(|(_, when, _)| sale_date(*when))
        .collect::<DbResult<Vec<_>>>()?;

    let write_lock = db.write_lock();
    let _guard = write_lock.lock().await;
    let mut tx = db.pool().begin().await?;

    let existing: i64 = sqlx::query_scalar(
        r#"
        SELECT (SELECT COUNT(*) FROM products)
             + (SELECT COUNT(*) FROM customers)
             + (SELECT COUNT(*) FROM sales)
        "#,
    )
    .fetch_one(&mut *tx)
    .await?;
    if existing > 0 {
        info!(existing, "Store is not empty, skipping demo seed");
        return Ok(SeedSummary::default());
    }

    let mut product_ids = Vec::with_capacity(products.len());
    for (name, price_cents, stock) in products {
        let created = product::insert(
            &mut *tx,
            &NewProduct {
                name: name.to_string(),
                price_cents: *price_cents,
                stock: *stock,
            },
        )
        .await?;
        product_ids.push(created.id);
    }

    let mut customer_ids = Vec::with_capacity(customers.len());
    for (name, email) in customers {
        let created = customer::insert(
            &mut *tx,
            &NewCustomer {
                name: name.to_string(),
                email: email.to_string(),
            },
        )
        .await?;
        customer_ids.push(created.id);
    }

    for ((customer, _, lines), date) in sales.iter().zip(dates) {
        let request = NewSale::new(
            &customer_ids[*customer],
            lines
                .iter()
                .map(|(product, quantity)| SaleLine::new(&product_ids[*product], *quantity))
                .collect(),
        );
        if let Err(err) = sale::commit_sale(&mut *tx, &request, date).await {
            warn!(error = %err, "Demo sale rejected, rolling back seed");
            return Err(err);
        }
    }

    tx.commit().await?;

    let summary = SeedSummary {
        products: products.len(),
        customers: customers.len(),
        sales: sales.len(),
    };
    info!(?summary, "Demo data seeded");
    Ok(summary)
}

/// Resolves a `(year, month, day, hour, minute)` tuple to a UTC timestamp.
fn sale_date(when: (i32, u32, u32, u32, u32)) -> DbResult<DateTime<Utc>> {
    let (year, month, day, hour, minute) = when;
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .ok_or_else(|| {
            CoreError::from(ValidationError::InvalidFormat {
                field: "date".to_string(),
                reason: format!(
                    "{year}-{month:02}-{day:02} {hour:02}:{minute:02} is not a valid time"
                ),
            })
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbConfig;

    #[tokio::test]
    async fn test_seed_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let first = seed_demo_data(&db).await.unwrap();
        assert_eq!(first.sales, 4);
        assert_eq!(db.sales().count().await.unwrap(), 4);

        let second = seed_demo_data(&db).await.unwrap();
        assert!(second.is_empty());
        assert_eq!(db.products().count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_skips_store_with_only_customers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.customers()
            .create(&NewCustomer {
                name: "Walk-in".to_string(),
                email: "walkin@example.com".to_string(),
            })
            .await
            .unwrap();

        let summary = seed_demo_data(&db).await.unwrap();
        assert!(summary.is_empty());
        assert_eq!(db.products().count().await.unwrap(), 0);
        assert_eq!(db.customers().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_sale_rolls_back_whole_seed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        const SCARCE: &[(&str, i64, i64)] = &[("Widget", 100, 1)];
        const BUYER: &[(&str, &str)] = &[("Alice", "alice@example.com")];
        const OVERSOLD: &[DemoSale] = &[
            (0, (2024, 5, 1, 9, 0), &[(0, 1)]),
            (0, (2024, 5, 2, 9, 0), &[(0, 1)]),
        ];

        let err = seed(&db, SCARCE, BUYER, OVERSOLD).await.unwrap_err();
        assert_eq!(err.kind(), Some(shopdesk_core::ErrorKind::InsufficientStock));

        assert_eq!(db.products().count().await.unwrap(), 0);
        assert_eq!(db.customers().count().await.unwrap(), 0);
        assert_eq!(db.sales().count().await.unwrap(), 0);

        // A clean retry still works.
        assert_eq!(seed_demo_data(&db).await.unwrap().sales, 4);
    }

    #[tokio::test]
    async fn test_invalid_date_is_rejected_before_writing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        const BAD_DATE: &[DemoSale] = &[(0, (2024, 2, 30, 10, 0), &[(0, 1)])];

        let err = seed(&db, PRODUCTS, CUSTOMERS, BAD_DATE).await.unwrap_err();
        assert_eq!(err.kind(), Some(shopdesk_core::ErrorKind::Validation));
        assert!(err.to_string().contains("2024-02-30"));
        assert_eq!(db.products().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_seeded_analytics() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_demo_data(&db).await.unwrap();

        let stats = db.analytics().dashboard_stats().await.unwrap();
        // 10300.00 + 650.40 + 2800.00 + 199.90
        assert_eq!(stats.total_revenue_cents, 1395030);
        assert_eq!(stats.unique_customers, 3);

        let months: Vec<String> = db
            .analytics()
            .sales_by_month()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.month)
            .collect();
        assert_eq!(months, vec!["May", "Jun", "Jul"]);

        let recent = db.analytics().recent_sales(5).await.unwrap();
        assert_eq!(recent[0].customer.name, "Mercado Digital ABC");
    }
}

//! # Analytics Repository
//!
//! Reads a consistent [`Snapshot`] and hands it to the pure aggregations in
//! `shopdesk_core::analytics`.
//!
//! ```text
//! BEGIN (read) ──► products, customers, sales, sale_items ──► COMMIT
//!                                   │
//!                                   ▼
//!                    dashboard_stats / sales_by_month / top_* / details
//! ```
//!
//! No write lock is taken. WAL gives the read transaction a stable view, so a
//! sale committed mid-read is either fully visible or not at all.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::{customer, product, sale};
use shopdesk_core::analytics::{
    self, CustomerActivity, DashboardStats, MonthlyRevenue, ProductSales, SaleDetails, Snapshot,
};
use shopdesk_core::report::{self, SalesReportInput};

/// Read-only analytics over the whole store.
#[derive(Debug, Clone)]
pub struct AnalyticsRepository {
    pool: SqlitePool,
}

impl AnalyticsRepository {
    pub(crate) fn new(pool: SqlitePool) -> Self {
        AnalyticsRepository { pool }
    }

    /// Reads products, customers and sales (with items) in one transaction.
    pub async fn snapshot(&self) -> DbResult<Snapshot> {
        let mut tx = self.pool.begin().await?;

        let products = product::fetch_all(&mut *tx).await?;
        let customers = customer::fetch_all(&mut *tx).await?;
        let sales = sale::fetch_all(&mut tx).await?;

        tx.commit().await?;

        debug!(
            products = products.len(),
            customers = customers.len(),
            sales = sales.len(),
            "Snapshot loaded"
        );

        Ok(Snapshot {
            products,
            customers,
            sales,
        })
    }

    pub async fn dashboard_stats(&self) -> DbResult<DashboardStats> {
        Ok(analytics::dashboard_stats(&self.snapshot().await?))
    }

    pub async fn sales_by_month(&self) -> DbResult<Vec<MonthlyRevenue>> {
        Ok(analytics::sales_by_month(&self.snapshot().await?))
    }

    pub async fn top_products_sold(&self, limit: usize) -> DbResult<Vec<ProductSales>> {
        Ok(analytics::top_products_sold(&self.snapshot().await?, limit))
    }

    pub async fn top_active_customers(&self, limit: usize) -> DbResult<Vec<CustomerActivity>> {
        Ok(analytics::top_active_customers(
            &self.snapshot().await?,
            limit,
        ))
    }

    pub async fn sales_with_details(&self) -> DbResult<Vec<SaleDetails>> {
        Ok(analytics::sales_with_details(&self.snapshot().await?))
    }

    /// The `limit` most recent sales with details.
    pub async fn recent_sales(&self, limit: usize) -> DbResult<Vec<SaleDetails>> {
        Ok(analytics::recent_sales(&self.snapshot().await?, limit))
    }

    /// Aggregates for the monthly report. Unknown month labels are rejected.
    pub async fn sales_report_input(&self, month: &str) -> DbResult<SalesReportInput> {
        let snapshot = self.snapshot().await?;
        Ok(report::sales_report_input(&snapshot, month)?)
    }
}

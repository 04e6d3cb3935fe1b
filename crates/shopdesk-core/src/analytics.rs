//! # Analytics
//!
//! Read-only aggregations for the dashboard and the sales report.
//!
//! Every function takes a [`Snapshot`] (products, customers and sales read in
//! one transaction by shopdesk-db) and recomputes its result from scratch.
//! Nothing is cached, so two calls over the same snapshot return equal values.
//!
//! ## Dashboard Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  dashboard_stats()                                                      │
//! │  ┌───────────────┬───────────────┬───────────────┬───────────────┐     │
//! │  │ Revenue       │ Sales         │ Products      │ Customers     │     │
//! │  │ Σ sale.total  │ count(sales)  │ count(prods)  │ distinct buyer│     │
//! │  └───────────────┴───────────────┴───────────────┴───────────────┘     │
//! │                                                                         │
//! │  sales_by_month()            top_products_sold(5)  top_active_customers(5)
//! │  Jan ███████                 Laptop Pro X2   3     Tech Solutions  2    │
//! │  May ████████████            Monitor 4K      2     Inova Corp      1    │
//! │                                                                         │
//! │  recent_sales(5) = first 5 of sales_with_details()                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering Rules
//! - Months are bucketed by the UTC calendar month of `Sale.date` and listed
//!   in calendar order. Years are not distinguished. Empty months are omitted.
//! - Top lists sort by count descending, then by id ascending.
//! - Sale details sort by date descending, then by id ascending.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Customer, EntityRef, Product, Sale};

/// Label used when a sale references a customer that no longer resolves.
pub const UNKNOWN_CUSTOMER: &str = "Unknown customer";

/// Label used when a sale item references a product that no longer resolves.
pub const UNKNOWN_PRODUCT: &str = "Unknown product";

/// Three-letter month labels in calendar order.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// =============================================================================
// Snapshot
// =============================================================================

/// A consistent view of the whole store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    /// Sales with their items loaded.
    pub sales: Vec<Sale>,
}

impl Snapshot {
    fn product_names(&self) -> HashMap<&str, &str> {
        self.products
            .iter()
            .map(|p| (p.id.as_str(), p.name.as_str()))
            .collect()
    }

    fn customer_names(&self) -> HashMap<&str, &str> {
        self.customers
            .iter()
            .map(|c| (c.id.as_str(), c.name.as_str()))
            .collect()
    }
}

// =============================================================================
// Result Types
// =============================================================================

/// Headline numbers for the dashboard cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_revenue_cents: i64,
    pub total_sales: i64,
    pub active_products: i64,
    pub unique_customers: i64,
}

impl DashboardStats {
    pub fn total_revenue(&self) -> Money {
        Money::from_cents(self.total_revenue_cents)
    }
}

/// Revenue for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenue {
    pub month: String,
    pub total_cents: i64,
}

/// Units sold for one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
}

/// Number of sales for one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerActivity {
    pub customer_id: String,
    pub customer_name: String,
    pub purchase_count: i64,
}

/// A sale item joined with its product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemDetails {
    pub product: EntityRef,
    pub quantity: i64,
    pub price_cents: i64,
}

/// A sale joined with its customer and products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetails {
    pub id: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub total_cents: i64,
    pub customer: EntityRef,
    pub items: Vec<SaleItemDetails>,
}

// =============================================================================
// Month Helpers
// =============================================================================

/// Returns the UTC month label for a timestamp.
pub fn month_label(date: &DateTime<Utc>) -> &'static str {
    MONTH_LABELS[date.month0() as usize]
}

/// Looks up a month label, case-insensitively. Returns the canonical label.
pub fn parse_month_label(label: &str) -> Option<&'static str> {
    let label = label.trim();
    MONTH_LABELS
        .iter()
        .copied()
        .find(|m| m.eq_ignore_ascii_case(label))
}

// =============================================================================
// Aggregations
// =============================================================================

/// Computes the dashboard headline numbers.
pub fn dashboard_stats(snapshot: &Snapshot) -> DashboardStats {
    let total_revenue: Money = snapshot.sales.iter().map(Sale::total).sum();
    let buyers: BTreeSet<&str> = snapshot
        .sales
        .iter()
        .map(|s| s.customer_id.as_str())
        .collect();

    DashboardStats {
        total_revenue_cents: total_revenue.cents(),
        total_sales: snapshot.sales.len() as i64,
        active_products: snapshot.products.len() as i64,
        unique_customers: buyers.len() as i64,
    }
}

/// Sums sale totals per UTC calendar month.
///
/// ```rust
/// use shopdesk_core::analytics::{sales_by_month, Snapshot};
///
/// assert!(sales_by_month(&Snapshot::default()).is_empty());
/// ```
pub fn sales_by_month(snapshot: &Snapshot) -> Vec<MonthlyRevenue> {
    let mut totals = [Money::zero(); 12];
    for sale in &snapshot.sales {
        totals[sale.date.month0() as usize] += sale.total();
    }

    MONTH_LABELS
        .iter()
        .zip(totals)
        .filter(|(_, total)| !total.is_zero())
        .map(|(label, total)| MonthlyRevenue {
            month: (*label).to_string(),
            total_cents: total.cents(),
        })
        .collect()
}

/// Ranks products by total units sold.
pub fn top_products_sold(snapshot: &Snapshot, limit: usize) -> Vec<ProductSales> {
    let mut quantities: BTreeMap<&str, i64> = BTreeMap::new();
    for item in snapshot.sales.iter().flat_map(|s| &s.items) {
        *quantities.entry(item.product_id.as_str()).or_default() += item.quantity;
    }

    let names = snapshot.product_names();
    rank(quantities, limit)
        .into_iter()
        .map(|(id, quantity)| ProductSales {
            product_id: id.to_string(),
            product_name: names.get(id).copied().unwrap_or(UNKNOWN_PRODUCT).to_string(),
            quantity,
        })
        .collect()
}

/// Ranks customers by number of sales.
pub fn top_active_customers(snapshot: &Snapshot, limit: usize) -> Vec<CustomerActivity> {
    let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
    for sale in &snapshot.sales {
        *counts.entry(sale.customer_id.as_str()).or_default() += 1;
    }

    let names = snapshot.customer_names();
    rank(counts, limit)
        .into_iter()
        .map(|(id, purchase_count)| CustomerActivity {
            customer_id: id.to_string(),
            customer_name: names.get(id).copied().unwrap_or(UNKNOWN_CUSTOMER).to_string(),
            purchase_count,
        })
        .collect()
}

/// Sorts `(id, count)` pairs by count descending, id ascending, and truncates.
fn rank(counts: BTreeMap<&str, i64>, limit: usize) -> Vec<(&str, i64)> {
    let mut ranked: Vec<(&str, i64)> = counts.into_iter().collect();
    // BTreeMap iteration is id-ascending and sort_by is stable.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(limit);
    ranked
}

/// Joins every sale with its customer and products, most recent first.
pub fn sales_with_details(snapshot: &Snapshot) -> Vec<SaleDetails> {
    let products = snapshot.product_names();
    let customers = snapshot.customer_names();

    let mut sales: Vec<&Sale> = snapshot.sales.iter().collect();
    sales.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));

    sales
        .into_iter()
        .map(|sale| SaleDetails {
            id: sale.id.clone(),
            date: sale.date,
            total_cents: sale.total_cents,
            customer: entity_ref(&customers, &sale.customer_id, UNKNOWN_CUSTOMER),
            items: sale
                .items
                .iter()
                .map(|item| SaleItemDetails {
                    product: entity_ref(&products, &item.product_id, UNKNOWN_PRODUCT),
                    quantity: item.quantity,
                    price_cents: item.price_cents,
                })
                .collect(),
        })
        .collect()
}

/// The `limit` most recent sales with details.
pub fn recent_sales(snapshot: &Snapshot, limit: usize) -> Vec<SaleDetails> {
    let mut details = sales_with_details(snapshot);
    details.truncate(limit);
    details
}

fn entity_ref(names: &HashMap<&str, &str>, id: &str, fallback: &str) -> EntityRef {
    EntityRef {
        id: id.to_string(),
        name: names.get(id).copied().unwrap_or(fallback).to_string(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleItem;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            price_cents: 100,
            stock: 10,
            created_at: at(2024, 1, 1),
            updated_at: at(2024, 1, 1),
        }
    }

    fn customer(id: &str, name: &str) -> Customer {
        Customer {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{id}@example.com"),
            created_at: at(2024, 1, 1),
            updated_at: at(2024, 1, 1),
        }
    }

    fn sale(id: &str, customer_id: &str, date: DateTime<Utc>, lines: &[(&str, i64)]) -> Sale {
        let items: Vec<SaleItem> = lines
            .iter()
            .map(|(product_id, quantity)| SaleItem {
                sale_id: id.to_string(),
                product_id: product_id.to_string(),
                quantity: *quantity,
                price_cents: 100,
            })
            .collect();
        let total_cents = items.iter().map(|i| i.line_total().cents()).sum();
        Sale {
            id: id.to_string(),
            customer_id: customer_id.to_string(),
            date,
            total_cents,
            items,
        }
    }

    fn snapshot() -> Snapshot {
        Snapshot {
            products: vec![product("p1", "Widget"), product("p2", "Gadget"), product("p3", "Gizmo")],
            customers: vec![customer("c1", "Alice"), customer("c2", "Bob")],
            sales: vec![
                sale("s1", "c1", at(2024, 1, 10), &[("p1", 5)]),
                sale("s2", "c2", at(2024, 3, 2), &[("p2", 3), ("p3", 4)]),
                sale("s3", "c1", at(2024, 3, 20), &[("p3", 5)]),
            ],
        }
    }

    #[test]
    fn test_dashboard_stats() {
        let stats = dashboard_stats(&snapshot());
        assert_eq!(stats.total_revenue_cents, 1700);
        assert_eq!(stats.total_sales, 3);
        assert_eq!(stats.active_products, 3);
        assert_eq!(stats.unique_customers, 2);

        let empty = dashboard_stats(&Snapshot::default());
        assert_eq!(empty.total_revenue_cents, 0);
        assert_eq!(empty.unique_customers, 0);
    }

    #[test]
    fn test_sales_by_month_merges_and_skips_empty() {
        let mut snap = Snapshot::default();
        snap.sales = vec![
            Sale { total_cents: 15000, ..sale("a", "c1", at(2024, 1, 3), &[]) },
            Sale { total_cents: 5000, ..sale("b", "c1", at(2024, 1, 28), &[]) },
        ];

        assert_eq!(
            sales_by_month(&snap),
            vec![MonthlyRevenue { month: "Jan".to_string(), total_cents: 20000 }]
        );
    }

    #[test]
    fn test_sales_by_month_calendar_order() {
        let months: Vec<String> = sales_by_month(&snapshot()).into_iter().map(|m| m.month).collect();
        assert_eq!(months, vec!["Jan", "Mar"]);
    }

    #[test]
    fn test_month_bucket_is_utc() {
        let late = Utc.with_ymd_and_hms(2024, 1, 31, 23, 30, 0).unwrap();
        assert_eq!(month_label(&late), "Jan");
        assert_eq!(parse_month_label("may"), Some("May"));
        assert_eq!(parse_month_label("Maio"), None);
    }

    #[test]
    fn test_top_products_sold() {
        let top = top_products_sold(&snapshot(), 2);
        assert_eq!(top.len(), 2);
        assert_eq!((top[0].product_name.as_str(), top[0].quantity), ("Gizmo", 9));
        assert_eq!((top[1].product_name.as_str(), top[1].quantity), ("Widget", 5));

        assert!(top_products_sold(&snapshot(), 0).is_empty());
    }

    #[test]
    fn test_top_ties_break_by_id() {
        let mut snap = snapshot();
        snap.sales = vec![
            sale("s1", "c2", at(2024, 2, 1), &[("p2", 1)]),
            sale("s2", "c1", at(2024, 2, 2), &[("p1", 1)]),
        ];

        let products = top_products_sold(&snap, 5);
        assert_eq!(products[0].product_id, "p1");
        assert_eq!(products[1].product_id, "p2");

        let customers = top_active_customers(&snap, 5);
        assert_eq!(customers[0].customer_id, "c1");
        assert_eq!(customers[1].customer_id, "c2");
    }

    #[test]
    fn test_top_active_customers() {
        let top = top_active_customers(&snapshot(), 5);
        assert_eq!(top[0].customer_name, "Alice");
        assert_eq!(top[0].purchase_count, 2);
        assert_eq!(top[1].customer_name, "Bob");
    }

    #[test]
    fn test_unresolved_references_use_fallback_labels() {
        let mut snap = snapshot();
        snap.products.retain(|p| p.id != "p3");
        snap.customers.retain(|c| c.id != "c2");

        let top = top_products_sold(&snap, 1);
        assert_eq!(top[0].product_name, UNKNOWN_PRODUCT);
        assert_eq!(top[0].product_id, "p3");

        let details = sales_with_details(&snap);
        let s2 = details.iter().find(|d| d.id == "s2").unwrap();
        assert_eq!(s2.customer.name, UNKNOWN_CUSTOMER);
        assert_eq!(s2.customer.id, "c2");
        assert_eq!(s2.items[1].product.name, UNKNOWN_PRODUCT);
    }

    #[test]
    fn test_sales_with_details_most_recent_first() {
        let ids: Vec<String> = sales_with_details(&snapshot()).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["s3", "s2", "s1"]);

        let recent = recent_sales(&snapshot(), 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, "s3");
    }

    #[test]
    fn test_reads_are_idempotent() {
        let snap = snapshot();
        assert_eq!(dashboard_stats(&snap), dashboard_stats(&snap));
        assert_eq!(sales_with_details(&snap), sales_with_details(&snap));
    }
}

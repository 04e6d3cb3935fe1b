//! # Repository Module
//!
//! Database repository implementations for ShopDesk.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  Caller                                                                 │
//! │       │  db.products().create(&new_product)                             │
//! │       │  db.sales().create_sale(&request)                               │
//! │       │  db.analytics().top_products_sold(5)                            │
//! │       ▼                                                                 │
//! │  ProductRepository    CustomerRepository    SaleRepository              │
//! │  ├── list             ├── list              ├── create_sale             │
//! │  ├── get_by_id        ├── get_by_id         ├── get_by_id               │
//! │  ├── create           ├── create            ├── list                    │
//! │  ├── update           ├── update            └── count                   │
//! │  ├── delete           ├── delete                                        │
//! │  └── count            └── count             AnalyticsRepository         │
//! │                                             └── snapshot + aggregates   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations take the store's write lock; reads do not.
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product CRUD
//! - [`customer::CustomerRepository`] - Customer CRUD
//! - [`sale::SaleRepository`] - Transactional sale creation and sale reads
//! - [`analytics::AnalyticsRepository`] - Dashboard aggregates over a snapshot

pub mod analytics;
pub mod customer;
pub mod product;
pub mod sale;

use uuid::Uuid;

/// Generates a fresh entity id (UUID v4).
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Sorts by name, case-insensitive, then by id.
pub(crate) fn sort_by_name<T>(items: &mut [T], key: impl Fn(&T) -> (&str, &str)) {
    items.sort_by_cached_key(|item| {
        let (name, id) = key(item);
        (name.to_lowercase(), id.to_string())
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_is_unique() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_sort_by_name_ignores_case() {
        let mut names: Vec<(String, String)> = [("b", "2"), ("B", "1"), ("a", "3")]
            .iter()
            .map(|(n, i)| (n.to_string(), i.to_string()))
            .collect();
        sort_by_name(&mut names, |item| (item.0.as_str(), item.1.as_str()));
        let ids: Vec<&str> = names.iter().map(|(_, id)| id.as_str()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
    }
}

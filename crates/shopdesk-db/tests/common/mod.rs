#![allow(dead_code)]

use shopdesk_core::{Customer, NewCustomer, NewProduct, Product};
use shopdesk_db::{Database, DbConfig};

pub async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

pub async fn product(db: &Database, name: &str, price_cents: i64, stock: i64) -> Product {
    db.products()
        .create(&NewProduct {
            name: name.to_string(),
            price_cents,
            stock,
        })
        .await
        .expect("create product")
}

pub async fn customer(db: &Database, name: &str) -> Customer {
    let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
    db.customers()
        .create(&NewCustomer {
            name: name.to_string(),
            email,
        })
        .await
        .expect("create customer")
}

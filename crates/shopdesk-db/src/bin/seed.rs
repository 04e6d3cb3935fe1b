//! # Seed Data Loader
//!
//! Populates a database with the ShopDesk demo data.
//!
//! ## Usage
//! ```bash
//! # Seed ./shopdesk_dev.db (default)
//! cargo run -p shopdesk-db --bin seed
//!
//! # Specify database path
//! cargo run -p shopdesk-db --bin seed -- --db ./data/shopdesk.db
//! ```
//!
//! ## Demo Data
//! - 5 products (laptop, monitor, keyboard, mouse, webcam)
//! - 3 customers
//! - 4 sales between May and July 2024
//!
//! Seeding is skipped when the database already has any products,
//! customers, or sales.

use std::env;

use shopdesk_core::Money;
use shopdesk_db::{seed_demo_data, Database, DbConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./shopdesk_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("ShopDesk Seed Data Loader");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./shopdesk_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 ShopDesk Seed Data Loader");
    println!("============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let summary = seed_demo_data(&db).await?;
    if summary.is_empty() {
        println!("⚠ Database is not empty");
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        db.close().await;
        return Ok(());
    }

    println!(
        "✓ Inserted {} products, {} customers, {} sales",
        summary.products, summary.customers, summary.sales
    );

    let stats = db.analytics().dashboard_stats().await?;
    println!();
    println!("Dashboard:");
    println!("  Revenue:   {}", Money::from_cents(stats.total_revenue_cents));
    println!("  Sales:     {}", stats.total_sales);
    println!("  Customers: {}", stats.unique_customers);

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

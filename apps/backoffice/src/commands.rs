//! Subcommand definitions and handlers.
//!
//! Every handler writes to a caller-supplied writer so the same code path
//! serves stdout and the tests. `--json` switches to pretty JSON of the
//! underlying core types.

use std::io::Write;

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use shopdesk_core::analytics::{
    CustomerActivity, DashboardStats, MonthlyRevenue, ProductSales, SaleDetails,
};
use shopdesk_core::report::SalesReportInput;
use shopdesk_core::{
    CoreError, Customer, Entity, Money, NewCustomer, NewProduct, NewSale, Product, Sale, SaleLine,
};
use shopdesk_db::{seed_demo_data, Database};
use tracing::debug;

// =============================================================================
// Commands
// =============================================================================

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the demo catalogue, customers and sales into an empty store
    Seed,
    /// Show dashboard totals
    Stats,
    /// List products by name
    Products,
    /// List customers by name
    Customers,
    /// List sales with customer and product names, most recent first
    Sales(LimitArgs),
    /// Products ranked by units sold
    TopProducts(LimitArgs),
    /// Customers ranked by number of sales
    TopCustomers(LimitArgs),
    /// Revenue per calendar month
    ByMonth,
    /// Aggregates for a monthly sales report
    ReportInput {
        /// Month label, Jan..Dec
        month: String,
    },
    /// Record a sale
    Sell(SellArgs),
    /// Create a product
    AddProduct(AddProductArgs),
    /// Change name, price or stock of a product
    UpdateProduct(UpdateProductArgs),
    /// Delete a product that no sale references
    DeleteProduct {
        id: String,
    },
    /// Create a customer
    AddCustomer(AddCustomerArgs),
    /// Change name or email of a customer
    UpdateCustomer(UpdateCustomerArgs),
    /// Delete a customer with no sales
    DeleteCustomer {
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct LimitArgs {
    #[arg(long, help = "Maximum number of rows to show")]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct SellArgs {
    #[arg(long, help = "Customer id")]
    pub customer: String,
    #[arg(
        long = "item",
        required = true,
        value_parser = parse_sale_line,
        help = "Line as PRODUCT_ID:QTY, repeatable"
    )]
    pub items: Vec<SaleLine>,
}

#[derive(Debug, Args)]
pub struct AddProductArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, help = "Unit price, e.g. 450.50")]
    pub price: Money,
    #[arg(long, default_value_t = 0)]
    pub stock: i64,
}

#[derive(Debug, Args)]
pub struct UpdateProductArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub price: Option<Money>,
    #[arg(long)]
    pub stock: Option<i64>,
}

#[derive(Debug, Args)]
pub struct AddCustomerArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
}

#[derive(Debug, Args)]
pub struct UpdateCustomerArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

/// Parses `PRODUCT_ID:QTY`.
pub fn parse_sale_line(raw: &str) -> Result<SaleLine, String> {
    let (product_id, quantity) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected PRODUCT_ID:QTY, got '{}'", raw))?;
    if product_id.is_empty() {
        return Err(format!("missing product id in '{}'", raw));
    }
    let quantity = quantity
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("invalid quantity in '{}'", raw))?;
    Ok(SaleLine::new(product_id, quantity))
}

// =============================================================================
// Output Settings
// =============================================================================

/// Presentation settings resolved from flags and config.
#[derive(Debug, Clone)]
pub struct Output {
    pub json: bool,
    pub currency_symbol: String,
    pub default_limit: usize,
}

impl Output {
    fn money(&self, cents: i64) -> String {
        Money::from_cents(cents).format_with(&self.currency_symbol)
    }

    fn limit(&self, args: &LimitArgs) -> usize {
        args.limit.unwrap_or(self.default_limit)
    }
}

fn print_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// JSON acknowledgement for commands that return no entity.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Deleted<'a> {
    entity: Entity,
    id: &'a str,
    deleted: bool,
}

fn print_deleted(out: &mut impl Write, output: &Output, entity: Entity, id: &str) -> Result<()> {
    if output.json {
        return print_json(
            out,
            &Deleted {
                entity,
                id,
                deleted: true,
            },
        );
    }
    writeln!(out, "Deleted {} {}", entity.to_string().to_lowercase(), id)?;
    Ok(())
}

// =============================================================================
// Dispatch
// =============================================================================

pub async fn run(db: &Database, command: Command, output: &Output, out: &mut impl Write) -> Result<()> {
    debug!(?command, "Running command");

    match command {
        Command::Seed => {
            let summary = seed_demo_data(db).await.context("failed to seed demo data")?;
            if output.json {
                print_json(out, &summary)?;
            } else if summary.is_empty() {
                writeln!(out, "Store already has products; nothing seeded")?;
            } else {
                writeln!(
                    out,
                    "Seeded {} products, {} customers, {} sales",
                    summary.products, summary.customers, summary.sales
                )?;
            }
        }
        Command::Stats => {
            let stats = db.analytics().dashboard_stats().await?;
            if output.json {
                print_json(out, &stats)?;
            } else {
                render_stats(out, output, &stats)?;
            }
        }
        Command::Products => {
            let products = db.products().list().await?;
            if output.json {
                print_json(out, &products)?;
            } else {
                for product in &products {
                    render_product(out, output, product)?;
                }
            }
        }
        Command::Customers => {
            let customers = db.customers().list().await?;
            if output.json {
                print_json(out, &customers)?;
            } else {
                for customer in &customers {
                    render_customer(out, customer)?;
                }
            }
        }
        Command::Sales(args) => {
            let details = match args.limit {
                Some(limit) => db.analytics().recent_sales(limit).await?,
                None => db.analytics().sales_with_details().await?,
            };
            if output.json {
                print_json(out, &details)?;
            } else {
                for sale in &details {
                    render_sale_details(out, output, sale)?;
                }
            }
        }
        Command::TopProducts(args) => {
            let top = db.analytics().top_products_sold(output.limit(&args)).await?;
            if output.json {
                print_json(out, &top)?;
            } else {
                render_top_products(out, &top)?;
            }
        }
        Command::TopCustomers(args) => {
            let top = db
                .analytics()
                .top_active_customers(output.limit(&args))
                .await?;
            if output.json {
                print_json(out, &top)?;
            } else {
                render_top_customers(out, &top)?;
            }
        }
        Command::ByMonth => {
            let months = db.analytics().sales_by_month().await?;
            if output.json {
                print_json(out, &months)?;
            } else {
                render_months(out, output, &months)?;
            }
        }
        Command::ReportInput { month } => {
            let input = db
                .analytics()
                .sales_report_input(&month)
                .await
                .with_context(|| format!("failed to build report input for '{}'", month))?;
            if output.json {
                print_json(out, &input)?;
            } else {
                render_report_input(out, output, &input)?;
            }
        }
        Command::Sell(args) => {
            let request = NewSale::new(args.customer, args.items);
            let sale = db
                .sales()
                .create_sale(&request)
                .await
                .context("sale rejected")?;
            if output.json {
                print_json(out, &sale)?;
            } else {
                render_sale(out, output, &sale)?;
            }
        }
        Command::AddProduct(args) => {
            let product = db
                .products()
                .create(&NewProduct {
                    name: args.name,
                    price_cents: args.price.cents(),
                    stock: args.stock,
                })
                .await?;
            emit_product(out, output, &product)?;
        }
        Command::UpdateProduct(args) => {
            let mut product = db
                .products()
                .get_by_id(&args.id)
                .await?
                .ok_or_else(|| anyhow!(CoreError::not_found(Entity::Product, &args.id)))?;
            if let Some(name) = args.name {
                product.name = name;
            }
            if let Some(price) = args.price {
                product.price_cents = price.cents();
            }
            if let Some(stock) = args.stock {
                product.stock = stock;
            }
            let product = db.products().update(&product).await?;
            emit_product(out, output, &product)?;
        }
        Command::DeleteProduct { id } => {
            db.products().delete(&id).await?;
            print_deleted(out, output, Entity::Product, &id)?;
        }
        Command::AddCustomer(args) => {
            let customer = db
                .customers()
                .create(&NewCustomer {
                    name: args.name,
                    email: args.email,
                })
                .await?;
            emit_customer(out, output, &customer)?;
        }
        Command::UpdateCustomer(args) => {
            let mut customer = db
                .customers()
                .get_by_id(&args.id)
                .await?
                .ok_or_else(|| anyhow!(CoreError::not_found(Entity::Customer, &args.id)))?;
            if let Some(name) = args.name {
                customer.name = name;
            }
            if let Some(email) = args.email {
                customer.email = email;
            }
            let customer = db.customers().update(&customer).await?;
            emit_customer(out, output, &customer)?;
        }
        Command::DeleteCustomer { id } => {
            db.customers().delete(&id).await?;
            print_deleted(out, output, Entity::Customer, &id)?;
        }
    }

    Ok(())
}

// =============================================================================
// Text Rendering
// =============================================================================

fn emit_product(out: &mut impl Write, output: &Output, product: &Product) -> Result<()> {
    if output.json {
        print_json(out, product)
    } else {
        render_product(out, output, product)
    }
}

fn emit_customer(out: &mut impl Write, output: &Output, customer: &Customer) -> Result<()> {
    if output.json {
        print_json(out, customer)
    } else {
        render_customer(out, customer)
    }
}

fn render_stats(out: &mut impl Write, output: &Output, stats: &DashboardStats) -> Result<()> {
    writeln!(out, "Revenue:          {}", output.money(stats.total_revenue_cents))?;
    writeln!(out, "Sales:            {}", stats.total_sales)?;
    writeln!(out, "Active products:  {}", stats.active_products)?;
    writeln!(out, "Unique customers: {}", stats.unique_customers)?;
    Ok(())
}

fn render_product(out: &mut impl Write, output: &Output, product: &Product) -> Result<()> {
    writeln!(
        out,
        "- {} • {} • stock {} (id {})",
        product.name,
        output.money(product.price_cents),
        product.stock,
        product.id
    )?;
    Ok(())
}

fn render_customer(out: &mut impl Write, customer: &Customer) -> Result<()> {
    writeln!(out, "- {} <{}> (id {})", customer.name, customer.email, customer.id)?;
    Ok(())
}

fn render_sale(out: &mut impl Write, output: &Output, sale: &Sale) -> Result<()> {
    writeln!(
        out,
        "Sale {} • customer {} • {} • total {}",
        sale.id,
        sale.customer_id,
        sale.date.format("%Y-%m-%d %H:%M"),
        output.money(sale.total_cents)
    )?;
    for item in &sale.items {
        writeln!(
            out,
            "    {} × {} @ {}",
            item.quantity,
            item.product_id,
            output.money(item.price_cents)
        )?;
    }
    Ok(())
}

fn render_sale_details(out: &mut impl Write, output: &Output, sale: &SaleDetails) -> Result<()> {
    writeln!(
        out,
        "- {} • {} • {}",
        sale.date.format("%Y-%m-%d"),
        sale.customer.name,
        output.money(sale.total_cents)
    )?;
    for item in &sale.items {
        writeln!(
            out,
            "    {} × {} @ {}",
            item.quantity,
            item.product.name,
            output.money(item.price_cents)
        )?;
    }
    Ok(())
}

fn render_top_products(out: &mut impl Write, top: &[ProductSales]) -> Result<()> {
    for (rank, entry) in top.iter().enumerate() {
        writeln!(out, "{}. {} • {} sold", rank + 1, entry.product_name, entry.quantity)?;
    }
    Ok(())
}

fn render_top_customers(out: &mut impl Write, top: &[CustomerActivity]) -> Result<()> {
    for (rank, entry) in top.iter().enumerate() {
        writeln!(
            out,
            "{}. {} • {} purchases",
            rank + 1,
            entry.customer_name,
            entry.purchase_count
        )?;
    }
    Ok(())
}

fn render_months(out: &mut impl Write, output: &Output, months: &[MonthlyRevenue]) -> Result<()> {
    for entry in months {
        writeln!(out, "{}  {}", entry.month, output.money(entry.total_cents))?;
    }
    Ok(())
}

fn render_report_input(out: &mut impl Write, output: &Output, input: &SalesReportInput) -> Result<()> {
    match input.month_total_cents {
        Some(cents) => writeln!(out, "{}: {}", input.month, output.money(cents))?,
        None => writeln!(out, "{}: no sales", input.month)?,
    }
    writeln!(out)?;
    writeln!(out, "Revenue by month:")?;
    render_months(out, output, &input.sales_by_month)?;
    writeln!(out)?;
    writeln!(out, "Top products:")?;
    render_top_products(out, &input.top_products)?;
    writeln!(out)?;
    writeln!(out, "Top customers:")?;
    render_top_customers(out, &input.top_customers)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use shopdesk_core::ErrorKind;
    use shopdesk_db::{DbConfig, DbError};

    fn text() -> Output {
        Output {
            json: false,
            currency_symbol: "R$ ".to_string(),
            default_limit: 5,
        }
    }

    async fn seeded() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_demo_data(&db).await.unwrap();
        db
    }

    async fn capture(db: &Database, command: Command, output: &Output) -> Result<String> {
        let mut buf = Vec::new();
        run(db, command, output, &mut buf).await?;
        Ok(String::from_utf8(buf).unwrap())
    }

    #[test]
    fn test_parse_sale_line() {
        assert_eq!(parse_sale_line("p1:3").unwrap(), SaleLine::new("p1", 3));
        assert_eq!(parse_sale_line("a:b:2").unwrap(), SaleLine::new("a:b", 2));
        assert!(parse_sale_line("p1").is_err());
        assert!(parse_sale_line(":3").is_err());
        assert!(parse_sale_line("p1:many").is_err());
    }

    #[tokio::test]
    async fn test_stats_text_uses_currency_symbol() {
        let db = seeded().await;
        let rendered = capture(&db, Command::Stats, &text()).await.unwrap();
        assert!(rendered.contains("Revenue:          R$ 13950.30"));
        assert!(rendered.contains("Sales:            4"));
    }

    #[tokio::test]
    async fn test_json_output_is_parseable() {
        let db = seeded().await;
        let output = Output {
            json: true,
            ..text()
        };
        let rendered = capture(&db, Command::ByMonth, &output).await.unwrap();
        let months: Vec<MonthlyRevenue> = serde_json::from_str(&rendered).unwrap();
        let labels: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
        assert_eq!(labels, vec!["May", "Jun", "Jul"]);
    }

    #[tokio::test]
    async fn test_sell_then_stock_drops() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let output = text();

        let mut buf = Vec::new();
        run(
            &db,
            Command::AddProduct(AddProductArgs {
                name: "Widget".to_string(),
                price: "2.50".parse().unwrap(),
                stock: 4,
            }),
            &Output {
                json: true,
                ..text()
            },
            &mut buf,
        )
        .await
        .unwrap();
        let product: Product = serde_json::from_slice(&buf).unwrap();
        assert_eq!(product.price_cents, 250);

        let customer = db
            .customers()
            .create(&NewCustomer {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            })
            .await
            .unwrap();

        let rendered = capture(
            &db,
            Command::Sell(SellArgs {
                customer: customer.id.clone(),
                items: vec![SaleLine::new(&product.id, 3)],
            }),
            &output,
        )
        .await
        .unwrap();
        assert!(rendered.contains("total R$ 7.50"));
        assert_eq!(db.products().get_by_id(&product.id).await.unwrap().unwrap().stock, 1);

        let err = capture(
            &db,
            Command::Sell(SellArgs {
                customer: customer.id,
                items: vec![SaleLine::new(&product.id, 3)],
            }),
            &output,
        )
        .await
        .unwrap_err();
        let db_err = err.downcast_ref::<DbError>().unwrap();
        assert_eq!(db_err.kind(), Some(ErrorKind::InsufficientStock));
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = capture(
            &db,
            Command::UpdateProduct(UpdateProductArgs {
                id: "missing".to_string(),
                name: None,
                price: None,
                stock: Some(3),
            }),
            &text(),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_top_products_respects_limit() {
        let db = seeded().await;
        let rendered = capture(
            &db,
            Command::TopProducts(LimitArgs { limit: Some(2) }),
            &text(),
        )
        .await
        .unwrap();
        assert_eq!(rendered.lines().count(), 2);
        assert!(rendered.starts_with("1. "));
    }

    #[tokio::test]
    async fn test_delete_acknowledges_in_json_and_text() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .create(&NewProduct {
                name: "Widget".to_string(),
                price_cents: 250,
                stock: 1,
            })
            .await
            .unwrap();
        let customer = db
            .customers()
            .create(&NewCustomer {
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
            })
            .await
            .unwrap();

        let json = Output {
            json: true,
            ..text()
        };
        let rendered = capture(&db, Command::DeleteProduct { id: product.id.clone() }, &json)
            .await
            .unwrap();
        let ack: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(ack["entity"], "Product");
        assert_eq!(ack["id"], product.id.as_str());
        assert_eq!(ack["deleted"], true);
        assert_eq!(db.products().count().await.unwrap(), 0);

        let rendered = capture(&db, Command::DeleteCustomer { id: customer.id.clone() }, &text())
            .await
            .unwrap();
        assert_eq!(rendered.trim(), format!("Deleted customer {}", customer.id));
    }
}

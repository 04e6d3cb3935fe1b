//! # ShopDesk Backoffice
//!
//! Command line front end for the store: catalogue and customer
//! maintenance, recording sales, and the dashboard analytics.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          backoffice                                     │
//! │                                                                         │
//! │  Cli (clap) ──► BackofficeConfig ──► Database ──► commands::run         │
//! │                                          │              │               │
//! │                                          ▼              ▼               │
//! │                                   SQLite (WAL)     stdout (text|json)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```bash
//! backoffice seed
//! backoffice stats
//! backoffice --json top-products --limit 3
//! backoffice sell --customer <ID> --item <PRODUCT_ID>:2 --item <PRODUCT_ID>:1
//! ```
//!
//! Logs go to stderr so `--json` output on stdout stays machine readable.

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use shopdesk_db::{seed_demo_data, Database, DbConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, Output};
use crate::config::BackofficeConfig;

#[derive(Parser)]
#[command(name = "backoffice", about = "ShopDesk store backoffice", version)]
struct Cli {
    #[arg(long, global = true, help = "Path to a TOML config file")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "SQLite database file, overrides config")]
    db: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = BackofficeConfig::load(cli.config.clone()).context("failed to load config")?;
    if let Some(path) = cli.db {
        config.database.path = path;
    }

    init_tracing(&config.log.filter);
    info!(path = ?config.database.path, "Opening store");

    if let Some(parent) = config.database.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let db = Database::new(
        DbConfig::new(&config.database.path).max_connections(config.database.max_connections),
    )
    .await
    .with_context(|| format!("failed to open {}", config.database.path.display()))?;

    if config.dashboard.seed_demo_data {
        let summary = seed_demo_data(&db).await.context("failed to seed demo data")?;
        if !summary.is_empty() {
            info!(?summary, "Seeded demo data");
        }
    }

    let output = Output {
        json: cli.json,
        currency_symbol: config.dashboard.currency_symbol.clone(),
        default_limit: config.dashboard.top_limit,
    };

    let mut stdout = std::io::stdout().lock();
    let result = commands::run(&db, cli.command, &output, &mut stdout).await;

    db.close().await;
    result
}

/// Initializes tracing on stderr.
///
/// `RUST_LOG` wins over the configured filter.
fn init_tracing(configured: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

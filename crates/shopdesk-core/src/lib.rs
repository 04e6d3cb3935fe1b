//! # shopdesk-core: Pure Business Logic for ShopDesk
//!
//! This crate holds the ShopDesk back-office rules as pure functions with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        ShopDesk Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              apps/backoffice (operator CLI)                     │   │
//! │  │    stats, products, sales, top-products, report-input, sell     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 shopdesk-db (Entity Store)                      │   │
//! │  │      SQLite, migrations, repositories, sale transaction         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ loaded entities / snapshots            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ shopdesk-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌─────────┐ ┌────────┐  │   │
//! │  │   │ types   │ │ money   │ │validation│ │  sale   │ │analytics│ │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └─────────┘ └────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Sale, SaleItem)
//! - [`money`] - Money type with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`sale`] - Sale planning: stock checks and price snapshots
//! - [`analytics`] - Dashboard aggregations over a snapshot
//! - [`report`] - Monthly sales report input and output
//!
//! ## Example Usage
//!
//! ```rust
//! use shopdesk_core::analytics::{dashboard_stats, Snapshot};
//!
//! let stats = dashboard_stats(&Snapshot::default());
//! assert_eq!(stats.total_sales, 0);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod analytics;
pub mod error;
pub mod money;
pub mod report;
pub mod sale;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use analytics::Snapshot;
pub use error::{CoreError, CoreResult, Entity, ErrorKind, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a product or customer name.
pub const MAX_NAME_LENGTH: usize = 200;

/// Default length of the dashboard's top-N lists and recent sales card.
pub const DEFAULT_TOP_LIMIT: usize = 5;

//! # Sale Planning
//!
//! The pure half of sale creation: given the request and the entities it
//! references, decide whether the sale can happen and what it looks like.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         create_sale                                     │
//! │                                                                         │
//! │  shopdesk-db                          shopdesk-core (THIS MODULE)       │
//! │  ───────────                          ───────────────────────────       │
//! │  lock + BEGIN                                                           │
//! │  load customer, products ──────────►  plan_sale()                       │
//! │                                       ├── validate request shape        │
//! │                                       ├── customer exists?              │
//! │                                       ├── every product exists?         │
//! │                                       ├── Σ quantity ≤ stock?           │
//! │                                       └── snapshot prices, total        │
//! │  decrement stock      ◄──────────────  SalePlan                         │
//! │  insert sale + items                                                    │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is mutated here. If `plan_sale` returns an error, the caller's
//! transaction is dropped without a single write.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult, Entity, ValidationError};
use crate::money::Money;
use crate::types::{Customer, NewSale, Product, Sale, SaleItem};
use crate::validation::validate_new_sale;

/// Stock to take from one product when the sale commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockDecrement {
    pub product_id: String,
    /// Summed quantity across every line for this product.
    pub quantity: i64,
    /// Stock observed when planning. The commit must still see at least `quantity`.
    pub available: i64,
}

/// A validated sale, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalePlan {
    pub sale: Sale,
    /// One entry per distinct product, in first-seen order.
    pub decrements: Vec<StockDecrement>,
}

/// Plans a sale against already-loaded entities.
///
/// `customer` is the lookup result for `request.customer_id`; `products`
/// holds whatever products could be found for the request's product ids.
///
/// ## Errors
/// - `Validation` for an empty request or a bad quantity
/// - `NotFound` for a missing customer or product
/// - `InsufficientStock` when the summed quantity for a product exceeds its stock
pub fn plan_sale(
    sale_id: String,
    date: DateTime<Utc>,
    request: &NewSale,
    customer: Option<&Customer>,
    products: &HashMap<String, Product>,
) -> CoreResult<SalePlan> {
    validate_new_sale(request)?;

    let customer =
        customer.ok_or_else(|| CoreError::not_found(Entity::Customer, &request.customer_id))?;

    // Sum per product so that repeated lines cannot oversell together.
    let mut decrements: Vec<StockDecrement> = Vec::new();
    for line in &request.items {
        let product = products
            .get(&line.product_id)
            .ok_or_else(|| CoreError::not_found(Entity::Product, &line.product_id))?;

        match decrements
            .iter_mut()
            .find(|d| d.product_id == line.product_id)
        {
            Some(existing) => {
                existing.quantity = existing
                    .quantity
                    .checked_add(line.quantity)
                    .ok_or_else(overflow)?;
            }
            None => decrements.push(StockDecrement {
                product_id: product.id.clone(),
                quantity: line.quantity,
                available: product.stock,
            }),
        }
    }

    for decrement in &decrements {
        let product = &products[&decrement.product_id];
        if !product.can_sell(decrement.quantity) {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock,
                requested: decrement.quantity,
            });
        }
    }

    let mut items = Vec::with_capacity(request.items.len());
    let mut total = Money::zero();
    for line in &request.items {
        let product = &products[&line.product_id];
        let line_total = product
            .price()
            .checked_line_total(line.quantity)
            .ok_or_else(overflow)?;
        total = Money::from_cents(
            total
                .cents()
                .checked_add(line_total.cents())
                .ok_or_else(overflow)?,
        );
        items.push(SaleItem {
            sale_id: sale_id.clone(),
            product_id: product.id.clone(),
            quantity: line.quantity,
            price_cents: product.price_cents,
        });
    }

    Ok(SalePlan {
        sale: Sale {
            id: sale_id,
            customer_id: customer.id.clone(),
            date,
            total_cents: total.cents(),
            items,
        },
        decrements,
    })
}

fn overflow() -> CoreError {
    ValidationError::InvalidFormat {
        field: "total".to_string(),
        reason: "sale total exceeds the supported range".to_string(),
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================

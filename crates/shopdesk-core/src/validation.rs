//! # Validation Module
//!
//! Input validation for ShopDesk. Every validator runs before the store is
//! touched, so a rejected request never opens a transaction.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Presentation (forms)                                         │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields, lengths, email shape                             │
//! │  └── Price > 0, stock >= 0, quantity > 0, non-empty sale               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (price_cents >= 0, stock >= 0, quantity > 0)    │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{NewCustomer, NewProduct, NewSale};
use crate::MAX_NAME_LENGTH;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a display name (product or customer).
///
/// ## Rules
/// - Must not be empty after trimming
/// - At most `MAX_NAME_LENGTH` characters
///
/// ```rust
/// use shopdesk_core::validation::validate_name;
///
/// assert!(validate_name("Webcam Full HD").is_ok());
/// assert!(validate_name("   ").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// Only the shape is checked: one `@`, a non-empty local part, and a domain
/// containing a dot that is neither first nor last.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(())
}

/// Validates that an id reference was supplied.
///
/// ## Usage
/// Catches "no customer selected" / "no product selected" before any lookup.
pub fn validate_reference(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a unit price in cents. Must be strictly positive.
///
/// ```rust
/// use shopdesk_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(19990).is_ok());
/// assert!(validate_price_cents(0).is_err());
/// assert!(validate_price_cents(-100).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates a stock level. Zero is allowed.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "stock".to_string(),
        });
    }
    Ok(())
}

/// Validates a sale line quantity. Must be positive.
///
/// There is no upper bound here: stock is the limit, and an overflowing
/// total is rejected when the sale is planned.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates product fields for create and update.
pub fn validate_product(name: &str, price_cents: i64, stock: i64) -> ValidationResult<()> {
    validate_name(name)?;
    validate_price_cents(price_cents)?;
    validate_stock(stock)
}

/// Validates a product creation request.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product(&product.name, product.price_cents, product.stock)
}

/// Validates customer fields for create and update.
pub fn validate_customer(name: &str, email: &str) -> ValidationResult<()> {
    validate_name(name)?;
    validate_email(email)
}

/// Validates a customer creation request.
pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_customer(&customer.name, &customer.email)
}

/// Validates the shape of a sale request.
///
/// ## Rules
/// - A customer must be selected
/// - At least one line
/// - Every line names a product and has a valid quantity
pub fn validate_new_sale(sale: &NewSale) -> ValidationResult<()> {
    validate_reference("customer", &sale.customer_id)?;

    if sale.items.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    for line in &sale.items {
        validate_reference("product", &line.product_id)?;
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SaleLine;

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Laptop Pro X2").is_ok());
        assert!(validate_name("Teclado Mecânico RGB").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("contato@techsolutions.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("a@b@c.com").is_err());
        assert!(validate_email("user@localhost").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("us er@example.com").is_err());
    }

    #[test]
    fn test_validate_product_fields() {
        assert!(validate_product("Webcam", 35000, 0).is_ok());
        assert!(matches!(
            validate_product("Webcam", 0, 5),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            validate_product("Webcam", 100, -1),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(1000).is_ok());
        assert!(validate_quantity(i64::MAX).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_new_sale() {
        let ok = NewSale::new("c1", vec![SaleLine::new("p1", 3)]);
        assert!(validate_new_sale(&ok).is_ok());

        let empty = NewSale::new("c1", vec![]);
        assert!(matches!(
            validate_new_sale(&empty),
            Err(ValidationError::Empty { .. })
        ));

        let no_customer = NewSale::new(" ", vec![SaleLine::new("p1", 1)]);
        assert!(matches!(
            validate_new_sale(&no_customer),
            Err(ValidationError::Required { .. })
        ));

        let no_product = NewSale::new("c1", vec![SaleLine::new("", 1)]);
        assert!(validate_new_sale(&no_product).is_err());

        let zero_qty = NewSale::new("c1", vec![SaleLine::new("p1", 0)]);
        assert!(validate_new_sale(&zero_qty).is_err());

        let many_lines = NewSale::new("c1", vec![SaleLine::new("p1", 1); 250]);
        assert!(validate_new_sale(&many_lines).is_ok());
    }
}

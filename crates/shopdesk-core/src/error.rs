//! # Error Types
//!
//! Domain-specific error types for shopdesk-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopdesk-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule failures                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopdesk-db errors (separate crate)                                   │
//! │  └── DbError          - Wraps CoreError + storage failures             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → caller                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Kinds
//! Every business failure maps to exactly one [`ErrorKind`]. The presentation
//! layer shows the `Display` message verbatim; the kind drives styling and
//! status codes.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Entity
// =============================================================================

/// The entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub enum Entity {
    Product,
    Customer,
    Sale,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Product => write!(f, "Product"),
            Entity::Customer => write!(f, "Customer"),
            Entity::Sale => write!(f, "Sale"),
        }
    }
}

// =============================================================================
// Error Kind
// =============================================================================

/// Coarse classification of a rejected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Referenced customer, product or sale does not exist.
    NotFound,
    /// Delete blocked by existing references.
    Conflict,
    /// Requested quantity exceeds available stock.
    InsufficientStock,
    /// Malformed input, rejected before touching the store.
    Validation,
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity cannot be found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: Entity, id: String },

    /// Deletion blocked because the entity is still referenced.
    ///
    /// ## When This Occurs
    /// - Deleting a product that appears on any sale item
    /// - Deleting a customer that has any sale
    #[error("Cannot delete {entity} {id}: {reason}")]
    Conflict {
        entity: Entity,
        id: String,
        reason: String,
    },

    /// Insufficient stock to complete sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Sale request: Webcam Full HD × 10
    ///      │
    ///      ▼
    /// Check stock: available=5
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Webcam Full HD", available: 5, requested: 10 }
    ///      │
    ///      ▼
    /// UI shows the message, nothing was written
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error.
    pub fn not_found(entity: Entity, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Creates a Conflict error.
    pub fn conflict(entity: Entity, id: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::Conflict {
            entity,
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Returns the error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::Conflict { .. } => ErrorKind::Conflict,
            CoreError::InsufficientStock { .. } => ErrorKind::InsufficientStock,
            CoreError::Validation(_) => ErrorKind::Validation,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when input doesn't meet requirements and are raised before
/// any store access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid email, unknown month label).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A collection that must have entries is empty.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product: "Webcam Full HD".to_string(),
            available: 5,
            requested: 10,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Webcam Full HD: available 5, requested 10"
        );

        let err = CoreError::not_found(Entity::Customer, "c-404");
        assert_eq!(err.to_string(), "Customer not found: c-404");
    }

    #[test]
    fn test_kinds() {
        assert_eq!(
            CoreError::not_found(Entity::Product, "p1").kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            CoreError::conflict(Entity::Product, "p1", "referenced by a sale").kind(),
            ErrorKind::Conflict
        );
        let validation: CoreError = ValidationError::Empty {
            field: "items".to_string(),
        }
        .into();
        assert_eq!(validation.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::Empty {
            field: "items".to_string(),
        };
        assert_eq!(err.to_string(), "items must contain at least one entry");
    }
}

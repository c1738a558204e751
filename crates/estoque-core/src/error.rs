//! # Error Types
//!
//! Domain-specific error types for estoque-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  estoque-core errors (this file)                                       │
//! │  ├── CoreError        - Ledger rule violations                         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  estoque-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  estoque-api errors                                                    │
//! │  └── ApiError         - What the presentation layer sees               │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is recoverable by the caller. None of them leaves the
//! catalog or the ledger in a partially written state.

use thiserror::Error;

use crate::validation::MAX_STOCK_QUANTITY;

// =============================================================================
// Core Error
// =============================================================================

/// Stock ledger errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The referenced product id does not exist.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Another product already uses this name.
    ///
    /// ## When This Occurs
    /// - Creating a product with a name that is already stored
    /// - Renaming a product to the name of a *different* product
    ///
    /// Renaming a product to its own current name is not a collision.
    #[error("A product named '{0}' already exists")]
    DuplicateName(String),

    /// Outbound movement larger than the stock on hand.
    ///
    /// ## User Workflow
    /// ```text
    /// Record Outbound (qty: 10)
    ///      │
    ///      ▼
    /// Check stock: available=4
    ///      │
    ///      ▼
    /// InsufficientStock { product: "Gloves", available: 4, requested: 10 }
    ///      │
    ///      ▼
    /// Nothing written: quantity stays 4, ledger unchanged
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A movement quantity that is not a positive integer, or is above
    /// the stock limit.
    #[error(
        "Invalid {field}: '{value}' is not a positive whole number up to {max}",
        max = MAX_STOCK_QUANTITY
    )]
    InvalidQuantity { field: String, value: String },

    /// Inbound movement that would push stock past `MAX_STOCK_QUANTITY`.
    ///
    /// Nothing is written, same as [`CoreError::InsufficientStock`].
    #[error(
        "Stock limit exceeded for {product}: available {available}, requested {requested}, limit {max}",
        max = MAX_STOCK_QUANTITY
    )]
    StockLimitExceeded {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A derived money value (stock value, dashboard total) does not fit
    /// in 64-bit cents.
    #[error("{0} is too large to compute")]
    ValueOverflow(String),

    /// CSV serialization failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidQuantity error for the given field and raw value.
    pub fn invalid_quantity(field: impl Into<String>, value: impl ToString) -> Self {
        CoreError::InvalidQuantity {
            field: field.into(),
            value: value.to_string(),
        }
    }
}

impl From<csv::Error> for CoreError {
    fn from(err: csv::Error) -> Self {
        CoreError::Export(err.to_string())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Raised before any datastore access.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Value is above its upper bound.
    #[error("{field} must be at most {max}")]
    TooLarge { field: String, max: String },

    /// Invalid format (e.g., invalid date, invalid decimal).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A date range whose start is after its end.
    #[error("date_from {from} is after date_to {to}")]
    InvertedRange { from: String, to: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

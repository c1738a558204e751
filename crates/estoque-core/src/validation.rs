//! # Validation Module
//!
//! Input validation and raw-field parsing for the stock ledger.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Boundary (estoque-api forms)                                 │
//! │  ├── Raw strings → typed values (parse_* in THIS MODULE)               │
//! │  └── Blank optional fields → None                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Typed inputs (NewProduct::validate, NewMovement::validate)   │
//! │  └── Business rules (validate_* in THIS MODULE)                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE(name)                                                      │
//! │  ├── CHECK(quantity >= 0), CHECK(movement quantity > 0)                │
//! │  └── FOREIGN KEY(product_id)                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use estoque_core::validation::{parse_movement_type, parse_quantity};
//! use estoque_core::MovementType;
//!
//! assert_eq!(parse_quantity("quantity", " 12 ").unwrap(), 12);
//! assert_eq!(parse_movement_type("Saída").unwrap(), MovementType::Outbound);
//! ```

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::MovementType;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_CATEGORY_LEN: usize = 50;
pub const MAX_CONTRACT_LEN: usize = 100;
pub const MAX_UNIT_LEN: usize = 20;
pub const MAX_RESPONSIBLE_LEN: usize = 100;
pub const MAX_NOTE_LEN: usize = 200;

/// Upper bound for a product's stock level and for a single movement.
///
/// Multiplied by `Money::MAX_UNIT_VALUE` this still fits in i64 cents, and
/// `quantity + movement` can never overflow in SQL.
pub const MAX_STOCK_QUANTITY: i64 = 100_000_000;

/// Date format accepted by report filters.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// String Validators
// =============================================================================

/// Trims a required text field and checks its length in characters.
///
/// ```rust
/// use estoque_core::validation::validate_required;
///
/// assert_eq!(validate_required("name", "  Gloves ", 100).unwrap(), "Gloves");
/// assert!(validate_required("name", "   ", 100).is_err());
/// assert!(validate_required("unit", "kilograms-per-box-x", 5).is_err());
/// ```
pub fn validate_required(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Trims an optional text field. Blank becomes `None`.
pub fn normalize_optional(
    field: &str,
    value: Option<&str>,
    max: usize,
) -> ValidationResult<Option<String>> {
    match blank_to_none(value) {
        None => Ok(None),
        Some(value) => validate_required(field, &value, max).map(Some),
    }
}

/// Returns the trimmed value, or `None` when absent or blank.
#[inline]
pub fn blank_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Checks a movement quantity.
///
/// ## User Workflow
/// ```text
/// Record movement (qty: 0)
///      │
///      ▼
/// validate_movement_quantity(0) ← THIS FUNCTION
///      │
///      ├── qty <= 0 or qty > MAX_STOCK_QUANTITY? → InvalidQuantity,
///      │                                          datastore never touched
///      │
///      └── OK → stock mutation engine
/// ```
pub fn validate_movement_quantity(quantity: i64) -> CoreResult<()> {
    if quantity <= 0 || quantity > MAX_STOCK_QUANTITY {
        return Err(CoreError::invalid_quantity("quantity", quantity));
    }
    Ok(())
}

/// Rejects negative stock levels and thresholds.
pub fn validate_non_negative(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// A stock level: `0..=MAX_STOCK_QUANTITY`.
///
/// ```rust
/// use estoque_core::validation::{validate_stock_level, MAX_STOCK_QUANTITY};
///
/// assert!(validate_stock_level("quantity", MAX_STOCK_QUANTITY).is_ok());
/// assert!(validate_stock_level("quantity", MAX_STOCK_QUANTITY + 1).is_err());
/// assert!(validate_stock_level("quantity", -1).is_err());
/// ```
pub fn validate_stock_level(field: &str, value: i64) -> ValidationResult<()> {
    validate_non_negative(field, value)?;
    if value > MAX_STOCK_QUANTITY {
        return Err(ValidationError::TooLarge {
            field: field.to_string(),
            max: MAX_STOCK_QUANTITY.to_string(),
        });
    }
    Ok(())
}

/// A unit value: not negative, at most `Money::MAX_UNIT_VALUE`.
pub fn validate_unit_value(value: Money) -> ValidationResult<()> {
    if value.is_negative() {
        return Err(ValidationError::Negative {
            field: "unit_value".to_string(),
        });
    }
    if value > Money::MAX_UNIT_VALUE {
        return Err(ValidationError::TooLarge {
            field: "unit_value".to_string(),
            max: Money::MAX_UNIT_VALUE.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Raw Field Parsers
// =============================================================================

/// Parses a movement quantity typed by a user.
///
/// Anything that is not a positive whole number is `InvalidQuantity`.
pub fn parse_quantity(field: &str, raw: &str) -> CoreResult<i64> {
    let text = raw.trim();
    let quantity: i64 = text
        .parse()
        .map_err(|_| CoreError::invalid_quantity(field, text))?;
    if quantity <= 0 || quantity > MAX_STOCK_QUANTITY {
        return Err(CoreError::invalid_quantity(field, text));
    }
    Ok(quantity)
}

/// Parses a stock count or threshold. Blank means zero.
///
/// ```rust
/// use estoque_core::validation::parse_count;
///
/// assert_eq!(parse_count("min_stock", "").unwrap(), 0);
/// assert_eq!(parse_count("min_stock", "5").unwrap(), 5);
/// assert!(parse_count("min_stock", "-1").is_err());
/// assert!(parse_count("min_stock", "2.5").is_err());
/// ```
pub fn parse_count(field: &str, raw: &str) -> ValidationResult<i64> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(0);
    }

    let value: i64 = text.parse().map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "expected a whole number".to_string(),
    })?;
    validate_non_negative(field, value)?;
    Ok(value)
}

/// Parses an optional positive id (e.g. a product selector). Blank is `None`.
pub fn parse_optional_id(field: &str, raw: Option<&str>) -> ValidationResult<Option<i64>> {
    let Some(text) = blank_to_none(raw) else {
        return Ok(None);
    };

    match text.parse::<i64>() {
        Ok(id) if id > 0 => Ok(Some(id)),
        _ => Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "expected a product id".to_string(),
        }),
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(field: &str, raw: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "expected a date as YYYY-MM-DD".to_string(),
    })
}

/// Parses an optional date filter. Blank is `None`.
pub fn parse_optional_date(field: &str, raw: Option<&str>) -> ValidationResult<Option<NaiveDate>> {
    blank_to_none(raw)
        .map(|text| parse_date(field, &text))
        .transpose()
}

/// Parses a movement direction.
///
/// Accepts the form labels `Entrada`/`Saída` (also `Saida`) and the storage
/// names `inbound`/`outbound`, case-insensitively.
pub fn parse_movement_type(raw: &str) -> ValidationResult<MovementType> {
    match raw.trim().to_lowercase().as_str() {
        "entrada" | "inbound" => Ok(MovementType::Inbound),
        "saída" | "saida" | "outbound" => Ok(MovementType::Outbound),
        _ => Err(ValidationError::NotAllowed {
            field: "type".to_string(),
            allowed: vec![
                "Entrada".to_string(),
                "Saída".to_string(),
                "inbound".to_string(),
                "outbound".to_string(),
            ],
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

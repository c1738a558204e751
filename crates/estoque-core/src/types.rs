//! # Domain Types
//!
//! Core domain types of the stock ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐  1     * ┌─────────────────┐                      │
//! │  │    Product      │──────────│    Movement     │                      │
//! │  │  ─────────────  │  owns    │  ─────────────  │                      │
//! │  │  id (i64)       │          │  id (i64)       │                      │
//! │  │  name (unique)  │          │  product_id FK  │                      │
//! │  │  quantity       │◄─────────│  kind           │                      │
//! │  │  unit_value     │ cached   │  quantity > 0   │                      │
//! │  │  min_stock      │ sum of   │  occurred_at    │                      │
//! │  └─────────────────┘          └─────────────────┘                      │
//! │                                                                         │
//! │  quantity == initial_quantity + Σ signed(movement.quantity)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Inputs vs Records
//! `NewProduct`, `ProductUpdate` and `NewMovement` are typed inputs that have
//! already been parsed from raw strings. Each has a `validate()` that trims
//! and normalizes its text fields and checks the business rules; repositories
//! call it before opening a transaction.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::validation::{
    normalize_optional, validate_movement_quantity, validate_non_negative, validate_required,
    validate_stock_level, validate_unit_value, MAX_CATEGORY_LEN, MAX_CONTRACT_LEN, MAX_NAME_LEN,
    MAX_NOTE_LEN, MAX_RESPONSIBLE_LEN, MAX_UNIT_LEN,
};

// =============================================================================
// Movement Type
// =============================================================================

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    /// Stock received (`Entrada`).
    Inbound,
    /// Stock withdrawn (`Saída`).
    Outbound,
}

impl MovementType {
    /// Returns the quantity with the sign this movement applies to stock.
    ///
    /// ```rust
    /// use estoque_core::MovementType;
    ///
    /// assert_eq!(MovementType::Inbound.signed(5), 5);
    /// assert_eq!(MovementType::Outbound.signed(5), -5);
    /// ```
    #[inline]
    pub const fn signed(&self, quantity: i64) -> i64 {
        match self {
            MovementType::Inbound => quantity,
            MovementType::Outbound => -quantity,
        }
    }

    /// Storage and wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementType::Inbound => "inbound",
            MovementType::Outbound => "outbound",
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Product
// =============================================================================

/// A stocked item in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Surrogate key, never reused.
    pub id: i64,

    /// Unique display name. Stored case-sensitively.
    pub name: String,

    /// Free-text classification.
    pub category: String,

    /// Contract the item is bought under, if any.
    pub contract: Option<String>,

    /// Unit label ("kg", "unit", "box").
    pub unit: String,

    /// Cached stock level. Only the movement engine changes it.
    pub quantity: i64,

    /// Quantity supplied at creation; not represented in the ledger.
    pub initial_quantity: i64,

    /// Value of one unit.
    pub unit_value: Money,

    /// Low-stock threshold. Zero disables alerting.
    pub min_stock: i64,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// True when the product has a threshold and stock is at or below it.
    ///
    /// ```rust
    /// # use estoque_core::{Money, Product};
    /// # use chrono::Utc;
    /// # let mut p = Product {
    /// #     id: 1, name: "Gloves".into(), category: "PPE".into(), contract: None,
    /// #     unit: "pair".into(), quantity: 4, initial_quantity: 10,
    /// #     unit_value: Money::zero(), min_stock: 5,
    /// #     created_at: Utc::now(), updated_at: Utc::now(),
    /// # };
    /// assert!(p.is_low_stock());
    /// p.min_stock = 0;
    /// assert!(!p.is_low_stock());
    /// ```
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.min_stock > 0 && self.quantity <= self.min_stock
    }

    /// quantity × unit_value.
    ///
    /// Validated input keeps this within range; a row written outside the
    /// validators gets `ValueOverflow` instead of a panic.
    pub fn stock_value(&self) -> CoreResult<Money> {
        self.unit_value
            .checked_multiply_quantity(self.quantity)
            .ok_or_else(|| CoreError::ValueOverflow(format!("Stock value of {}", self.name)))
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub contract: Option<String>,
    pub unit: String,
    /// Opening stock. Written directly, without a ledger entry.
    pub quantity: i64,
    pub unit_value: Money,
    pub min_stock: i64,
}

impl NewProduct {
    /// Creates an input with zero stock, zero value and no threshold.
    pub fn new(name: impl Into<String>, category: impl Into<String>, unit: impl Into<String>) -> Self {
        NewProduct {
            name: name.into(),
            category: category.into(),
            contract: None,
            unit: unit.into(),
            quantity: 0,
            unit_value: Money::zero(),
            min_stock: 0,
        }
    }

    pub fn with_contract(mut self, contract: impl Into<String>) -> Self {
        self.contract = Some(contract.into());
        self
    }

    pub fn with_quantity(mut self, quantity: i64) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_unit_value(mut self, unit_value: Money) -> Self {
        self.unit_value = unit_value;
        self
    }

    pub fn with_min_stock(mut self, min_stock: i64) -> Self {
        self.min_stock = min_stock;
        self
    }

    /// Trims text fields and checks every rule; returns the normalized input.
    pub fn validate(self) -> CoreResult<NewProduct> {
        validate_stock_level("quantity", self.quantity)?;
        validate_non_negative("min_stock", self.min_stock)?;
        validate_unit_value(self.unit_value)?;

        Ok(NewProduct {
            name: validate_required("name", &self.name, MAX_NAME_LEN)?,
            category: validate_required("category", &self.category, MAX_CATEGORY_LEN)?,
            contract: normalize_optional("contract", self.contract.as_deref(), MAX_CONTRACT_LEN)?,
            unit: validate_required("unit", &self.unit, MAX_UNIT_LEN)?,
            quantity: self.quantity,
            unit_value: self.unit_value,
            min_stock: self.min_stock,
        })
    }
}

/// Catalog-level edit. Has no quantity field on purpose: stock changes only
/// through movements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: String,
    pub category: String,
    pub contract: Option<String>,
    pub unit: String,
    pub unit_value: Money,
    pub min_stock: i64,
}

impl ProductUpdate {
    /// Starts an update from the product's current catalog fields.
    pub fn from_product(product: &Product) -> Self {
        ProductUpdate {
            name: product.name.clone(),
            category: product.category.clone(),
            contract: product.contract.clone(),
            unit: product.unit.clone(),
            unit_value: product.unit_value,
            min_stock: product.min_stock,
        }
    }

    pub fn validate(self) -> CoreResult<ProductUpdate> {
        validate_non_negative("min_stock", self.min_stock)?;
        validate_unit_value(self.unit_value)?;

        Ok(ProductUpdate {
            name: validate_required("name", &self.name, MAX_NAME_LEN)?,
            category: validate_required("category", &self.category, MAX_CATEGORY_LEN)?,
            contract: normalize_optional("contract", self.contract.as_deref(), MAX_CONTRACT_LEN)?,
            unit: validate_required("unit", &self.unit, MAX_UNIT_LEN)?,
            unit_value: self.unit_value,
            min_stock: self.min_stock,
        })
    }
}

/// Catalog search. All filters are case-insensitive substring matches,
/// AND-combined; `None` or blank means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub name_contains: Option<String>,
    pub category_contains: Option<String>,
    pub contract_contains: Option<String>,
}

impl ProductFilter {
    /// Returns true when the product passes every active filter.
    ///
    /// A product without a contract never matches an active contract filter.
    pub fn matches(&self, product: &Product) -> bool {
        fn needle(filter: &Option<String>) -> Option<String> {
            filter
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_lowercase)
        }

        fn contains(haystack: Option<&str>, filter: &Option<String>) -> bool {
            match (haystack, needle(filter)) {
                (_, None) => true,
                (None, Some(_)) => false,
                (Some(haystack), Some(needle)) => haystack.to_lowercase().contains(&needle),
            }
        }

        contains(Some(&product.name), &self.name_contains)
            && contains(Some(&product.category), &self.category_contains)
            && contains(product.contract.as_deref(), &self.contract_contains)
    }

    /// True when no filter is active.
    pub fn is_empty(&self) -> bool {
        [&self.name_contains, &self.category_contains, &self.contract_contains]
            .iter()
            .all(|f| f.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

// =============================================================================
// Movement
// =============================================================================

/// An immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Movement {
    pub id: i64,
    pub product_id: i64,
    pub kind: MovementType,
    /// Always positive; direction comes from `kind`.
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
    pub responsible: String,
    pub note: Option<String>,
}

impl Movement {
    /// The change this movement applied to stock.
    #[inline]
    pub fn signed_quantity(&self) -> i64 {
        self.kind.signed(self.quantity)
    }
}

/// Input for the stock mutation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMovement {
    pub product_id: i64,
    pub kind: MovementType,
    pub quantity: i64,
    pub responsible: String,
    pub note: Option<String>,
    /// Defaults to the current UTC time when absent.
    pub occurred_at: Option<DateTime<Utc>>,
}

impl NewMovement {
    pub fn new(product_id: i64, kind: MovementType, quantity: i64, responsible: impl Into<String>) -> Self {
        NewMovement {
            product_id,
            kind,
            quantity,
            responsible: responsible.into(),
            note: None,
            occurred_at: None,
        }
    }

    pub fn inbound(product_id: i64, quantity: i64, responsible: impl Into<String>) -> Self {
        NewMovement::new(product_id, MovementType::Inbound, quantity, responsible)
    }

    pub fn outbound(product_id: i64, quantity: i64, responsible: impl Into<String>) -> Self {
        NewMovement::new(product_id, MovementType::Outbound, quantity, responsible)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    /// Rejects non-positive quantities and blank responsibles.
    pub fn validate(self) -> CoreResult<NewMovement> {
        validate_movement_quantity(self.quantity)?;

        Ok(NewMovement {
            product_id: self.product_id,
            kind: self.kind,
            quantity: self.quantity,
            responsible: validate_required("responsible", &self.responsible, MAX_RESPONSIBLE_LEN)?,
            note: normalize_optional("note", self.note.as_deref(), MAX_NOTE_LEN)?,
            occurred_at: self.occurred_at,
        })
    }
}

/// What the engine hands back after a committed movement.
///
/// Carries the product as it is *after* the movement so the caller can
/// surface a low-stock warning without querying again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementReceipt {
    pub movement: Movement,
    pub product: Product,
}

impl MovementReceipt {
    #[inline]
    pub fn low_stock_warning(&self) -> bool {
        self.product.is_low_stock()
    }
}

/// A movement joined with the name of its product, for reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct MovementLine {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub kind: MovementType,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
    pub responsible: String,
    pub note: Option<String>,
}

/// Ledger report filter. Dates are calendar days in UTC, both inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<i64>,
    pub kind: Option<MovementType>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl MovementFilter {
    /// Converts the day range into timestamp bounds.
    ///
    /// ## Returns
    /// `(from, until)` where `from` is midnight of `date_from` (inclusive) and
    /// `until` is midnight of the day *after* `date_to` (exclusive).
    ///
    /// ```rust
    /// use chrono::NaiveDate;
    /// use estoque_core::MovementFilter;
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    /// let filter = MovementFilter { date_from: Some(day), date_to: Some(day), ..Default::default() };
    /// let (from, until) = filter.time_bounds().unwrap();
    /// assert_eq!(from.unwrap().to_rfc3339(), "2024-01-10T00:00:00+00:00");
    /// assert_eq!(until.unwrap().to_rfc3339(), "2024-01-11T00:00:00+00:00");
    /// ```
    pub fn time_bounds(&self) -> CoreResult<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(ValidationError::InvertedRange {
                    from: from.to_string(),
                    to: to.to_string(),
                }
                .into());
            }
        }

        let from = self.date_from.map(start_of_day);
        let until = match self.date_to {
            Some(to) => Some(start_of_day(to.checked_add_days(Days::new(1)).ok_or_else(|| {
                CoreError::from(ValidationError::InvalidFormat {
                    field: "date_to".to_string(),
                    reason: "date out of range".to_string(),
                })
            })?)),
            None => None,
        };

        Ok((from, until))
    }
}

/// Midnight UTC of the given day.
#[inline]
pub fn start_of_day(day: NaiveDate) -> DateTime<Utc> {
    day.and_time(NaiveTime::MIN).and_utc()
}

// =============================================================================
// Aggregates
// =============================================================================

/// Dashboard totals over the whole catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSummary {
    /// Number of products.
    pub item_count: i64,
    /// Sum of all quantities.
    pub total_units: i64,
    /// Σ quantity × unit_value.
    pub total_stock_value: Money,
}

impl StockSummary {
    /// Totals `(quantity, unit_value)` pairs with checked arithmetic.
    ///
    /// ```rust
    /// use estoque_core::{Money, StockSummary};
    ///
    /// let summary = StockSummary::from_levels([
    ///     (100, Money::from_cents(150)),
    ///     (3, Money::from_cents(1)),
    /// ])
    /// .unwrap();
    /// assert_eq!(summary.item_count, 2);
    /// assert_eq!(summary.total_units, 103);
    /// assert_eq!(summary.total_stock_value.to_string(), "150.03");
    /// ```
    pub fn from_levels<I>(levels: I) -> CoreResult<StockSummary>
    where
        I: IntoIterator<Item = (i64, Money)>,
    {
        let overflow = || CoreError::ValueOverflow("Total stock value".to_string());

        levels
            .into_iter()
            .try_fold(StockSummary::default(), |acc, (quantity, unit_value)| {
                let value = unit_value
                    .checked_multiply_quantity(quantity)
                    .and_then(|v| acc.total_stock_value.checked_add(v))
                    .ok_or_else(overflow)?;
                Ok(StockSummary {
                    item_count: acc.item_count + 1,
                    total_units: acc.total_units.checked_add(quantity).ok_or_else(overflow)?,
                    total_stock_value: value,
                })
            })
    }
}

/// A product whose cached quantity disagrees with its ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerDiscrepancy {
    pub product_id: i64,
    pub name: String,
    pub cached_quantity: i64,
    pub recomputed_quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

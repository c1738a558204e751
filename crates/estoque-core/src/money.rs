//! # Money Module
//!
//! Provides the `Money` type used for product unit values and stock value
//! totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With floats:                                                           │
//! │    100 × 1.10 = 110.00000000000001                                      │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    100 × 110 cents = 11000 cents → "110.00", exactly                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## One Representation, Two Renderings
//! Internally every value is cents. `Display` renders the machine decimal
//! (`1234.50`), which is what the CSV export and JSON payloads carry.
//! [`Money::format_localized`] renders display strings such as `1.234,50`
//! and is only called at the presentation boundary.
//!
//! ## Usage
//! ```rust
//! use estoque_core::money::Money;
//!
//! let unit_value = Money::parse("unit_value", "1,50").unwrap();
//! assert_eq!(unit_value.cents(), 150);
//!
//! let total = unit_value.checked_multiply_quantity(100).unwrap();
//! assert_eq!(total.to_string(), "150.00");
//! ```
//!
//! ## Overflow
//! There is no `Add`/`Mul` impl. Every arithmetic helper is checked and
//! returns `None` past `i64::MAX` cents, so a huge input can never panic
//! a render path. Input is bounded by [`Money::MAX_UNIT_VALUE`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents.
///
/// ## Where Money is Used
/// ```text
/// Product.unit_value ──► quantity × unit_value ──► CSV "Total Value"
///                                │
///                                └──► Dashboard total_stock_value
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Largest accepted unit value: R$ 100.000.000,00.
    ///
    /// Together with `MAX_STOCK_QUANTITY` this keeps one product's stock
    /// value at or below 10^18 cents.
    pub const MAX_UNIT_VALUE: Money = Money(10_000_000_000);

    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use estoque_core::money::Money;
    ///
    /// let value = Money::from_cents(150);
    /// assert_eq!(value.cents(), 150);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion (truncated toward zero).
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit value by a stock quantity.
    ///
    /// Returns `None` on overflow.
    ///
    /// ```rust
    /// use estoque_core::money::Money;
    ///
    /// let unit_value = Money::from_cents(150);
    /// assert_eq!(unit_value.checked_multiply_quantity(100).unwrap().cents(), 15000);
    /// assert!(Money::from_cents(i64::MAX / 2).checked_multiply_quantity(3).is_none());
    /// ```
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two values. Returns `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums values, stopping at the first overflow.
    ///
    /// ```rust
    /// use estoque_core::money::Money;
    ///
    /// let total = Money::checked_sum([Money::from_cents(150), Money::from_cents(250)]);
    /// assert_eq!(total, Some(Money::from_cents(400)));
    /// ```
    pub fn checked_sum<I>(values: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        values
            .into_iter()
            .try_fold(Money::zero(), |total, value| total.checked_add(value))
    }

    /// Parses a decimal typed by a user.
    ///
    /// ## Accepted Input
    /// - `.` or `,` as the decimal separator (`1.50`, `1,50`)
    /// - at most two fractional digits (`1.5` is 150 cents)
    /// - whole numbers (`12`), or a bare fraction (`,5`)
    ///
    /// ## Rejected Input
    /// - both separators at once (`1.234,56`): thousands grouping is a
    ///   display concern and is never accepted on input
    /// - more than two fractional digits
    /// - negative values
    ///
    /// ```rust
    /// use estoque_core::money::Money;
    ///
    /// assert_eq!(Money::parse("unit_value", "1,50").unwrap().cents(), 150);
    /// assert_eq!(Money::parse("unit_value", "1.5").unwrap().cents(), 150);
    /// assert_eq!(Money::parse("unit_value", "12").unwrap().cents(), 1200);
    /// assert!(Money::parse("unit_value", "1.234,56").is_err());
    /// assert!(Money::parse("unit_value", "-1").is_err());
    /// ```
    pub fn parse(field: &str, raw: &str) -> Result<Money, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: reason.to_string(),
        };

        let text = raw.trim();
        if text.is_empty() {
            return Err(invalid("expected a decimal number"));
        }

        let (negative, digits) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let is_separator = |c: char| c == '.' || c == ',';
        if digits.matches(is_separator).count() > 1 {
            return Err(invalid("use a single decimal separator and no grouping"));
        }

        let (whole, fraction) = match digits.find(is_separator) {
            Some(idx) => (&digits[..idx], &digits[idx + 1..]),
            None => (digits, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid("expected a decimal number"));
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("expected a decimal number"));
        }
        if fraction.len() > 2 {
            return Err(invalid("at most two decimal places"));
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("value is too large"))?
        };
        let fraction_value: i64 = match fraction.len() {
            0 => 0,
            // Infallible: at most two ASCII digits
            len => fraction.parse::<i64>().unwrap_or(0) * if len == 1 { 10 } else { 1 },
        };

        let cents = whole_value
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction_value))
            .ok_or_else(|| invalid("value is too large"))?;

        if negative && cents != 0 {
            return Err(ValidationError::Negative {
                field: field.to_string(),
            });
        }

        Ok(Money(cents))
    }

    /// Renders the value with locale separators, for display only.
    ///
    /// ```rust
    /// use estoque_core::money::Money;
    ///
    /// let value = Money::from_cents(123456);
    /// assert_eq!(value.format_localized(',', Some('.')), "1.234,56");
    /// assert_eq!(value.format_localized('.', None), "1234.56");
    /// ```
    pub fn format_localized(&self, decimal_sep: char, thousands_sep: Option<char>) -> String {
        let digits = self.units().abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 4);

        if self.is_negative() {
            grouped.push('-');
        }
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                if let Some(sep) = thousands_sep {
                    grouped.push(sep);
                }
            }
            grouped.push(ch);
        }

        grouped.push(decimal_sep);
        grouped.push_str(&format!("{:02}", self.cents_part()));
        grouped
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Machine decimal: `.` separator, two places, no grouping.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_machine_decimal() {
        assert_eq!(Money::from_cents(15000).to_string(), "150.00");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(123456789).to_string(), "1234567.89");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
    }

    #[test]
    fn test_parse_accepts_both_separators() {
        assert_eq!(Money::parse("v", "1.50").unwrap().cents(), 150);
        assert_eq!(Money::parse("v", "1,50").unwrap().cents(), 150);
        assert_eq!(Money::parse("v", " 2,5 ").unwrap().cents(), 250);
        assert_eq!(Money::parse("v", ",75").unwrap().cents(), 75);
        assert_eq!(Money::parse("v", "10.").unwrap().cents(), 1000);
        assert_eq!(Money::parse("v", "0").unwrap().cents(), 0);
        assert_eq!(Money::parse("v", "-0").unwrap().cents(), 0);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("v", "").is_err());
        assert!(Money::parse("v", "abc").is_err());
        assert!(Money::parse("v", "1.2.3").is_err());
        assert!(Money::parse("v", "1.234,56").is_err());
        assert!(Money::parse("v", "1.999").is_err());
        assert!(Money::parse("v", ".").is_err());
        assert!(Money::parse("v", "99999999999999999999").is_err());
        assert!(matches!(
            Money::parse("unit_value", "-3"),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn test_format_localized_groups_thousands() {
        let value = Money::from_cents(123456789);
        assert_eq!(value.format_localized(',', Some('.')), "1.234.567,89");
        assert_eq!(value.format_localized('.', Some(',')), "1,234,567.89");
        assert_eq!(Money::from_cents(99900).format_localized(',', Some('.')), "999,00");
        assert_eq!(Money::zero().format_localized(',', Some('.')), "0,00");
    }

    #[test]
    fn test_sum_and_multiply() {
        let total = Money::checked_sum([Money::from_cents(150), Money::from_cents(250)]).unwrap();
        assert_eq!(total.cents(), 400);

        let value = Money::from_cents(150).checked_multiply_quantity(100).unwrap();
        assert_eq!(value.to_string(), "150.00");
    }

    #[test]
    fn test_arithmetic_overflow_is_none() {
        // Largest value the parser takes, times two
        let huge = Money::parse("unit_value", "92233720368547758").unwrap();
        assert!(huge.checked_multiply_quantity(2).is_none());
        assert!(huge.checked_add(huge).is_none());
        assert!(Money::checked_sum([huge, huge, huge]).is_none());

        // The largest unit value times the largest stock still fits
        let ceiling = Money::MAX_UNIT_VALUE.checked_multiply_quantity(100_000_000).unwrap();
        assert_eq!(ceiling.cents(), 1_000_000_000_000_000_000);
    }
}

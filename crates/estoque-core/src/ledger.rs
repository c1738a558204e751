//! # Ledger Rules
//!
//! Pure stock arithmetic shared by the mutation engine, the reconcile tool
//! and the tests.
//!
//! ```text
//! current ──► apply(kind, qty) ──► Ok(next)              0 <= next <= MAX_STOCK_QUANTITY
//!                              ├─► Err(InsufficientStock)   nothing changes
//!                              └─► Err(StockLimitExceeded)  nothing changes
//!
//! initial + Σ signed(movements) == recompute_quantity(..) == cached quantity
//! ```
//!
//! The database enforces the same rule with a conditional UPDATE; this module
//! is the reference the engine's behavior is tested against.

use crate::error::{CoreError, CoreResult};
use crate::types::{LedgerDiscrepancy, Movement, MovementType, Product};
use crate::validation::{validate_movement_quantity, MAX_STOCK_QUANTITY};

/// Applies one movement to a stock level.
///
/// ```rust
/// use estoque_core::ledger::apply;
/// use estoque_core::MovementType;
///
/// assert_eq!(apply("Gloves", 10, MovementType::Outbound, 6).unwrap(), 4);
/// assert!(apply("Gloves", 4, MovementType::Outbound, 10).is_err());
/// assert!(apply("Gloves", 99_999_999, MovementType::Inbound, 2).is_err());
/// ```
pub fn apply(product: &str, current: i64, kind: MovementType, quantity: i64) -> CoreResult<i64> {
    validate_movement_quantity(quantity)?;

    let next = current
        .checked_add(kind.signed(quantity))
        .ok_or_else(|| CoreError::invalid_quantity("quantity", quantity))?;

    if next < 0 {
        return Err(CoreError::InsufficientStock {
            product: product.to_string(),
            available: current,
            requested: quantity,
        });
    }
    if next > MAX_STOCK_QUANTITY {
        return Err(CoreError::StockLimitExceeded {
            product: product.to_string(),
            available: current,
            requested: quantity,
        });
    }

    Ok(next)
}

/// Signed sum of a product's movements.
pub fn ledger_balance<'a, I>(movements: I) -> i64
where
    I: IntoIterator<Item = &'a Movement>,
{
    movements.into_iter().map(Movement::signed_quantity).sum()
}

/// The quantity the ledger says a product should have.
#[inline]
pub fn recompute_quantity(initial_quantity: i64, balance: i64) -> i64 {
    initial_quantity + balance
}

/// Compares a product's cached quantity to its ledger.
///
/// Returns `None` when they agree.
pub fn check(product: &Product, balance: i64) -> Option<LedgerDiscrepancy> {
    let recomputed = recompute_quantity(product.initial_quantity, balance);
    (recomputed != product.quantity).then(|| LedgerDiscrepancy {
        product_id: product.id,
        name: product.name.clone(),
        cached_quantity: product.quantity,
        recomputed_quantity: recomputed,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use chrono::Utc;
    use proptest::prelude::*;

    fn movement(id: i64, kind: MovementType, quantity: i64) -> Movement {
        Movement {
            id,
            product_id: 1,
            kind,
            quantity,
            occurred_at: Utc::now(),
            responsible: "Ana".to_string(),
            note: None,
        }
    }

    fn product(quantity: i64, initial_quantity: i64) -> Product {
        Product {
            id: 1,
            name: "Gloves".to_string(),
            category: "EPI".to_string(),
            contract: None,
            unit: "par".to_string(),
            quantity,
            initial_quantity,
            unit_value: Money::zero(),
            min_stock: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_apply_scenario() {
        let after = apply("Gloves", 10, MovementType::Outbound, 6).unwrap();
        assert_eq!(after, 4);

        let err = apply("Gloves", after, MovementType::Outbound, 10).unwrap_err();
        match err {
            CoreError::InsufficientStock {
                product,
                available,
                requested,
            } => {
                assert_eq!(product, "Gloves");
                assert_eq!(available, 4);
                assert_eq!(requested, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_apply_allows_draining_to_zero() {
        assert_eq!(apply("Bolt", 5, MovementType::Outbound, 5).unwrap(), 0);
    }

    #[test]
    fn test_apply_rejects_non_positive() {
        assert!(matches!(
            apply("Bolt", 5, MovementType::Inbound, 0),
            Err(CoreError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_apply_stops_at_stock_limit() {
        assert_eq!(
            apply("Bolt", MAX_STOCK_QUANTITY - 1, MovementType::Inbound, 1).unwrap(),
            MAX_STOCK_QUANTITY
        );
        assert!(matches!(
            apply("Bolt", MAX_STOCK_QUANTITY, MovementType::Inbound, 1),
            Err(CoreError::StockLimitExceeded { available, requested: 1, .. })
                if available == MAX_STOCK_QUANTITY
        ));
        assert!(matches!(
            apply("Bolt", 0, MovementType::Inbound, i64::MAX),
            Err(CoreError::InvalidQuantity { .. })
        ));
    }

    #[test]
    fn test_check_reports_drift() {
        let history = [
            movement(1, MovementType::Inbound, 5),
            movement(2, MovementType::Outbound, 2),
        ];
        let balance = ledger_balance(&history);
        assert_eq!(balance, 3);

        assert!(check(&product(13, 10), balance).is_none());

        let drift = check(&product(20, 10), balance).unwrap();
        assert_eq!(drift.cached_quantity, 20);
        assert_eq!(drift.recomputed_quantity, 13);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: for any sequence of requested movements, the accepted
        /// prefix keeps stock non-negative and the ledger recomputes it.
        #[test]
        fn accepted_movements_reconcile(
            initial in 0i64..500,
            requests in prop::collection::vec((any::<bool>(), 1i64..200), 0..60)
        ) {
            let mut quantity = initial;
            let mut accepted = Vec::new();

            for (idx, (inbound, qty)) in requests.into_iter().enumerate() {
                let kind = if inbound { MovementType::Inbound } else { MovementType::Outbound };
                match apply("P", quantity, kind, qty) {
                    Ok(next) => {
                        quantity = next;
                        accepted.push(movement(idx as i64, kind, qty));
                    }
                    Err(CoreError::InsufficientStock { available, .. }) => {
                        prop_assert_eq!(available, quantity);
                        prop_assert!(qty > quantity);
                    }
                    Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
                }

                prop_assert!(quantity >= 0);
                prop_assert_eq!(recompute_quantity(initial, ledger_balance(&accepted)), quantity);
            }
        }
    }
}

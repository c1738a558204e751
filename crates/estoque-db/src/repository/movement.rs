//! # Movement Repository
//!
//! The movement ledger and the stock mutation engine.
//!
//! ## Recording a Movement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    record(NewMovement)                                  │
//! │                                                                         │
//! │  validate()  qty <= 0 or > MAX? ──► InvalidQuantity (no transaction)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE products SET quantity = quantity + delta                       │
//! │   WHERE id = ? AND quantity + delta BETWEEN 0 AND MAX                  │
//! │                                                 ← takes the write lock │
//! │       │                                                                 │
//! │       ├── 0 rows ─► SELECT name, quantity                              │
//! │       │              ├── no row  ─► ProductNotFound    ┐               │
//! │       │              ├── below 0 ─► InsufficientStock  ├ ROLLBACK      │
//! │       │              └── above   ─► StockLimitExceeded ┘               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO movements ...                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ──► MovementReceipt { movement, product (after) }              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The conditional UPDATE is the first statement of the transaction, so two
//! concurrent outbound movements on one product queue on SQLite's write lock
//! and the second one decides against the first one's committed quantity.
//! Stock can never go negative.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::{MOVEMENT_COLUMNS, MOVEMENT_LINE_COLUMNS, PRODUCT_COLUMNS};
use estoque_core::validation::MAX_STOCK_QUANTITY;
use estoque_core::{
    ledger, CoreError, LedgerDiscrepancy, Movement, MovementLine, MovementReceipt, NewMovement,
    Product,
};

/// Signed movement quantity, as SQL.
pub(crate) const SIGNED_QUANTITY_SQL: &str =
    "CASE kind WHEN 'inbound' THEN quantity ELSE -quantity END";

/// Repository for the movement ledger.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MovementRepository { pool }
    }

    /// Records a movement and applies it to the product's stock, atomically.
    ///
    /// ## Returns
    /// * `Ok(MovementReceipt)` - Committed movement plus the product after it
    /// * `Err(DbError::Core(InvalidQuantity))` - quantity <= 0 or above `MAX_STOCK_QUANTITY`
    /// * `Err(DbError::Core(ProductNotFound))` - unknown product id
    /// * `Err(DbError::Core(InsufficientStock))` - outbound larger than stock
    /// * `Err(DbError::Core(StockLimitExceeded))` - inbound past `MAX_STOCK_QUANTITY`
    ///
    /// On any error nothing is written.
    pub async fn record(&self, input: NewMovement) -> DbResult<MovementReceipt> {
        let input = input.validate()?;
        let start = Instant::now();
        let now = Utc::now();
        let occurred_at = input.occurred_at.unwrap_or(now);
        let delta = input.kind.signed(input.quantity);

        debug!(
            product_id = input.product_id,
            kind = %input.kind,
            quantity = input.quantity,
            "Recording movement"
        );

        let mut tx = self.pool.begin().await?;

        let update_sql = format!(
            r#"
            UPDATE products
            SET quantity = quantity + ?2,
                updated_at = ?3
            WHERE id = ?1 AND quantity + ?2 BETWEEN 0 AND ?4
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let updated = sqlx::query_as::<_, Product>(&update_sql)
            .bind(input.product_id)
            .bind(delta)
            .bind(now)
            .bind(MAX_STOCK_QUANTITY)
            .fetch_optional(&mut *tx)
            .await?;

        let product = match updated {
            Some(product) => product,
            None => {
                let current: Option<(String, i64)> =
                    sqlx::query_as("SELECT name, quantity FROM products WHERE id = ?1")
                        .bind(input.product_id)
                        .fetch_optional(&mut *tx)
                        .await?;

                // Returning drops `tx`, which rolls it back
                let err = match current {
                    None => DbError::product_not_found(input.product_id),
                    Some((name, available)) => {
                        match ledger::apply(&name, available, input.kind, input.quantity) {
                            Err(rule) => rule.into(),
                            Ok(_) => DbError::TransactionFailed(format!(
                                "stock update for product {} matched no row",
                                input.product_id
                            )),
                        }
                    }
                };
                debug!(product_id = input.product_id, error = %err, "Movement rejected");
                return Err(err);
            }
        };

        let insert_sql = format!(
            r#"
            INSERT INTO movements (product_id, kind, quantity, occurred_at, responsible, note)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING {MOVEMENT_COLUMNS}
            "#
        );

        let movement = sqlx::query_as::<_, Movement>(&insert_sql)
            .bind(input.product_id)
            .bind(input.kind)
            .bind(input.quantity)
            .bind(occurred_at)
            .bind(&input.responsible)
            .bind(&input.note)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        let receipt = MovementReceipt { movement, product };

        info!(
            movement_id = receipt.movement.id,
            product_id = receipt.product.id,
            kind = %receipt.movement.kind,
            quantity = receipt.movement.quantity,
            stock = receipt.product.quantity,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Movement recorded"
        );
        if receipt.low_stock_warning() {
            warn!(
                product_id = receipt.product.id,
                name = %receipt.product.name,
                stock = receipt.product.quantity,
                min_stock = receipt.product.min_stock,
                "Product at or below minimum stock"
            );
        }

        Ok(receipt)
    }

    /// Latest movements across all products, newest first.
    pub async fn recent(&self, limit: i64) -> DbResult<Vec<MovementLine>> {
        let sql = format!(
            r#"
            SELECT {MOVEMENT_LINE_COLUMNS}
            FROM movements m
            INNER JOIN products p ON p.id = m.product_id
            ORDER BY m.occurred_at DESC, m.id DESC
            LIMIT ?1
            "#
        );

        let lines = sqlx::query_as::<_, MovementLine>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(lines)
    }

    /// Movement history of one product, newest first.
    pub async fn for_product(&self, product_id: i64) -> DbResult<Vec<Movement>> {
        let sql = format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM movements
            WHERE product_id = ?1
            ORDER BY occurred_at DESC, id DESC
            "#
        );

        let movements = sqlx::query_as::<_, Movement>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }

    /// Signed sum of a product's movements (0 when it has none).
    pub async fn ledger_balance(&self, product_id: i64) -> DbResult<i64> {
        let sql = format!(
            "SELECT COALESCE(SUM({SIGNED_QUANTITY_SQL}), 0) FROM movements WHERE product_id = ?1"
        );

        let balance: i64 = sqlx::query_scalar(&sql)
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(balance)
    }

    /// Every product whose cached quantity disagrees with its ledger.
    ///
    /// An empty result means `quantity == initial_quantity + balance` holds
    /// for the whole catalog.
    pub async fn reconcile(&self) -> DbResult<Vec<LedgerDiscrepancy>> {
        let balance_sql = format!(
            "SELECT product_id, SUM({SIGNED_QUANTITY_SQL}) FROM movements GROUP BY product_id"
        );
        let balances: HashMap<i64, i64> = sqlx::query_as::<_, (i64, i64)>(&balance_sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .collect();

        let product_sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");
        let products = sqlx::query_as::<_, Product>(&product_sql)
            .fetch_all(&self.pool)
            .await?;

        let discrepancies: Vec<LedgerDiscrepancy> = products
            .iter()
            .filter_map(|p| ledger::check(p, balances.get(&p.id).copied().unwrap_or(0)))
            .collect();

        if discrepancies.is_empty() {
            debug!(products = products.len(), "Ledger reconciled");
        } else {
            warn!(count = discrepancies.len(), "Ledger discrepancies found");
        }
        Ok(discrepancies)
    }

    /// Resets a drifted cached quantity to the ledger-derived value.
    ///
    /// Maintenance only. Returns the discrepancy that was fixed, or `None`
    /// when the product was already consistent.
    pub async fn repair(&self, product_id: i64) -> DbResult<Option<LedgerDiscrepancy>> {
        let mut tx = self.pool.begin().await?;

        let product_sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&product_sql)
            .bind(product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::product_not_found(product_id))?;

        let balance_sql = format!(
            "SELECT COALESCE(SUM({SIGNED_QUANTITY_SQL}), 0) FROM movements WHERE product_id = ?1"
        );
        let balance: i64 = sqlx::query_scalar(&balance_sql)
            .bind(product_id)
            .fetch_one(&mut *tx)
            .await?;

        let Some(discrepancy) = ledger::check(&product, balance) else {
            return Ok(None);
        };

        if discrepancy.recomputed_quantity < 0 {
            return Err(CoreError::InsufficientStock {
                product: product.name,
                available: 0,
                requested: -discrepancy.recomputed_quantity,
            }
            .into());
        }
        if discrepancy.recomputed_quantity > MAX_STOCK_QUANTITY {
            return Err(CoreError::StockLimitExceeded {
                product: product.name,
                available: product.quantity,
                requested: discrepancy.recomputed_quantity - product.quantity,
            }
            .into());
        }

        sqlx::query("UPDATE products SET quantity = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(product_id)
            .bind(discrepancy.recomputed_quantity)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        warn!(
            product_id,
            from = discrepancy.cached_quantity,
            to = discrepancy.recomputed_quantity,
            "Cached quantity repaired from ledger"
        );
        Ok(Some(discrepancy))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::TimeZone;
    use estoque_core::{MovementType, NewProduct};

    async fn setup() -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = db
            .products()
            .create(
                NewProduct::new("Gloves", "EPI", "pair")
                    .with_quantity(10)
                    .with_min_stock(5),
            )
            .await
            .unwrap();
        (db, product)
    }

    async fn movement_count(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM movements")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_outbound_then_insufficient_stock() {
        let (db, gloves) = setup().await;
        let repo = db.movements();

        let receipt = repo
            .record(NewMovement::outbound(gloves.id, 6, "Ana").with_note("obra 12"))
            .await
            .unwrap();
        assert_eq!(receipt.product.quantity, 4);
        assert_eq!(receipt.movement.kind, MovementType::Outbound);
        assert_eq!(receipt.movement.note.as_deref(), Some("obra 12"));
        assert!(receipt.low_stock_warning());

        let low = db.reports().low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].name, "Gloves");

        let err = repo
            .record(NewMovement::outbound(gloves.id, 10, "Ana"))
            .await
            .unwrap_err();
        match err {
            DbError::Core(CoreError::InsufficientStock {
                product,
                available,
                requested,
            }) => {
                assert_eq!(product, "Gloves");
                assert_eq!(available, 4);
                assert_eq!(requested, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(db.products().get(gloves.id).await.unwrap().quantity, 4);
        assert_eq!(movement_count(&db).await, 1);
    }

    #[tokio::test]
    async fn test_inbound_increases_stock() {
        let (db, gloves) = setup().await;

        let receipt = db
            .movements()
            .record(NewMovement::inbound(gloves.id, 15, "Bruno"))
            .await
            .unwrap();
        assert_eq!(receipt.product.quantity, 25);
        assert!(!receipt.low_stock_warning());
    }

    #[tokio::test]
    async fn test_outbound_may_drain_to_zero() {
        let (db, gloves) = setup().await;

        let receipt = db
            .movements()
            .record(NewMovement::outbound(gloves.id, 10, "Ana"))
            .await
            .unwrap();
        assert_eq!(receipt.product.quantity, 0);
    }

    #[tokio::test]
    async fn test_rejections_write_nothing() {
        let (db, gloves) = setup().await;
        let repo = db.movements();

        let err = repo
            .record(NewMovement::inbound(gloves.id, 0, "Ana"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidQuantity { .. })));

        let err = repo
            .record(NewMovement::outbound(gloves.id, -2, "Ana"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidQuantity { .. })));

        let err = repo
            .record(NewMovement::inbound(gloves.id + 100, 1, "Ana"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::ProductNotFound(_))));

        assert_eq!(movement_count(&db).await, 0);
        assert_eq!(db.products().get(gloves.id).await.unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn test_inbound_cannot_overflow_stock() {
        let (db, gloves) = setup().await;
        let repo = db.movements();

        // Would overflow `quantity + ?2` in SQLite
        let err = repo
            .record(NewMovement::inbound(gloves.id, i64::MAX, "Ana"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidQuantity { .. })));

        // Valid on its own, but 10 + MAX is past the limit
        let err = repo
            .record(NewMovement::inbound(gloves.id, MAX_STOCK_QUANTITY, "Ana"))
            .await
            .unwrap_err();
        match err {
            DbError::Core(CoreError::StockLimitExceeded {
                product,
                available,
                requested,
            }) => {
                assert_eq!(product, "Gloves");
                assert_eq!(available, 10);
                assert_eq!(requested, MAX_STOCK_QUANTITY);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        assert_eq!(movement_count(&db).await, 0);
        assert_eq!(db.products().get(gloves.id).await.unwrap().quantity, 10);

        // Filling exactly to the limit is fine
        let receipt = repo
            .record(NewMovement::inbound(gloves.id, MAX_STOCK_QUANTITY - 10, "Ana"))
            .await
            .unwrap();
        assert_eq!(receipt.product.quantity, MAX_STOCK_QUANTITY);
    }

    #[tokio::test]
    async fn test_history_and_balance() {
        let (db, gloves) = setup().await;
        let repo = db.movements();
        let day = Utc.with_ymd_and_hms(2024, 1, 10, 8, 0, 0).unwrap();

        repo.record(NewMovement::inbound(gloves.id, 5, "Ana").at(day))
            .await
            .unwrap();
        repo.record(NewMovement::outbound(gloves.id, 2, "Ana").at(day + chrono::Duration::hours(1)))
            .await
            .unwrap();
        repo.record(NewMovement::outbound(gloves.id, 1, "Ana").at(day + chrono::Duration::hours(1)))
            .await
            .unwrap();

        let history = repo.for_product(gloves.id).await.unwrap();
        assert_eq!(history.len(), 3);
        // Same timestamp: higher id first
        assert!(history[0].id > history[1].id);
        assert_eq!(history[2].occurred_at, day);

        assert_eq!(repo.ledger_balance(gloves.id).await.unwrap(), 2);

        let recent = repo.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].product_name, "Gloves");
    }

    #[tokio::test]
    async fn test_reconcile_and_repair() {
        let (db, gloves) = setup().await;
        let repo = db.movements();

        repo.record(NewMovement::inbound(gloves.id, 5, "Ana"))
            .await
            .unwrap();
        repo.record(NewMovement::outbound(gloves.id, 3, "Ana"))
            .await
            .unwrap();
        assert!(repo.reconcile().await.unwrap().is_empty());

        // Simulate drift from an out-of-band write
        sqlx::query("UPDATE products SET quantity = 99 WHERE id = ?1")
            .bind(gloves.id)
            .execute(db.pool())
            .await
            .unwrap();

        let drift = repo.reconcile().await.unwrap();
        assert_eq!(drift.len(), 1);
        assert_eq!(drift[0].cached_quantity, 99);
        assert_eq!(drift[0].recomputed_quantity, 12);

        let fixed = repo.repair(gloves.id).await.unwrap().unwrap();
        assert_eq!(fixed.recomputed_quantity, 12);
        assert_eq!(db.products().get(gloves.id).await.unwrap().quantity, 12);
        assert!(repo.repair(gloves.id).await.unwrap().is_none());
        assert!(repo.reconcile().await.unwrap().is_empty());
    }
}

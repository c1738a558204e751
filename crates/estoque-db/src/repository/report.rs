//! # Report Repository
//!
//! Read-only queries behind the dashboard, the movement report, the chart
//! and the stock export. Aggregation that is not plain SQL lives in
//! `estoque_core::report`; this module only loads rows for it.

use chrono::{DateTime, Days, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{MOVEMENT_COLUMNS, MOVEMENT_LINE_COLUMNS, PRODUCT_COLUMNS};
use estoque_core::report::{self, ChartSeries};
use estoque_core::{start_of_day, Money, Movement, MovementFilter, MovementLine, Product, StockSummary};

/// Repository for reporting queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Products with a threshold whose stock is at or below it, by name.
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE min_stock > 0 AND quantity <= min_stock
            ORDER BY name, id
            "#
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Catalog totals. All zero on an empty catalog.
    ///
    /// Summed in Rust with checked arithmetic: a total past i64 cents is
    /// `ValueOverflow`, not an SQLite integer overflow.
    pub async fn dashboard_stats(&self) -> DbResult<StockSummary> {
        let levels: Vec<(i64, i64)> = sqlx::query_as("SELECT quantity, unit_value FROM products")
            .fetch_all(&self.pool)
            .await?;

        let summary = StockSummary::from_levels(
            levels
                .into_iter()
                .map(|(quantity, cents)| (quantity, Money::from_cents(cents))),
        )?;

        debug!(items = summary.item_count, "Dashboard totals computed");
        Ok(summary)
    }

    /// Filtered ledger, newest first (ties broken by id, descending).
    ///
    /// `date_from` starts at midnight UTC; `date_to` runs through the end
    /// of that day.
    pub async fn movement_report(&self, filter: &MovementFilter) -> DbResult<Vec<MovementLine>> {
        let (from, until) = filter.time_bounds()?;

        let sql = format!(
            r#"
            SELECT {MOVEMENT_LINE_COLUMNS}
            FROM movements m
            INNER JOIN products p ON p.id = m.product_id
            WHERE (?1 IS NULL OR m.product_id = ?1)
              AND (?2 IS NULL OR m.kind = ?2)
              AND (?3 IS NULL OR m.occurred_at >= ?3)
              AND (?4 IS NULL OR m.occurred_at < ?4)
            ORDER BY m.occurred_at DESC, m.id DESC
            "#
        );

        let lines = sqlx::query_as::<_, MovementLine>(&sql)
            .bind(filter.product_id)
            .bind(filter.kind)
            .bind(from)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = lines.len(), "Movement report");
        Ok(lines)
    }

    /// Daily inbound/outbound totals for the 30 days ending on `now`'s date.
    pub async fn chart_series(&self, now: DateTime<Utc>) -> DbResult<ChartSeries> {
        let today = now.date_naive();
        let from = report::window_start(now);
        let until = today
            .checked_add_days(Days::new(1))
            .map(start_of_day)
            .ok_or_else(|| DbError::Internal(format!("no day after {today}")))?;

        let sql = format!(
            r#"
            SELECT {MOVEMENT_COLUMNS}
            FROM movements
            WHERE occurred_at >= ?1 AND occurred_at < ?2
            "#
        );

        let movements = sqlx::query_as::<_, Movement>(&sql)
            .bind(from)
            .bind(until)
            .fetch_all(&self.pool)
            .await?;

        Ok(report::daily_series(&movements, today))
    }

    /// The stock table as CSV bytes, one row per product in id order.
    pub async fn export_csv(&self) -> DbResult<Vec<u8>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id");

        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        let bytes = report::write_csv(&products)?;
        debug!(rows = products.len(), bytes = bytes.len(), "Stock exported");
        Ok(bytes)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

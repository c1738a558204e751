//! # Report Builders
//!
//! Pure aggregation over rows the repositories have already loaded.
//!
//! ## Chart Window
//! ```text
//!   today - 29                                       today
//!   ┌──────┬──────┬──────┬─── ... ───┬──────┬──────┐
//!   │ 20/09│ 21/09│ 22/09│           │ 18/10│ 19/10│   labels  (DD/MM)
//!   │  in  │  in  │  in  │           │  in  │  in  │   inbound
//!   │  out │  out │  out │           │  out │  out │   outbound
//!   └──────┴──────┴──────┴─── ... ───┴──────┴──────┘
//!   oldest first, 30 UTC calendar days, empty days are 0/0
//! ```
//!
//! ## CSV Export
//! One row per product in id order. Numbers use `.` and no grouping so the
//! file opens the same way in any spreadsheet locale.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{start_of_day, Movement, MovementType, Product};

/// Days covered by the movement chart, today included.
pub const CHART_WINDOW_DAYS: usize = 30;

/// Label format for chart days.
pub const CHART_LABEL_FORMAT: &str = "%d/%m";

/// Column headers of the stock export.
pub const CSV_HEADERS: [&str; 8] = [
    "ID",
    "Name",
    "Category",
    "Contract",
    "Quantity",
    "Min Stock",
    "Unit Value",
    "Total Value",
];

// =============================================================================
// Chart
// =============================================================================

/// Daily inbound/outbound totals, oldest day first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub days: Vec<NaiveDate>,
    pub labels: Vec<String>,
    pub inbound: Vec<i64>,
    pub outbound: Vec<i64>,
}

/// First day of the chart window ending on `today`.
#[inline]
pub fn window_first_day(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(CHART_WINDOW_DAYS as u64 - 1))
        .unwrap_or(NaiveDate::MIN)
}

/// Timestamp from which the repository loads movements for the chart.
#[inline]
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(window_first_day(now.date_naive()))
}

/// Buckets movements into the 30 days ending on `today`.
///
/// Movements outside the window are ignored.
pub fn daily_series<'a, I>(movements: I, today: NaiveDate) -> ChartSeries
where
    I: IntoIterator<Item = &'a Movement>,
{
    let first = window_first_day(today);
    let days: Vec<NaiveDate> = first.iter_days().take(CHART_WINDOW_DAYS).collect();

    let mut inbound = vec![0i64; days.len()];
    let mut outbound = vec![0i64; days.len()];

    for movement in movements {
        let day = movement.occurred_at.date_naive();
        if day < first || day > today {
            continue;
        }
        let idx = (day - first).num_days() as usize;
        match movement.kind {
            MovementType::Inbound => inbound[idx] += movement.quantity,
            MovementType::Outbound => outbound[idx] += movement.quantity,
        }
    }

    ChartSeries {
        labels: days
            .iter()
            .map(|d| d.format(CHART_LABEL_FORMAT).to_string())
            .collect(),
        days,
        inbound,
        outbound,
    }
}

// =============================================================================
// CSV Export
// =============================================================================

#[derive(Debug, Serialize)]
struct StockRow<'a> {
    id: i64,
    name: &'a str,
    category: &'a str,
    contract: Option<&'a str>,
    quantity: i64,
    min_stock: i64,
    unit_value: String,
    total_value: String,
}

impl<'a> TryFrom<&'a Product> for StockRow<'a> {
    type Error = CoreError;

    fn try_from(product: &'a Product) -> CoreResult<Self> {
        Ok(StockRow {
            id: product.id,
            name: &product.name,
            category: &product.category,
            contract: product.contract.as_deref(),
            quantity: product.quantity,
            min_stock: product.min_stock,
            unit_value: product.unit_value.to_string(),
            total_value: product.stock_value()?.to_string(),
        })
    }
}

/// Serializes the stock table to CSV bytes.
///
/// Rows come out in id order whatever order `products` is in. The header is
/// written even when there are no products.
///
/// ```rust
/// use chrono::Utc;
/// use estoque_core::{report::write_csv, Money, Product};
///
/// let bolt = Product {
///     id: 1, name: "Bolt".into(), category: "Hardware".into(), contract: None,
///     unit: "unit".into(), quantity: 100, initial_quantity: 100,
///     unit_value: Money::from_cents(150), min_stock: 0,
///     created_at: Utc::now(), updated_at: Utc::now(),
/// };
/// let csv = String::from_utf8(write_csv(&[bolt]).unwrap()).unwrap();
/// assert!(csv.ends_with("1,Bolt,Hardware,,100,0,1.50,150.00\n"));
/// ```
pub fn write_csv(products: &[Product]) -> CoreResult<Vec<u8>> {
    let mut ordered: Vec<&Product> = products.iter().collect();
    ordered.sort_by_key(|p| p.id);

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for product in ordered {
        writer.serialize(StockRow::try_from(product)?)?;
    }

    writer
        .into_inner()
        .map_err(|e| CoreError::Export(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use chrono::TimeZone;

    fn movement(id: i64, kind: MovementType, quantity: i64, at: DateTime<Utc>) -> Movement {
        Movement {
            id,
            product_id: 1,
            kind,
            quantity,
            occurred_at: at,
            responsible: "Ana".to_string(),
            note: None,
        }
    }

    fn product(id: i64, name: &str, quantity: i64, cents: i64, contract: Option<&str>) -> Product {
        Product {
            id,
            name: name.to_string(),
            category: "Hardware".to_string(),
            contract: contract.map(str::to_string),
            unit: "unit".to_string(),
            quantity,
            initial_quantity: quantity,
            unit_value: Money::from_cents(cents),
            min_stock: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_window_has_thirty_days_ending_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let series = daily_series(std::iter::empty(), today);

        assert_eq!(series.labels.len(), CHART_WINDOW_DAYS);
        // 2024 is a leap year: 29 days back from 1 March is 1 February
        assert_eq!(series.labels.first().unwrap(), "01/02");
        assert_eq!(series.labels.last().unwrap(), "01/03");
        assert_eq!(*series.days.last().unwrap(), today);
        assert!(series.inbound.iter().all(|&q| q == 0));
        assert!(series.outbound.iter().all(|&q| q == 0));
    }

    #[test]
    fn test_same_day_movements_split_by_type() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        let day = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        let movements = vec![
            movement(1, MovementType::Inbound, 5, day),
            movement(2, MovementType::Outbound, 2, day + chrono::Duration::hours(8)),
        ];

        let series = daily_series(&movements, today);
        let idx = series.labels.iter().position(|l| l == "15/01").unwrap();

        assert_eq!(series.inbound[idx], 5);
        assert_eq!(series.outbound[idx], 2);
        assert_eq!(series.inbound.iter().sum::<i64>(), 5);
        assert_eq!(series.outbound.iter().sum::<i64>(), 2);
    }

    #[test]
    fn test_out_of_window_movements_are_ignored() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let movements = vec![
            movement(1, MovementType::Inbound, 7, Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap()),
            movement(2, MovementType::Inbound, 3, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()),
            movement(3, MovementType::Inbound, 9, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
        ];

        let series = daily_series(&movements, today);
        assert_eq!(series.labels[0], "02/01");
        assert_eq!(series.inbound[0], 3);
        assert_eq!(series.inbound.iter().sum::<i64>(), 3);
    }

    #[test]
    fn test_window_start_is_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap();
        assert_eq!(window_start(now).to_rfc3339(), "2024-02-01T00:00:00+00:00");
    }

    #[test]
    fn test_csv_bolt_total_value() {
        let bytes = write_csv(&[product(1, "Bolt", 100, 150, None)]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "ID,Name,Category,Contract,Quantity,Min Stock,Unit Value,Total Value"
        );
        assert_eq!(lines.next().unwrap(), "1,Bolt,Hardware,,100,0,1.50,150.00");
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_csv_orders_by_id_and_quotes() {
        let products = vec![
            product(3, "Nut, hex", 2, 1234567, Some("CT-1")),
            product(1, "Washer", 0, 5, None),
        ];
        let text = String::from_utf8(write_csv(&products).unwrap()).unwrap();
        let rows: Vec<&str> = text.lines().skip(1).collect();

        assert_eq!(rows[0], "1,Washer,Hardware,,0,0,0.05,0.00");
        assert_eq!(rows[1], "3,\"Nut, hex\",Hardware,CT-1,2,0,12345.67,24691.34");
    }

    #[test]
    fn test_csv_rejects_unrepresentable_total() {
        let mut huge = product(1, "Bolt", 2, 0, None);
        huge.unit_value = Money::from_cents(i64::MAX / 2 + 1);

        assert!(matches!(write_csv(&[huge]), Err(CoreError::ValueOverflow(_))));
    }

    #[test]
    fn test_csv_header_only_when_empty() {
        let text = String::from_utf8(write_csv(&[]).unwrap()).unwrap();
        assert_eq!(text, format!("{}\n", CSV_HEADERS.join(",")));
    }
}

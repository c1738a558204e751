//! # Report Commands
//!
//! Dashboard, filtered movement report, 30-day chart and CSV download.
//!
//! ## Money in Reports
//! | Output            | Format          | Example      |
//! |-------------------|-----------------|--------------|
//! | Dashboard machine | `.` decimals    | `1234.56`    |
//! | Dashboard display | locale          | `1.234,56`   |
//! | CSV               | `.` decimals    | `150.00`     |
//! | Chart             | integer units   | `5`          |

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

use crate::commands::movement::MovementDto;
use crate::commands::product::ProductDto;
use crate::error::ApiResult;
use crate::forms::ReportFilterForm;
use crate::state::AppState;
use estoque_core::validation::DATE_FORMAT;
use estoque_core::ChartSeries;

/// MIME type of the stock export.
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Dashboard cards plus the low-stock table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDto {
    pub item_count: i64,
    pub total_units: i64,
    pub total_stock_value: String,
    pub total_stock_value_display: String,
    pub low_stock: Vec<ProductDto>,
}

/// Chart payload. Field names are what the chart script reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartDto {
    pub labels: Vec<String>,
    pub entradas: Vec<i64>,
    pub saidas: Vec<i64>,
}

impl From<ChartSeries> for ChartDto {
    fn from(series: ChartSeries) -> Self {
        ChartDto {
            labels: series.labels,
            entradas: series.inbound,
            saidas: series.outbound,
        }
    }
}

/// A file the handler sends as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDownload {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl CsvDownload {
    /// Names the file `estoque_<YYYY-MM-DD>.csv` after `day`.
    pub fn new(body: Vec<u8>, day: NaiveDate) -> Self {
        CsvDownload {
            filename: format!("estoque_{}.csv", day.format(DATE_FORMAT)),
            content_type: CSV_CONTENT_TYPE,
            body,
        }
    }

    /// Value for the `Content-Disposition` header.
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename={}", self.filename)
    }
}

pub async fn dashboard(state: &AppState) -> ApiResult<DashboardDto> {
    let start = Instant::now();
    let locale = state.locale();
    let reports = state.db().reports();

    let stats = reports.dashboard_stats().await?;
    let low_stock = reports.low_stock().await?;

    let dto = DashboardDto {
        item_count: stats.item_count,
        total_units: stats.total_units,
        total_stock_value: stats.total_stock_value.to_string(),
        total_stock_value_display: locale.format_money(stats.total_stock_value),
        low_stock: low_stock
            .into_iter()
            .map(|p| ProductDto::new(p, locale))
            .collect::<ApiResult<_>>()?,
    };

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        items = dto.item_count,
        low_stock = dto.low_stock.len(),
        "dashboard complete"
    );

    Ok(dto)
}

/// Filtered movements, newest first.
pub async fn movement_report(state: &AppState, form: ReportFilterForm) -> ApiResult<Vec<MovementDto>> {
    let start = Instant::now();
    let filter = form.into_filter()?;

    debug!(filter = ?filter, "movement_report command");

    let lines = state.db().reports().movement_report(&filter).await?;
    let dtos: Vec<MovementDto> = lines.into_iter().map(MovementDto::from).collect();

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = dtos.len(),
        "movement_report complete"
    );

    Ok(dtos)
}

/// Daily totals for the 30 days ending today.
pub async fn chart_data(state: &AppState) -> ApiResult<ChartDto> {
    chart_data_at(state, Utc::now()).await
}

/// Daily totals for the 30 days ending on `now`'s date.
pub async fn chart_data_at(state: &AppState, now: DateTime<Utc>) -> ApiResult<ChartDto> {
    let series = state.db().reports().chart_series(now).await?;
    Ok(ChartDto::from(series))
}

/// The stock table as a CSV attachment named after today's date.
pub async fn export_csv(state: &AppState) -> ApiResult<CsvDownload> {
    let body = state.db().reports().export_csv().await?;
    let download = CsvDownload::new(body, Utc::now().date_naive());

    info!(
        filename = %download.filename,
        bytes = download.body.len(),
        "export_csv complete"
    );

    Ok(download)
}

//! # Movement Commands
//!
//! Recording movements and reading them back.
//!
//! ## Record Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  MovementForm (strings)                                                 │
//! │       │                                                                 │
//! │       ▼  forms::MovementForm::into_new_movement                         │
//! │  NewMovement ── bad qty/type ──► INVALID_QUANTITY / VALIDATION_ERROR    │
//! │       │                                                                 │
//! │       ▼  MovementRepository::record (one transaction)                   │
//! │  MovementReceipt ── too little stock ──► INSUFFICIENT_STOCK             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  MovementOutcome { movement, product, lowStockWarning }                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info};

use crate::commands::product::ProductDto;
use crate::error::ApiResult;
use crate::forms::MovementForm;
use crate::state::AppState;
use estoque_core::{Movement, MovementLine, MovementType, RECENT_MOVEMENTS_LIMIT};

/// Timestamp format for tables.
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Label shown to users for a movement direction.
pub fn kind_label(kind: MovementType) -> &'static str {
    match kind {
        MovementType::Inbound => "Entrada",
        MovementType::Outbound => "Saída",
    }
}

/// One ledger row as shown in tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementDto {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub kind: MovementType,
    pub kind_label: String,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
    pub occurred_at_display: String,
    pub responsible: String,
    pub note: Option<String>,
}

impl MovementDto {
    /// Builds the row for a movement whose product name is already known.
    pub fn from_movement(movement: Movement, product_name: impl Into<String>) -> Self {
        MovementDto {
            id: movement.id,
            product_id: movement.product_id,
            product_name: product_name.into(),
            kind: movement.kind,
            kind_label: kind_label(movement.kind).to_string(),
            quantity: movement.quantity,
            occurred_at: movement.occurred_at,
            occurred_at_display: movement.occurred_at.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
            responsible: movement.responsible,
            note: movement.note,
        }
    }
}

impl From<MovementLine> for MovementDto {
    fn from(line: MovementLine) -> Self {
        MovementDto {
            id: line.id,
            product_id: line.product_id,
            product_name: line.product_name,
            kind: line.kind,
            kind_label: kind_label(line.kind).to_string(),
            quantity: line.quantity,
            occurred_at: line.occurred_at,
            occurred_at_display: line.occurred_at.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
            responsible: line.responsible,
            note: line.note,
        }
    }
}

/// Result of a committed movement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementOutcome {
    pub movement: MovementDto,
    /// The product after the movement.
    pub product: ProductDto,
    /// Stock is now at or below the product's minimum.
    pub low_stock_warning: bool,
}

/// Records an inbound or outbound movement from the movement form.
///
/// ## Returns
/// * `INVALID_QUANTITY` - quantity is not a positive whole number, or the
///   inbound would push stock past the limit; nothing written
/// * `VALIDATION_ERROR` - unknown type, blank responsible, bad product id
/// * `NOT_FOUND` - product does not exist
/// * `INSUFFICIENT_STOCK` - outbound larger than current stock; nothing written
pub async fn record_movement(state: &AppState, form: MovementForm) -> ApiResult<MovementOutcome> {
    let start = Instant::now();
    let input = form.into_new_movement()?;

    debug!(
        product_id = input.product_id,
        kind = %input.kind,
        quantity = input.quantity,
        "record_movement command"
    );

    let receipt = state.db().movements().record(input).await?;
    let low_stock_warning = receipt.low_stock_warning();
    let product_name = receipt.product.name.clone();

    let outcome = MovementOutcome {
        movement: MovementDto::from_movement(receipt.movement, product_name),
        product: ProductDto::new(receipt.product, state.locale())?,
        low_stock_warning,
    };

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        movement_id = outcome.movement.id,
        low_stock = low_stock_warning,
        "record_movement complete"
    );

    Ok(outcome)
}

/// The latest movements across all products, newest first.
pub async fn recent_movements(state: &AppState) -> ApiResult<Vec<MovementDto>> {
    let lines = state.db().movements().recent(RECENT_MOVEMENTS_LIMIT).await?;
    Ok(lines.into_iter().map(MovementDto::from).collect())
}

/// Full history of one product, newest first.
pub async fn product_history(state: &AppState, product_id: i64) -> ApiResult<Vec<MovementDto>> {
    debug!(product_id, "product_history command");

    let product = state.db().products().get(product_id).await?;
    let movements = state.db().movements().for_product(product_id).await?;

    Ok(movements
        .into_iter()
        .map(|m| MovementDto::from_movement(m, product.name.as_str()))
        .collect())
}

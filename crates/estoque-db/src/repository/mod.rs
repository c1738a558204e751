//! # Repository Module
//!
//! Database repository implementations for the stock ledger.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  estoque-api command                                                   │
//! │       │                                                                 │
//! │       │  db.movements().record(new_movement)                           │
//! │       ▼                                                                 │
//! │  ProductRepository     create, update, delete, list, categories        │
//! │  MovementRepository    record (engine), history, reconcile             │
//! │  ReportRepository      low stock, dashboard, filters, chart, CSV       │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product catalog
//! - [`MovementRepository`](movement::MovementRepository) - Ledger and mutation engine
//! - [`ReportRepository`](report::ReportRepository) - Read-only reporting

pub mod movement;
pub mod product;
pub mod report;

/// Column list matching `estoque_core::Product`'s `FromRow` fields.
pub(crate) const PRODUCT_COLUMNS: &str = "id, name, category, contract, unit, quantity, \
     initial_quantity, unit_value, min_stock, created_at, updated_at";

/// Column list matching `estoque_core::Movement`'s `FromRow` fields.
pub(crate) const MOVEMENT_COLUMNS: &str =
    "id, product_id, kind, quantity, occurred_at, responsible, note";

/// Joined column list matching `estoque_core::MovementLine`.
pub(crate) const MOVEMENT_LINE_COLUMNS: &str = "m.id, m.product_id, p.name AS product_name, \
     m.kind, m.quantity, m.occurred_at, m.responsible, m.note";

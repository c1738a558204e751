//! # estoque-core: Pure Stock Ledger Logic
//!
//! This crate holds the business rules of the stock ledger as pure functions
//! with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Estoque Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Web layer (routing, sessions, templates)           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ raw form fields                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    estoque-api commands                         │   │
//! │  │    create_product, record_movement, dashboard, export_csv      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ estoque-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  ledger   │  │  report   │  │   │
//! │  │   │  Product  │  │   Money   │  │   apply   │  │   chart   │  │   │
//! │  │   │ Movement  │  │  parse    │  │ reconcile │  │    csv    │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  estoque-db (Database Layer)                    │   │
//! │  │        SQLite catalog, movement ledger, reports, migrations     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Movement, filters, receipts)
//! - [`money`] - Integer-cent money with input parsing and display formatting
//! - [`ledger`] - Stock arithmetic and reconciliation
//! - [`report`] - Chart bucketing and CSV export
//! - [`validation`] - Business rule validation and raw-field parsing
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use estoque_core::{ledger, Money, MovementType};
//!
//! let unit_value = Money::parse("unit_value", "1,50").unwrap();
//! assert_eq!(unit_value.checked_multiply_quantity(100).unwrap().to_string(), "150.00");
//!
//! let stock = ledger::apply("Gloves", 10, MovementType::Outbound, 6).unwrap();
//! assert_eq!(stock, 4);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use estoque_core::Money` instead of
// `use estoque_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use report::{ChartSeries, CHART_WINDOW_DAYS};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Movements shown on the movement page.
pub const RECENT_MOVEMENTS_LIMIT: i64 = 10;

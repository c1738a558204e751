//! # estoque-db: Database Layer for the Stock Ledger
//!
//! This crate provides database access for the stock ledger.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Estoque Data Flow                                │
//! │                                                                         │
//! │  estoque-api command (record_movement)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    estoque-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ MovementRepo  │    │ 001_initial  │  │   │
//! │  │   │ WAL, FKs on   │    │ ReportRepo    │    │   _schema    │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                  $DATABASE_DIR/database.db                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Catalog, ledger and reporting repositories
//!
//! ## Usage
//!
//! ```rust,ignore
//! use estoque_db::{Database, DbConfig};
//! use estoque_core::{NewMovement, NewProduct};
//!
//! let db = Database::new(DbConfig::in_dir("./data")).await?;
//!
//! let gloves = db.products().create(NewProduct::new("Gloves", "EPI", "pair").with_quantity(10)).await?;
//! let receipt = db.movements().record(NewMovement::outbound(gloves.id, 6, "Ana")).await?;
//! assert_eq!(receipt.product.quantity, 4);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig, DATABASE_FILE_NAME};

// Repository re-exports for convenience
pub use repository::movement::MovementRepository;
pub use repository::product::ProductRepository;
pub use repository::report::ReportRepository;

/// Installs the fmt subscriber used by the maintenance binaries.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_cli_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,estoque=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

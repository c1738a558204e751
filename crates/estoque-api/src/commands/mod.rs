//! # Commands Module
//!
//! Every operation a front end can call.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── product.rs   ◄─── Catalog CRUD, filtered list
//! ├── movement.rs  ◄─── Record movements, recent/history
//! └── report.rs    ◄─── Dashboard, movement report, chart, CSV
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Command Flow                                         │
//! │                                                                         │
//! │  Web handler                                                            │
//! │  ───────────                                                            │
//! │  POST /movimentacoes  product_id=3&type=Saída&quantity=6&...           │
//! │         │                                                               │
//! │         │ (framework deserializes the body into MovementForm)          │
//! │         ▼                                                               │
//! │  Rust Backend                                                           │
//! │  ────────────                                                           │
//! │  async fn record_movement(                                              │
//! │      state: &AppState,        ◄── Shared by the framework              │
//! │      form: MovementForm,      ◄── Raw strings                          │
//! │  ) -> Result<MovementOutcome, ApiError>                                 │
//! │         │                                                               │
//! │         │ (serde_json or a template)                                   │
//! │         ▼                                                               │
//! │  Handler renders MovementOutcome or flashes ApiError.message           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands never panic on user input. Every failure is an [`ApiError`]
//! carrying a machine code.
//!
//! [`ApiError`]: crate::error::ApiError

pub mod movement;
pub mod product;
pub mod report;

// Re-export DTOs for convenience
pub use movement::{MovementDto, MovementOutcome};
pub use product::{DeleteOutcome, ProductDto, ProductListDto};
pub use report::{ChartDto, CsvDownload, DashboardDto};

//! # estoque-api: Boundary Layer
//!
//! The crate a web front end links against. It turns raw form strings into
//! typed inputs, calls the repositories in `estoque-db`, and hands back
//! serializable DTOs or an [`ApiError`].
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Web front end                                    │
//! │          (routes, templates, sessions, flash messages)                  │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//!                                 │ &AppState + *Form
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         estoque-api                                     │
//! │  forms ──► commands::{product, movement, report} ──► DTOs / ApiError    │
//! │  auth::login (Authenticator)   config::AppConfig   telemetry            │
//! └───────────────────────────────┬─────────────────────────────────────────┘
//!                                 ▼
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │             estoque-db (SQLite)  ──►  estoque-core (rules)              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup
//! ```rust,ignore
//! estoque_api::telemetry::init_tracing(estoque_api::telemetry::DEFAULT_LOG_FILTER);
//! let config = AppConfig::load()?;
//! let state = AppState::open(config).await?;
//! ```

pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod forms;
pub mod state;
pub mod telemetry;

pub use auth::{login, Authenticator, SessionUser, StaticCredentials};
pub use config::{AppConfig, ConfigError, DisplayLocale};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use forms::{MovementForm, ProductFilterForm, ProductForm, ReportFilterForm};
pub use state::AppState;

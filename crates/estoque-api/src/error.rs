//! # API Error Type
//!
//! Unified error type for boundary commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow                                           │
//! │                                                                         │
//! │  Web handler                 Rust Backend                               │
//! │  ───────────                 ────────────                               │
//! │                                                                         │
//! │  POST /movimentacao                                                     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  commands::movement::record_movement                             │  │
//! │  │  Result<MovementOutcome, ApiError>                               │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Bad form field?  ─── CoreError::InvalidQuantity ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Ledger rule?     ─── DbError::Core(..) ─────── ApiError ──────►│  │
//! │  │         │                                          ▲            │  │
//! │  │         ▼                                          │            │  │
//! │  │  SQLite failure?  ─── DbError::QueryFailed ────────┘ (logged,   │  │
//! │  │                                                generic message) │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Handler flashes `message`, branches on `code`                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use estoque_core::CoreError;
use estoque_db::DbError;
use serde::Serialize;

use crate::config::ConfigError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_STOCK",
///   "message": "Insufficient stock for Gloves: available 4, requested 10"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Product name already taken (409)
    DuplicateName,

    /// Outbound movement larger than stock (422)
    InsufficientStock,

    /// Quantity is not a positive whole number, or is past the stock limit (400)
    InvalidQuantity,

    /// Input validation failed (400)
    ValidationError,

    /// Bad credentials (401)
    Unauthorized,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an unauthorized error.
    pub fn unauthorized() -> Self {
        ApiError::new(ErrorCode::Unauthorized, "Invalid username or password")
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Core(e) => ApiError::from(e),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::CheckViolation { message } => {
                tracing::error!("Check constraint violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Value out of range")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database is busy, try again")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::ProductNotFound(_) => ApiError::new(ErrorCode::NotFound, message),
            CoreError::DuplicateName(_) => ApiError::new(ErrorCode::DuplicateName, message),
            CoreError::InsufficientStock { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, message)
            }
            CoreError::InvalidQuantity { .. } | CoreError::StockLimitExceeded { .. } => {
                ApiError::new(ErrorCode::InvalidQuantity, message)
            }
            CoreError::ValueOverflow(_) => ApiError::validation(message),
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
            CoreError::Export(e) => {
                tracing::error!("Export failed: {}", e);
                ApiError::internal("Export failed")
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!("Configuration error: {}", err);
        ApiError::internal(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for commands.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use estoque_core::ValidationError;

    #[test]
    fn test_core_error_codes() {
        let cases = [
            (CoreError::ProductNotFound(3), ErrorCode::NotFound),
            (CoreError::DuplicateName("Gloves".into()), ErrorCode::DuplicateName),
            (
                CoreError::InsufficientStock {
                    product: "Gloves".into(),
                    available: 4,
                    requested: 10,
                },
                ErrorCode::InsufficientStock,
            ),
            (CoreError::invalid_quantity("quantity", "0"), ErrorCode::InvalidQuantity),
            (
                CoreError::StockLimitExceeded {
                    product: "Gloves".into(),
                    available: 10,
                    requested: 100_000_000,
                },
                ErrorCode::InvalidQuantity,
            ),
            (
                CoreError::ValueOverflow("Total stock value".into()),
                ErrorCode::ValidationError,
            ),
            (
                CoreError::Validation(ValidationError::Required {
                    field: "name".into(),
                }),
                ErrorCode::ValidationError,
            ),
        ];

        for (err, code) in cases {
            assert_eq!(ApiError::from(err).code, code);
        }
    }

    #[test]
    fn test_db_error_hides_details() {
        let err = ApiError::from(DbError::QueryFailed("near \"SELCT\": syntax error".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("SELCT"));

        let err = ApiError::from(DbError::product_not_found(9));
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ApiError::unauthorized()).unwrap();
        assert_eq!(json["code"], "UNAUTHORIZED");
        assert_eq!(json["message"], "Invalid username or password");
    }
}

//! # Application State
//!
//! What every command needs: the database, the display locale and the
//! credential check.
//!
//! ## Thread Safety
//! `Database` wraps a `SqlitePool`, which is already safe to share. The
//! authenticator sits behind an `Arc<dyn Authenticator>`. A web framework can
//! keep one `AppState` (or an `Arc` of it) and hand `&AppState` to commands
//! running concurrently, without extra locking.
//!
//! ## Usage in Handlers
//! ```rust,ignore
//! async fn movement_page(state: &AppState, form: MovementForm) -> Result<MovementOutcome, ApiError> {
//!     commands::movement::record_movement(state, form).await
//! }
//! ```

use std::sync::Arc;

use estoque_db::{Database, DbConfig};
use tracing::info;

use crate::auth::{Authenticator, StaticCredentials};
use crate::config::{AppConfig, DisplayLocale};
use crate::error::ApiResult;

pub struct AppState {
    db: Database,
    config: AppConfig,
    authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    /// Wraps an open database. Login uses the configured credential pair.
    pub fn new(db: Database, config: AppConfig) -> Self {
        let authenticator = Arc::new(StaticCredentials::new(
            config.username.clone(),
            config.password.clone(),
        ));
        AppState {
            db,
            config,
            authenticator,
        }
    }

    /// Opens (and migrates) `database.db` under the configured directory.
    pub async fn open(config: AppConfig) -> ApiResult<Self> {
        let db_config =
            DbConfig::in_dir(&config.database_dir).max_connections(config.db_max_connections);
        let db = Database::new(db_config).await?;

        info!(
            dir = %config.database_dir.display(),
            max_connections = config.db_max_connections,
            "Application state ready"
        );

        Ok(AppState::new(db, config))
    }

    /// Replaces the credential check.
    pub fn with_authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = authenticator;
        self
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn locale(&self) -> DisplayLocale {
        self.config.locale
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db", &self.db)
            .field("database_dir", &self.config.database_dir)
            .field("locale", &self.config.locale)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) async fn test_state() -> AppState {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    AppState::new(db, AppConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::login;

    #[tokio::test]
    async fn test_open_creates_database_file() {
        let dir = tempfile::tempdir().unwrap();

        let config = AppConfig {
            database_dir: dir.path().to_path_buf(),
            ..AppConfig::default()
        };
        let state = AppState::open(config).await.unwrap();
        assert!(state.db().health_check().await);
        assert!(dir.path().join(estoque_db::DATABASE_FILE_NAME).exists());

        state.db().close().await;
    }

    #[tokio::test]
    async fn test_default_authenticator_uses_config() {
        let state = test_state().await;

        assert!(login(state.authenticator(), "admin", "admin").is_ok());
        assert!(login(state.authenticator(), "admin", "nope").is_err());

        let state = state.with_authenticator(Arc::new(StaticCredentials::new("almox", "x")));
        assert!(login(state.authenticator(), "admin", "admin").is_err());
        assert!(login(state.authenticator(), "almox", "x").is_ok());
    }
}

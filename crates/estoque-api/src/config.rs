//! Application configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use estoque_core::Money;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Separators used for money display strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayLocale {
    pub decimal_separator: char,
    /// `None` disables grouping.
    pub thousands_separator: Option<char>,
}

impl Default for DisplayLocale {
    /// `1.234,56`
    fn default() -> Self {
        DisplayLocale {
            decimal_separator: ',',
            thousands_separator: Some('.'),
        }
    }
}

impl DisplayLocale {
    /// Display string for a money value. Never used for CSV or JSON numbers.
    pub fn format_money(&self, value: Money) -> String {
        value.format_localized(self.decimal_separator, self.thousands_separator)
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding `database.db`
    pub database_dir: PathBuf,

    /// Pool size
    pub db_max_connections: u32,

    /// Login accepted by the default authenticator
    pub username: String,

    /// Password accepted by the default authenticator
    pub password: String,

    /// Money display format
    pub locale: DisplayLocale,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_dir: PathBuf::from("."),
            db_max_connections: 5,
            username: "admin".to_string(),
            password: "admin".to_string(),
            locale: DisplayLocale::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        AppConfig::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup (the environment, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AppConfig::default();

        let db_max_connections = match lookup("ESTOQUE_DB_MAX_CONNECTIONS") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidValue("ESTOQUE_DB_MAX_CONNECTIONS".to_string()))?,
            None => defaults.db_max_connections,
        };

        let decimal_separator = match lookup("ESTOQUE_DECIMAL_SEPARATOR") {
            Some(raw) => single_char(&raw)
                .ok_or_else(|| ConfigError::InvalidValue("ESTOQUE_DECIMAL_SEPARATOR".to_string()))?,
            None => defaults.locale.decimal_separator,
        };

        // Empty means "no grouping"
        let thousands_separator = match lookup("ESTOQUE_THOUSANDS_SEPARATOR") {
            Some(raw) if raw.is_empty() => None,
            Some(raw) => Some(single_char(&raw).ok_or_else(|| {
                ConfigError::InvalidValue("ESTOQUE_THOUSANDS_SEPARATOR".to_string())
            })?),
            None => defaults.locale.thousands_separator,
        };

        if Some(decimal_separator) == thousands_separator {
            return Err(ConfigError::InvalidValue(
                "ESTOQUE_THOUSANDS_SEPARATOR".to_string(),
            ));
        }

        let config = AppConfig {
            database_dir: lookup("DATABASE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_dir),
            db_max_connections,
            username: lookup("ESTOQUE_USERNAME").unwrap_or(defaults.username),
            password: lookup("ESTOQUE_PASSWORD").unwrap_or(defaults.password),
            locale: DisplayLocale {
                decimal_separator,
                thousands_separator,
            },
        };

        if config.username.trim().is_empty() {
            return Err(ConfigError::MissingRequired("ESTOQUE_USERNAME".to_string()));
        }

        Ok(config)
    }
}

fn single_char(raw: &str) -> Option<char> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.locale.decimal_separator, ',');
        assert_eq!(config.locale.thousands_separator, Some('.'));
        assert_eq!(config.locale.format_money(Money::from_cents(123456)), "1.234,56");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("DATABASE_DIR", "/var/lib/estoque"),
            ("ESTOQUE_DB_MAX_CONNECTIONS", "8"),
            ("ESTOQUE_USERNAME", "almox"),
            ("ESTOQUE_PASSWORD", "s3cret"),
            ("ESTOQUE_DECIMAL_SEPARATOR", "."),
            ("ESTOQUE_THOUSANDS_SEPARATOR", ""),
        ])
        .unwrap();

        assert_eq!(config.database_dir, PathBuf::from("/var/lib/estoque"));
        assert_eq!(config.db_max_connections, 8);
        assert_eq!(config.username, "almox");
        assert_eq!(config.locale.decimal_separator, '.');
        assert_eq!(config.locale.thousands_separator, None);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("ESTOQUE_DB_MAX_CONNECTIONS", "many")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("ESTOQUE_DB_MAX_CONNECTIONS", "0")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("ESTOQUE_DECIMAL_SEPARATOR", ",,")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("ESTOQUE_DECIMAL_SEPARATOR", "."), ("ESTOQUE_THOUSANDS_SEPARATOR", ".")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("ESTOQUE_USERNAME", " ")]),
            Err(ConfigError::MissingRequired(_))
        ));
    }
}

//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use babycare_api::ApiSettings;
use babycare_api::directory::DirectoryOrder;

pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

/// Longest accepted session lifetime, in days.
pub const MAX_TOKEN_TTL_DAYS: i64 = 3650;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database file.
    pub db_path: PathBuf,
    /// HS256 signing secret for session tokens.
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub directory_order: DirectoryOrder,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `BABYCARE_HOST` | Bind host | `0.0.0.0` |
    /// | `BABYCARE_PORT` | Bind port | `3000` |
    /// | `BABYCARE_DB_PATH` | SQLite database file | `babycare.db` |
    /// | `BABYCARE_JWT_SECRET` | Token signing secret | `dev-secret-change-me` |
    /// | `BABYCARE_TOKEN_TTL_DAYS` | Session lifetime in days | `30` |
    /// | `BABYCARE_DIRECTORY_ORDER` | `merged` or `rating` | `merged` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = var("BABYCARE_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = var("BABYCARE_PORT").unwrap_or_else(|| "3000".to_string());
        let addr = format!("{}:{}", host, port)
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(format!("{}:{}", host, port)))?;

        let db_path = var("BABYCARE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("babycare.db"));

        let jwt_secret = var("BABYCARE_JWT_SECRET")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEV_JWT_SECRET.to_string());

        let token_ttl = match var("BABYCARE_TOKEN_TTL_DAYS") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|days| (1..=MAX_TOKEN_TTL_DAYS).contains(days))
                .and_then(chrono::Duration::try_days)
                .ok_or(ConfigError::InvalidTokenTtl(raw))?,
            None => chrono::Duration::days(30),
        };

        let directory_order = match var("BABYCARE_DIRECTORY_ORDER") {
            Some(raw) => raw.parse().map_err(ConfigError::InvalidDirectoryOrder)?,
            None => DirectoryOrder::default(),
        };

        Ok(Self {
            addr,
            db_path,
            jwt_secret,
            token_ttl,
            directory_order,
        })
    }

    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            jwt_secret: self.jwt_secret.clone(),
            token_ttl: self.token_ttl,
            directory_order: self.directory_order,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid BABYCARE_HOST/BABYCARE_PORT address: {0}")]
    InvalidAddr(String),

    #[error("BABYCARE_TOKEN_TTL_DAYS must be between 1 and 3650, got '{0}'")]
    InvalidTokenTtl(String),

    #[error("Invalid BABYCARE_DIRECTORY_ORDER: {0}")]
    InvalidDirectoryOrder(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.db_path, PathBuf::from("babycare.db"));
        assert_eq!(config.token_ttl, chrono::Duration::days(30));
        assert_eq!(config.directory_order, DirectoryOrder::Merged);
        assert!(config.uses_dev_secret());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("BABYCARE_HOST", "127.0.0.1"),
            ("BABYCARE_PORT", "8080"),
            ("BABYCARE_JWT_SECRET", "s3cret"),
            ("BABYCARE_TOKEN_TTL_DAYS", "7"),
            ("BABYCARE_DIRECTORY_ORDER", "Rating"),
        ])
        .unwrap();
        assert_eq!(config.addr.port(), 8080);
        assert!(!config.uses_dev_secret());
        assert_eq!(config.api_settings().token_ttl, chrono::Duration::days(7));
        assert_eq!(config.directory_order, DirectoryOrder::Rating);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(load(&[("BABYCARE_PORT", "http")]), Err(ConfigError::InvalidAddr(_))));
        assert!(matches!(
            load(&[("BABYCARE_TOKEN_TTL_DAYS", "0")]),
            Err(ConfigError::InvalidTokenTtl(_))
        ));
        for huge in ["3651", "9223372036854775807"] {
            assert!(matches!(
                load(&[("BABYCARE_TOKEN_TTL_DAYS", huge)]),
                Err(ConfigError::InvalidTokenTtl(_))
            ));
        }
        assert!(matches!(
            load(&[("BABYCARE_DIRECTORY_ORDER", "random")]),
            Err(ConfigError::InvalidDirectoryOrder(_))
        ));
    }
}

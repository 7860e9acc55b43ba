//! Configuration management for taskdeck.
//!
//! Configuration is set via environment variables:
//! - `JWT_SECRET` - Required. Secret for signing access tokens.
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `7000`.
//! - `DATABASE_PATH` - Optional. SQLite file path. Defaults to `./taskdeck.db`.
//! - `STORE` - Optional. Store backend (`sqlite` or `memory`). Defaults to `sqlite`.
//! - `JWT_TTL_DAYS` - Optional. Token lifetime in days. Defaults to `7`.
//! - `CORS_ALLOWED_ORIGINS` - Optional. Comma-separated origin list;
//!   permissive CORS when unset.

use std::path::PathBuf;

use thiserror::Error;

use crate::store::StoreType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Access-token settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret for HS256 signing
    pub secret: String,

    /// Token lifetime in days
    pub ttl_days: i64,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// SQLite database file path (ignored by the memory store)
    pub database_path: PathBuf,

    /// Store backend selection
    pub store: StoreType,

    /// Access-token settings
    pub jwt: JwtConfig,

    /// Allowed CORS origins; `None` means permissive
    pub cors_allowed_origins: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `JWT_SECRET` is not set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;

        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "7000".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("PORT".to_string(), format!("{}", e)))?;

        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./taskdeck.db"));

        let store = std::env::var("STORE")
            .map(|s| StoreType::from_str(&s))
            .unwrap_or_default();

        let ttl_days = std::env::var("JWT_TTL_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse()
            .map_err(|e| ConfigError::InvalidValue("JWT_TTL_DAYS".to_string(), format!("{}", e)))?;

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty());

        Ok(Self {
            host,
            port,
            database_path,
            store,
            jwt: JwtConfig {
                secret,
                ttl_days,
            },
            cors_allowed_origins,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(secret: String, database_path: PathBuf, store: StoreType) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7000,
            database_path,
            store,
            jwt: JwtConfig {
                secret,
                ttl_days: 7,
            },
            cors_allowed_origins: None,
        }
    }
}

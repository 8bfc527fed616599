//! Runtime configuration, loaded from environment variables
//!
//! Only deployment-specific values live here; fixed tunables are in the
//! `constants` module. A `.env` file is honored when present (loaded by
//! `main` before `from_env` runs).

use crate::constants::POLL_INTERVAL_SECS;
use std::time::Duration;

/// Deployment configuration
#[derive(Debug, Clone)]
pub struct Settings {
    /// Connection URL for the durable observation store
    pub database_url: String,
    /// HTTP listening port
    pub port: u16,
    /// Ingestion interval
    pub poll_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite://crypto-stats.db".to_string(),
            port: 3000,
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
        }
    }
}

impl Settings {
    /// Create configuration from environment variables.
    ///
    /// Every variable is optional; missing values fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but unparsable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or(defaults.database_url);
        let port = parse_u16("PORT", std::env::var("PORT").ok(), defaults.port)?;
        let poll_interval_secs = parse_u64(
            "POLL_INTERVAL_SECS",
            std::env::var("POLL_INTERVAL_SECS").ok(),
            defaults.poll_interval.as_secs(),
        )?;

        Ok(Self {
            database_url,
            port,
            poll_interval: Duration::from_secs(poll_interval_secs),
        })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Environment variable is set but cannot be parsed
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

fn parse_u16(key: &str, raw: Option<String>, default: u16) -> Result<u16, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: v,
        }),
    }
}

fn parse_u64(key: &str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: v,
        }),
    }
}

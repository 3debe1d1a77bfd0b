//! Configuration Module
//!
//! Process configuration read from the environment, with an optional
//! `.env` file in the working directory.

use std::time::Duration;

use thiserror::Error;

use crate::database::pool::{PoolConfig, DEFAULT_MAX_CONNECTIONS};
use crate::ladder::LadderConfig;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub pool: PoolConfig,
    pub ladder: LadderConfig,
}

impl Config {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded .env from {}", path.display()),
            Err(e) => tracing::debug!("No .env loaded: {}", e),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let pool = PoolConfig {
            database_url: required("DATABASE_URL")?,
            user: lookup("DATABASE_USER").filter(|v| !v.trim().is_empty()),
            tls: match lookup("DATABASE_TLS") {
                Some(v) => parse_bool("DATABASE_TLS", &v)?,
                None => true,
            },
            max_connections: match lookup("DATABASE_MAX_CONNECTIONS") {
                Some(v) => parse_number("DATABASE_MAX_CONNECTIONS", &v)?,
                None => DEFAULT_MAX_CONNECTIONS,
            },
        };

        let ladder = LadderConfig {
            base_url: required("LADDER_API_URL")?,
            timeout: match lookup("LADDER_API_TIMEOUT_SECS") {
                Some(v) => Some(Duration::from_secs(parse_number(
                    "LADDER_API_TIMEOUT_SECS",
                    &v,
                )?)),
                None => None,
            },
        };

        Ok(Config { pool, ladder })
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

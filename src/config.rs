use crate::app_env;
use anyhow::{Context, anyhow};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Sizing for the database connection pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub idle_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        PoolSettings {
            max_connections: 25,
            min_connections: 5,
            idle_timeout: Duration::from_secs(300),
        }
    }
}

/// Settings the server needs at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub server_port: u16,
    pub request_timeout: Duration,
    pub pool: PoolSettings,
}

impl AppConfig {
    /// Reads configuration from the process environment. Call after loading any .env file.
    pub fn from_env() -> Result<AppConfig, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration using [lookup] to find each variable. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<AppConfig, anyhow::Error> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let database_url = read(app_env::DB_URL)
            .ok_or_else(|| anyhow!("the {} environment variable is required", app_env::DB_URL))?;
        let defaults = PoolSettings::default();

        Ok(AppConfig {
            database_url,
            server_port: parse_or(read(app_env::SERVER_PORT), app_env::SERVER_PORT, 8080)?,
            request_timeout: Duration::from_secs(parse_or(
                read(app_env::REQUEST_TIMEOUT_SECS),
                app_env::REQUEST_TIMEOUT_SECS,
                10,
            )?),
            pool: PoolSettings {
                max_connections: parse_or(
                    read(app_env::DB_MAX_CONNECTIONS),
                    app_env::DB_MAX_CONNECTIONS,
                    defaults.max_connections,
                )?,
                min_connections: parse_or(
                    read(app_env::DB_MIN_CONNECTIONS),
                    app_env::DB_MIN_CONNECTIONS,
                    defaults.min_connections,
                )?,
                idle_timeout: Duration::from_secs(parse_or(
                    read(app_env::DB_IDLE_TIMEOUT_SECS),
                    app_env::DB_IDLE_TIMEOUT_SECS,
                    defaults.idle_timeout.as_secs(),
                )?),
            },
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("reading {key} (got \"{value}\")")),
        None => Ok(default),
    }
}

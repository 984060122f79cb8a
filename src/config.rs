//! Startup settings read from the environment (after `.env` is applied).

use std::{str::FromStr, time::Duration};

use thiserror::Error;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SESSION_HOURS: u64 = 24;
const DEFAULT_PAGE_CACHE_SECS: u64 = 3600;
const DEFAULT_PAGE_CACHE_CAPACITY: usize = 512;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value `{value}`")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// How the admin password is checked.
#[derive(Debug, Clone, PartialEq)]
pub enum AdminCredential {
    /// Shared secret compared as-is.
    Plain(String),
    /// Argon2 PHC string produced by `hash-password`.
    Hashed(String),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_address: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub seed_demo_data: bool,
    pub admin_credential: AdminCredential,
    pub jwt_secret: String,
    pub session_ttl: Duration,
    pub page_cache_ttl: Duration,
    pub page_cache_capacity: usize,
    pub log_format: LogFormat,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let admin_credential = match (non_empty("ADMIN_PASSWORD_HASH"), non_empty("ADMIN_PASSWORD")) {
            (Some(hash), _) => AdminCredential::Hashed(hash),
            (None, Some(password)) => AdminCredential::Plain(password),
            (None, None) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
        };

        let jwt_secret = non_empty("ADMIN_JWT_PASSWORD").ok_or(ConfigError::Missing("ADMIN_JWT_PASSWORD"))?;

        Ok(Self {
            bind_address: non_empty("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
            database_url: non_empty("DATABASE_URL"),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", non_empty("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS)?,
            seed_demo_data: parse_bool("SEED_DEMO_DATA", non_empty("SEED_DEMO_DATA"))?,
            admin_credential,
            jwt_secret,
            session_ttl: session_ttl(non_empty("ADMIN_SESSION_HOURS"))?,
            page_cache_ttl: Duration::from_secs(
                parse_or("PAGE_CACHE_SECONDS", non_empty("PAGE_CACHE_SECONDS"), DEFAULT_PAGE_CACHE_SECS)?,
            ),
            page_cache_capacity: parse_or(
                "PAGE_CACHE_CAPACITY",
                non_empty("PAGE_CACHE_CAPACITY"),
                DEFAULT_PAGE_CACHE_CAPACITY,
            )?,
            log_format: match non_empty("LOG_FORMAT") {
                Some(value) => value
                    .parse()
                    .map_err(|_| ConfigError::Invalid { key: "LOG_FORMAT", value })?,
                None => LogFormat::Compact,
            },
        })
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// Session lifetime in hours; must fit a token expiry timestamp.
fn session_ttl(raw: Option<String>) -> Result<Duration, ConfigError> {
    const KEY: &str = "ADMIN_SESSION_HOURS";
    let hours: u64 = parse_or(KEY, raw.clone(), DEFAULT_SESSION_HOURS)?;

    let seconds = hours
        .checked_mul(3600)
        .and_then(|secs| i64::try_from(secs).ok())
        .filter(|secs| chrono::TimeDelta::try_seconds(*secs).is_some());

    match seconds {
        Some(secs) => Ok(Duration::from_secs(secs.unsigned_abs())),
        None => Err(ConfigError::Invalid {
            key: KEY,
            value: raw.unwrap_or_default(),
        }),
    }
}

fn parse_bool(key: &'static str, raw: Option<String>) -> Result<bool, ConfigError> {
    match raw.as_deref().map(|value| value.trim().to_ascii_lowercase()) {
        None => Ok(false),
        Some(value) => match value.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::Invalid { key, value }),
        },
    }
}

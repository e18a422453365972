use std::{env, fmt::Display, str::FromStr};

use actix_web::cookie::Key;
use log::{info, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub secure_cookies: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup("SECRET_KEY")
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(ConfigError::Missing("SECRET_KEY"))?;

        Ok(Config {
            secret_key,
            database_url: try_load(&lookup, "DATABASE_URL", "blog.db")?,
            host: try_load(&lookup, "HOST", "0.0.0.0")?,
            port: try_load(&lookup, "PORT", "5000")?,
            secure_cookies: try_load(&lookup, "COOKIE_SECURE", "false")?,
        })
    }

    /// Key signing and encrypting the session cookie.
    /// `Key::from` wants 64 bytes, which is the length of a hex SHA-256 digest.
    pub fn session_key(&self) -> Key {
        Key::from(sha256::digest(self.secret_key.as_str()).as_bytes())
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim().parse().map_err(|err: T::Err| {
        warn!("Invalid {key} value: {err}");
        ConfigError::Invalid {
            key,
            reason: err.to_string(),
        }
    })
}

//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// Upper bound for `SESSION_TTL_DAYS`.
pub const MAX_SESSION_TTL_DAYS: i64 = 365;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where the records live.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreBackend {
    /// A single JSON document on disk, the default for a one-chair salon.
    JsonFile(PathBuf),
    Postgres(String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub store: StoreBackend,
    pub log_level: Level,
    pub cors_origin: String,
    pub session_ttl_days: i64,
    pub strict_status_updates: bool,
    pub admin_email: String,
    pub admin_name: String,
    pub admin_phone: String,
    pub admin_password: Option<String>,
    pub openai_api_key: Option<String>,
    pub advice_model: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server and storage ---
        let bind_address_str = var("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let store = match var("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => StoreBackend::Postgres(url),
            None => StoreBackend::JsonFile(
                var("DATA_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("./data/salon.json")),
            ),
        };

        let log_level_str = var("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin =
            var("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:3000".to_string());

        // --- Booking and sessions ---
        let session_ttl_days = match var("SESSION_TTL_DAYS") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(days) if (1..=MAX_SESSION_TTL_DAYS).contains(&days) => days,
                _ => {
                    return Err(ConfigError::InvalidValue(
                        "SESSION_TTL_DAYS".to_string(),
                        format!(
                            "'{}' is not a number of days between 1 and {}",
                            raw, MAX_SESSION_TTL_DAYS
                        ),
                    ))
                }
            },
            None => 30,
        };

        let strict_status_updates = match var("STRICT_STATUS_UPDATES") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "STRICT_STATUS_UPDATES".to_string(),
                    format!("'{}' is not a boolean", raw),
                )
            })?,
            None => true,
        };

        // --- Admin account seeded on first start ---
        let admin_email = var("ADMIN_EMAIL").unwrap_or_else(|| "admin@salon.com".to_string());
        let admin_name = var("ADMIN_NAME").unwrap_or_else(|| "Master Barber".to_string());
        let admin_phone = var("ADMIN_PHONE").unwrap_or_else(|| "11999999999".to_string());
        let admin_password = var("ADMIN_PASSWORD").filter(|p| !p.is_empty());

        // --- Style advice (optional) ---
        let openai_api_key = var("OPENAI_API_KEY").filter(|k| !k.is_empty());
        let advice_model = var("ADVICE_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string());

        Ok(Self {
            bind_address,
            store,
            log_level,
            cors_origin,
            session_ttl_days,
            strict_status_updates,
            admin_email,
            admin_name,
            admin_phone,
            admin_password,
            openai_api_key,
            advice_model,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_use_the_json_store() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(
            config.store,
            StoreBackend::JsonFile(PathBuf::from("./data/salon.json"))
        );
        assert_eq!(config.session_ttl_days, 30);
        assert!(config.strict_status_updates);
        assert!(config.admin_password.is_none());
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn database_url_selects_postgres() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/salon")]).unwrap();
        assert_eq!(
            config.store,
            StoreBackend::Postgres("postgres://localhost/salon".to_string())
        );
    }

    #[test]
    fn invalid_values_are_reported() {
        assert!(matches!(
            config_from(&[("BIND_ADDRESS", "nowhere")]),
            Err(ConfigError::InvalidValue(ref var, _)) if var == "BIND_ADDRESS"
        ));
        assert!(matches!(
            config_from(&[("SESSION_TTL_DAYS", "0")]),
            Err(ConfigError::InvalidValue(ref var, _)) if var == "SESSION_TTL_DAYS"
        ));
        assert!(matches!(
            config_from(&[("STRICT_STATUS_UPDATES", "maybe")]),
            Err(ConfigError::InvalidValue(ref var, _)) if var == "STRICT_STATUS_UPDATES"
        ));
    }

    #[test]
    fn session_lifetime_is_capped() {
        assert!(matches!(
            config_from(&[("SESSION_TTL_DAYS", "100000000")]),
            Err(ConfigError::InvalidValue(ref var, _)) if var == "SESSION_TTL_DAYS"
        ));
        assert!(matches!(
            config_from(&[("SESSION_TTL_DAYS", "366")]),
            Err(ConfigError::InvalidValue(_, _))
        ));
        let config = config_from(&[("SESSION_TTL_DAYS", "365")]).unwrap();
        assert_eq!(config.session_ttl_days, MAX_SESSION_TTL_DAYS);
    }

    #[test]
    fn lenient_status_updates_can_be_enabled() {
        let config = config_from(&[("STRICT_STATUS_UPDATES", "off")]).unwrap();
        assert!(!config.strict_status_updates);
    }
}

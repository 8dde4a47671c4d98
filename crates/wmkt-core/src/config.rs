use crate::app_config::{AppConfig, Credentials, Environment};
use crate::ConfigError;

pub const DEFAULT_AUTH_URL: &str = "https://marketplace.walmartapis.com/v3/token";
pub const DEFAULT_BASE_URL: &str = "https://marketplace.walmartapis.com/v3";
pub const DEFAULT_SERVICE_NAME: &str = "Walmart Marketplace";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can pass a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        let value = lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))?;
        if value.trim().is_empty() {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(value)
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let client_id = require("WALMART_CLIENT_ID")?;
    let client_secret = require("WALMART_CLIENT_SECRET")?;

    let auth_url = or_default("WALMART_AUTH_URL", DEFAULT_AUTH_URL);
    let base_url = or_default("WALMART_BASE_URL", DEFAULT_BASE_URL);
    let service_name = or_default("WALMART_SERVICE_NAME", DEFAULT_SERVICE_NAME);
    let channel_type = lookup("WALMART_CHANNEL_TYPE")
        .ok()
        .filter(|v| !v.trim().is_empty());

    let env = parse_environment(&or_default("WMKT_ENV", "development"))?;
    let log_level = or_default("WMKT_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("WMKT_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("WMKT_USER_AGENT", "wmkt/0.1 (seller-operations)");

    let feed_poll_max_attempts = parse_u32("WMKT_FEED_POLL_MAX_ATTEMPTS", "5")?;
    if feed_poll_max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "WMKT_FEED_POLL_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let feed_poll_interval_secs = parse_u64("WMKT_FEED_POLL_INTERVAL_SECS", "10")?;

    let listing_path = PathBuf::from(or_default("WMKT_LISTING_PATH", "./config/listing.yaml"));

    Ok(AppConfig {
        credentials: Credentials::new(client_id, client_secret),
        auth_url,
        base_url,
        service_name,
        channel_type,
        env,
        log_level,
        request_timeout_secs,
        user_agent,
        feed_poll_max_attempts,
        feed_poll_interval_secs,
        listing_path,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test` or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "WMKT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

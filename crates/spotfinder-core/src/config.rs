use crate::app_config::{AppConfig, Environment};
use crate::locations::Coordinate;
use crate::ConfigError;

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
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let backend_url = require("SPOTFINDER_BACKEND_URL")?;
    let backend_key = require("SPOTFINDER_BACKEND_KEY")?;

    let env = parse_environment(&or_default("SPOTFINDER_ENV", "development"))?;
    let log_level = or_default("SPOTFINDER_LOG_LEVEL", "info");

    let locations_table = or_default("SPOTFINDER_LOCATIONS_TABLE", "parking_locations");
    let bookings_table = or_default("SPOTFINDER_BOOKINGS_TABLE", "bookings");

    let request_timeout_secs = parse_u64("SPOTFINDER_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("SPOTFINDER_USER_AGENT", "spotfinder/0.1 (parking-discovery)");
    let max_retries = parse_u32("SPOTFINDER_MAX_RETRIES", "3")?;
    let retry_backoff_base_ms = parse_u64("SPOTFINDER_RETRY_BACKOFF_BASE_MS", "500")?;

    let feed_poll_interval_ms = parse_u64("SPOTFINDER_FEED_POLL_INTERVAL_MS", "5000")?;
    if feed_poll_interval_ms == 0 {
        return Err(invalid(
            "SPOTFINDER_FEED_POLL_INTERVAL_MS",
            "must be greater than zero".to_string(),
        ));
    }

    let position_url = lookup("SPOTFINDER_POSITION_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());
    let position_timeout_ms = parse_u64("SPOTFINDER_POSITION_TIMEOUT_MS", "5000")?;

    let default_origin = Coordinate::new(
        parse_f64("SPOTFINDER_DEFAULT_LAT", "19.076")?,
        parse_f64("SPOTFINDER_DEFAULT_LNG", "72.877")?,
    );
    if !default_origin.is_valid() {
        return Err(invalid(
            "SPOTFINDER_DEFAULT_LAT",
            format!("default origin ({default_origin}) is not a valid coordinate"),
        ));
    }

    Ok(AppConfig {
        env,
        log_level,
        backend_url,
        backend_key,
        locations_table,
        bookings_table,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_ms,
        feed_poll_interval_ms,
        position_url,
        position_timeout_ms,
        default_origin,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvVar`] for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "SPOTFINDER_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

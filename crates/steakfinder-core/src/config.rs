use crate::app_config::{ApiKey, AppConfig, Environment};
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
/// Decoupled from the process environment so it can be driven by a
/// `HashMap` in tests.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(invalid(var, format!("expected true or false, got '{raw}'"))),
        }
    };

    let env = parse_environment(&or_default("STEAKFINDER_ENV", "development"));

    let google_maps_api_key = lookup("GOOGLE_MAPS_API_KEY")
        .ok()
        .and_then(|raw| ApiKey::parse(&raw));
    if google_maps_api_key.is_none() && env != Environment::Development {
        return Err(ConfigError::MissingEnvVar("GOOGLE_MAPS_API_KEY".to_string()));
    }

    let bind_addr = parse_addr("STEAKFINDER_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("STEAKFINDER_LOG_LEVEL", "info");
    let places_base_url = or_default(
        "STEAKFINDER_PLACES_BASE_URL",
        "https://places.googleapis.com/",
    );
    let geocode_base_url = or_default(
        "STEAKFINDER_GEOCODE_BASE_URL",
        "https://maps.googleapis.com/",
    );
    let request_timeout_secs = parse_u64("STEAKFINDER_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default(
        "STEAKFINDER_USER_AGENT",
        "steakfinder/0.1 (restaurant-search)",
    );
    let search_radius_meters = parse_u32("STEAKFINDER_SEARCH_RADIUS_METERS", "5000")?;
    let result_limit = parse_usize("STEAKFINDER_RESULT_LIMIT", "10")?;
    if result_limit == 0 {
        return Err(invalid(
            "STEAKFINDER_RESULT_LIMIT",
            "must be at least 1".to_string(),
        ));
    }
    let cache_ttl_secs = parse_u64("STEAKFINDER_CACHE_TTL_SECS", "600")?;
    let include_unknown_hours = parse_bool("STEAKFINDER_INCLUDE_UNKNOWN_HOURS", "false")?;
    let rate_limit_per_minute = parse_usize("STEAKFINDER_RATE_LIMIT_PER_MINUTE", "120")?;
    if rate_limit_per_minute == 0 {
        return Err(invalid(
            "STEAKFINDER_RATE_LIMIT_PER_MINUTE",
            "must be at least 1".to_string(),
        ));
    }

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        google_maps_api_key,
        places_base_url,
        geocode_base_url,
        request_timeout_secs,
        user_agent,
        search_radius_meters,
        result_limit,
        cache_ttl_secs,
        include_unknown_hours,
        rate_limit_per_minute,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use crate::app_config::AppConfig;
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
/// Parsing and validation are decoupled from the process environment so they
/// can be tested with a plain `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
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

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let quote_base_url = require("PRICECHECK_QUOTE_BASE_URL")?;
    validate_http_url("PRICECHECK_QUOTE_BASE_URL", &quote_base_url)?;
    let quote_endpoint = or_default("PRICECHECK_QUOTE_ENDPOINT", "/en/quoter/ajax/priceservice/");

    let reference_base_url = or_default("PRICECHECK_REFERENCE_BASE_URL", "http://localhost:13000");
    validate_http_url("PRICECHECK_REFERENCE_BASE_URL", &reference_base_url)?;
    let reference_tariff = or_default("PRICECHECK_REFERENCE_TARIFF", "1");

    let catalog_path = PathBuf::from(or_default(
        "PRICECHECK_CATALOG_PATH",
        "./config/catalog.yaml",
    ));
    let catalog_max_hits = parse_usize("PRICECHECK_CATALOG_MAX_HITS", "100")?;
    if catalog_max_hits == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PRICECHECK_CATALOG_MAX_HITS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let log_level = or_default("PRICECHECK_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("PRICECHECK_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("PRICECHECK_USER_AGENT", "pricecheck/0.1 (price-reconciliation)");
    let max_retries = parse_u32("PRICECHECK_MAX_RETRIES", "0")?;
    let retry_backoff_base_secs = parse_u64("PRICECHECK_RETRY_BACKOFF_BASE_SECS", "1")?;

    Ok(AppConfig {
        quote_base_url,
        quote_endpoint,
        reference_base_url,
        reference_tariff,
        catalog_path,
        catalog_max_hits,
        log_level,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
    })
}

fn validate_http_url(var: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected an http(s) URL, got '{value}'"),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

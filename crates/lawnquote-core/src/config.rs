use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
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
/// Returns `ConfigError` if values are present but invalid.
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
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty strings count as unset so `FOO=` in a .env file disables a provider.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
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

    let database_url = optional("DATABASE_URL");
    let env = parse_environment(&or_default("LAWNQUOTE_ENV", "development"))?;

    let bind_addr = parse_addr("LAWNQUOTE_BIND_ADDR", "0.0.0.0:3001")?;
    let log_level = or_default("LAWNQUOTE_LOG_LEVEL", "info");
    let catalog_path = optional("LAWNQUOTE_CATALOG_PATH").map(PathBuf::from);

    let addy_api_key = optional("ADDY_API_KEY");
    let google_api_key = optional("GOOGLE_API_KEY");
    let linz_api_key = optional("LINZ_API_KEY");

    let provider_timeout_secs = parse_u64("LAWNQUOTE_PROVIDER_TIMEOUT_SECS", "8")?;
    if provider_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "LAWNQUOTE_PROVIDER_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let provider_user_agent = or_default(
        "LAWNQUOTE_PROVIDER_USER_AGENT",
        "lawnquote/0.1 (property-analysis)",
    );
    let elevation_dataset = or_default("LAWNQUOTE_ELEVATION_DATASET", "nzdem8m");
    let region_hint = or_default("LAWNQUOTE_REGION_HINT", "Dunedin");

    let db_max_connections = parse_u32("LAWNQUOTE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("LAWNQUOTE_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "LAWNQUOTE_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }
    let db_acquire_timeout_secs = parse_u64("LAWNQUOTE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        catalog_path,
        addy_api_key,
        google_api_key,
        linz_api_key,
        provider_timeout_secs,
        provider_user_agent,
        elevation_dataset,
        region_hint,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LAWNQUOTE_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::path::PathBuf;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if an env var holds an unparseable value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if an env var holds an unparseable value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing logic, decoupled from the actual environment so it
/// can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var`
/// needed. Every knob has a default, so lookup failures are never errors;
/// only unparseable values are.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
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

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<bool>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let portal_base_url = or_default("RUCQ_PORTAL_BASE_URL", "https://srienlinea.sri.gob.ec")
        .trim_end_matches('/')
        .to_string();

    // Match a current desktop Chrome build; the portal rejects obviously
    // synthetic agents.
    let user_agent = or_default(
        "RUCQ_USER_AGENT",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36",
    );

    let nav_timeout_ms = parse_u64("RUCQ_NAV_TIMEOUT_MS", "30000")?;

    // 60 attempts x 5 s = roughly a five-minute human-resolution window.
    let poll_interval_secs = parse_u64("RUCQ_POLL_INTERVAL_SECS", "5")?;
    let poll_max_attempts = parse_u32("RUCQ_POLL_MAX_ATTEMPTS", "60")?;

    let taxpayer_resolution_url = or_default(
        "RUCQ_TAXPAYER_RESOLUTION_URL",
        "http://localhost:6080/vnc.html",
    );
    let locations_resolution_url = or_default(
        "RUCQ_LOCATIONS_RESOLUTION_URL",
        "http://localhost:6081/vnc.html",
    );

    let headless = parse_bool("RUCQ_HEADLESS", "false")?;
    let chromium_path = lookup("RUCQ_CHROMIUM_PATH").ok().map(PathBuf::from);
    let log_level = or_default("RUCQ_LOG_LEVEL", "info");

    Ok(AppConfig {
        portal_base_url,
        user_agent,
        nav_timeout_ms,
        poll_interval_secs,
        poll_max_attempts,
        taxpayer_resolution_url,
        locations_resolution_url,
        headless,
        chromium_path,
        log_level,
    })
}

use std::path::PathBuf;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Longest useful scheduling window: the last checkpoint is 168 hours out.
const MAX_ACTIVE_WINDOW_HOURS: u32 = 168;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a usable
/// development config.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let cron = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        validate_cron(var, &raw)?;
        Ok(raw)
    };

    let env = parse_environment(&or_default("TRENDSCOPE_ENV", "development"))?;
    let log_level = or_default("TRENDSCOPE_LOG_LEVEL", "info");

    let videos_path = PathBuf::from(or_default("TRENDSCOPE_VIDEOS_PATH", "./config/videos.yaml"));
    let keywords_path = PathBuf::from(or_default(
        "TRENDSCOPE_KEYWORDS_PATH",
        "./config/keywords.yaml",
    ));
    let task_ledger_path = PathBuf::from(or_default(
        "TRENDSCOPE_TASK_LEDGER_PATH",
        "./data/tasks.json",
    ));
    let snapshot_log_path = PathBuf::from(or_default(
        "TRENDSCOPE_SNAPSHOT_LOG_PATH",
        "./data/snapshots.jsonl",
    ));

    let active_window_hours = parse_u32("TRENDSCOPE_ACTIVE_WINDOW_HOURS", "24")?;
    if !(1..=MAX_ACTIVE_WINDOW_HOURS).contains(&active_window_hours) {
        return Err(ConfigError::InvalidEnvVar {
            var: "TRENDSCOPE_ACTIVE_WINDOW_HOURS".to_string(),
            reason: format!("must be between 1 and {MAX_ACTIVE_WINDOW_HOURS}, got {active_window_hours}"),
        });
    }

    let schedule_cron = cron("TRENDSCOPE_SCHEDULE_CRON", "0 */15 * * * *")?;
    let trending_cron = cron("TRENDSCOPE_TRENDING_CRON", "0 0 * * * *")?;

    Ok(AppConfig {
        env,
        log_level,
        videos_path,
        keywords_path,
        task_ledger_path,
        snapshot_log_path,
        active_window_hours,
        schedule_cron,
        trending_cron,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TRENDSCOPE_ENV".to_string(),
            reason: format!("expected development, test or production, got '{other}'"),
        }),
    }
}

/// Cheap shape check; the scheduler does the full parse at startup.
fn validate_cron(var: &str, expr: &str) -> Result<(), ConfigError> {
    let fields = expr.split_whitespace().count();
    if fields == 6 || fields == 7 {
        Ok(())
    } else {
        Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("cron expression needs 6 or 7 fields (seconds first), got {fields}"),
        })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

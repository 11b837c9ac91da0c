use crate::app_config::{AppConfig, PhoneLabeling};
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

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
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

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        let raw = or_default(var, default);
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected a boolean, got \"{other}\""),
            }),
        }
    };

    let fetch_api_key = require("OWNERTRACE_FETCH_API_KEY")?;

    let log_level = or_default("OWNERTRACE_LOG_LEVEL", "info");
    let fetch_base_url = or_default(
        "OWNERTRACE_FETCH_BASE_URL",
        "https://app.scrapingbee.com/api/v1",
    );
    let fetch_render_js = parse_bool("OWNERTRACE_FETCH_RENDER_JS", "true")?;
    let site_base_url = or_default(
        "OWNERTRACE_SITE_BASE_URL",
        "https://www.cyberbackgroundchecks.com",
    );
    let request_timeout_secs = parse_u64("OWNERTRACE_REQUEST_TIMEOUT_SECS", "60")?;
    let user_agent = or_default(
        "OWNERTRACE_USER_AGENT",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64)",
    );
    let inter_request_delay_ms = parse_u64("OWNERTRACE_INTER_REQUEST_DELAY_MS", "2000")?;
    let failure_delay_ms = parse_u64("OWNERTRACE_FAILURE_DELAY_MS", "3000")?;
    let delay_jitter_ms = parse_u64("OWNERTRACE_DELAY_JITTER_MS", "0")?;

    let max_parallel = parse_usize("OWNERTRACE_MAX_PARALLEL", "10")?;
    if max_parallel == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "OWNERTRACE_MAX_PARALLEL".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let max_relatives_to_crawl = parse_usize("OWNERTRACE_MAX_RELATIVES", "5")?;

    let phone_labeling =
        parse_phone_labeling(&or_default("OWNERTRACE_PHONE_LABELING", "per_number"))?;

    let openai_api_key = optional("OPENAI_API_KEY");
    let openai_base_url = or_default("OPENAI_BASE_URL", "https://api.openai.com/v1");
    let openai_model = or_default("OPENAI_MODEL", "gpt-3.5-turbo");
    let slack_webhook_url = optional("SLACK_WEBHOOK_URL");
    let bizfile_base_url = or_default(
        "OWNERTRACE_BIZFILE_BASE_URL",
        "https://bizfileonline.sos.ca.gov",
    );

    Ok(AppConfig {
        log_level,
        fetch_base_url,
        fetch_api_key,
        fetch_render_js,
        site_base_url,
        request_timeout_secs,
        user_agent,
        inter_request_delay_ms,
        failure_delay_ms,
        delay_jitter_ms,
        max_parallel,
        max_relatives_to_crawl,
        phone_labeling,
        openai_api_key,
        openai_base_url,
        openai_model,
        slack_webhook_url,
        bizfile_base_url,
    })
}

/// Parse the phone labelling strategy name.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than `per_number`
/// or `batch`.
fn parse_phone_labeling(s: &str) -> Result<PhoneLabeling, ConfigError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "per_number" | "per-number" => Ok(PhoneLabeling::PerNumber),
        "batch" => Ok(PhoneLabeling::Batch),
        other => Err(ConfigError::InvalidEnvVar {
            var: "OWNERTRACE_PHONE_LABELING".to_string(),
            reason: format!("unknown strategy \"{other}\"; expected per_number or batch"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("OWNERTRACE_FETCH_API_KEY", "test-key");
    m
}

#[test]
fn build_app_config_fails_without_fetch_api_key() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "OWNERTRACE_FETCH_API_KEY"),
        "expected MissingEnvVar(OWNERTRACE_FETCH_API_KEY), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_fetch_api_key_as_missing() {
    let mut map = full_env();
    map.insert("OWNERTRACE_FETCH_API_KEY", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.fetch_api_key, "test-key");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.fetch_base_url, "https://app.scrapingbee.com/api/v1");
    assert!(cfg.fetch_render_js);
    assert_eq!(cfg.site_base_url, "https://www.cyberbackgroundchecks.com");
    assert_eq!(cfg.request_timeout_secs, 60);
    assert_eq!(cfg.inter_request_delay_ms, 2000);
    assert_eq!(cfg.failure_delay_ms, 3000);
    assert_eq!(cfg.delay_jitter_ms, 0);
    assert_eq!(cfg.max_parallel, 10);
    assert_eq!(cfg.max_relatives_to_crawl, 5);
    assert_eq!(cfg.phone_labeling, PhoneLabeling::PerNumber);
    assert!(cfg.openai_api_key.is_none());
    assert_eq!(cfg.openai_model, "gpt-3.5-turbo");
    assert!(cfg.slack_webhook_url.is_none());
    assert_eq!(cfg.bizfile_base_url, "https://bizfileonline.sos.ca.gov");
}

#[test]
fn max_parallel_override() {
    let mut map = full_env();
    map.insert("OWNERTRACE_MAX_PARALLEL", "3");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_parallel, 3);
}

#[test]
fn max_parallel_zero_is_rejected() {
    let mut map = full_env();
    map.insert("OWNERTRACE_MAX_PARALLEL", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "OWNERTRACE_MAX_PARALLEL"),
        "expected InvalidEnvVar(OWNERTRACE_MAX_PARALLEL), got: {result:?}"
    );
}

#[test]
fn max_relatives_invalid() {
    let mut map = full_env();
    map.insert("OWNERTRACE_MAX_RELATIVES", "five");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "OWNERTRACE_MAX_RELATIVES"),
        "expected InvalidEnvVar(OWNERTRACE_MAX_RELATIVES), got: {result:?}"
    );
}

#[test]
fn inter_request_delay_override() {
    let mut map = full_env();
    map.insert("OWNERTRACE_INTER_REQUEST_DELAY_MS", "500");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.inter_request_delay_ms, 500);
}

#[test]
fn render_js_accepts_false() {
    let mut map = full_env();
    map.insert("OWNERTRACE_FETCH_RENDER_JS", "false");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(!cfg.fetch_render_js);
}

#[test]
fn render_js_rejects_garbage() {
    let mut map = full_env();
    map.insert("OWNERTRACE_FETCH_RENDER_JS", "sometimes");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "OWNERTRACE_FETCH_RENDER_JS")
    );
}

#[test]
fn phone_labeling_batch() {
    let mut map = full_env();
    map.insert("OWNERTRACE_PHONE_LABELING", "batch");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.phone_labeling, PhoneLabeling::Batch);
}

#[test]
fn phone_labeling_unknown_fails() {
    let err = parse_phone_labeling("sometimes").unwrap_err();
    assert!(
        matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "OWNERTRACE_PHONE_LABELING")
    );
}

#[test]
fn openai_and_slack_are_picked_up_when_set() {
    let mut map = full_env();
    map.insert("OPENAI_API_KEY", "sk-test");
    map.insert("SLACK_WEBHOOK_URL", "https://hooks.slack.com/services/T/B/X");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.openai_api_key.as_deref(), Some("sk-test"));
    assert!(cfg.slack_webhook_url.is_some());
}

#[test]
fn debug_output_redacts_secrets() {
    let mut map = full_env();
    map.insert("OPENAI_API_KEY", "sk-secret");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("test-key"));
    assert!(!rendered.contains("sk-secret"));
    assert!(rendered.contains("[redacted]"));
}

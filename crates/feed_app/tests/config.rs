use std::fs;
use std::time::Duration;

use feed_app::{ConfigLayer, CONFIG_FILENAME};
use tempfile::TempDir;

fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

#[test]
fn defaults_match_reconnect_policy() {
    let settings = ConfigLayer::default().into_settings();

    assert_eq!(settings.policy.reconnect.base_delay, Duration::from_secs(1));
    assert_eq!(settings.policy.reconnect.max_delay, Duration::from_secs(30));
    assert_eq!(settings.policy.reconnect.fallback_threshold, 3);
    assert_eq!(settings.endpoints.ws_path, "/ws/status");
    assert_eq!(settings.endpoints.sse_path, "/sse/status");
    assert_eq!(settings.endpoints.api_base, None);
}

#[test]
fn loads_ron_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(CONFIG_FILENAME);
    fs::write(
        &path,
        r#"(
            api_base: Some("https://api.example.com"),
            max_delay_ms: Some(10000),
            sse: Some(false),
        )"#,
    )
    .unwrap();

    let settings = ConfigLayer::load(&path).unwrap().into_settings();

    assert_eq!(
        settings.endpoints.api_base.as_deref(),
        Some("https://api.example.com")
    );
    assert_eq!(settings.policy.reconnect.max_delay, Duration::from_secs(10));
    assert!(!settings.policy.support.sse);
    assert!(settings.policy.support.websocket);
}

#[test]
fn missing_optional_file_is_empty() {
    let temp = TempDir::new().unwrap();
    let layer = ConfigLayer::load_optional(&temp.path().join(CONFIG_FILENAME)).unwrap();
    assert_eq!(layer, ConfigLayer::default());
}

#[test]
fn rejects_unknown_fields_in_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(CONFIG_FILENAME);
    fs::write(&path, "(api_bse: Some(\"typo\"))").unwrap();

    assert!(ConfigLayer::load(&path).is_err());
}

#[test]
fn reads_prefixed_env_vars() {
    let layer = ConfigLayer::from_env(env(&[
        ("FEED_API_BASE", "https://api.example.com"),
        ("FEED_TOKEN", "secret"),
        ("FEED_BASE_DELAY_MS", "250"),
        ("FEED_WEBSOCKET", "false"),
        ("PATH", "/usr/bin"),
        ("FEED_SOMETHING_ELSE", "ignored"),
    ]))
    .unwrap();

    assert_eq!(layer.api_base.as_deref(), Some("https://api.example.com"));
    assert_eq!(layer.token.as_deref(), Some("secret"));
    assert_eq!(layer.base_delay_ms, Some(250));
    assert_eq!(layer.websocket, Some(false));
}

#[test]
fn invalid_env_number_is_an_error() {
    let err = ConfigLayer::from_env(env(&[("FEED_MAX_DELAY_MS", "soon")])).unwrap_err();
    assert!(err.to_string().contains("FEED_MAX_DELAY_MS"));
}

#[test]
fn later_layers_win() {
    let file = ConfigLayer {
        api_base: Some("https://file.example.com".into()),
        token: Some("file-token".into()),
        fallback_threshold: Some(5),
        ..ConfigLayer::default()
    };
    let env = ConfigLayer {
        token: Some("env-token".into()),
        ..ConfigLayer::default()
    };
    let cli = ConfigLayer {
        api_base: Some("https://cli.example.com".into()),
        ..ConfigLayer::default()
    };

    let settings = file.overlay(env).overlay(cli).into_settings();

    assert_eq!(
        settings.endpoints.api_base.as_deref(),
        Some("https://cli.example.com")
    );
    assert_eq!(settings.endpoints.token.as_deref(), Some("env-token"));
    assert_eq!(settings.policy.reconnect.fallback_threshold, 5);
}

#[test]
fn max_delay_never_below_base() {
    let settings = ConfigLayer {
        base_delay_ms: Some(5000),
        max_delay_ms: Some(100),
        ..ConfigLayer::default()
    }
    .into_settings();

    assert_eq!(settings.policy.reconnect.max_delay, Duration::from_secs(5));
}

use feed_core::TransportKind;
use feed_engine::{EndpointConfig, EndpointError, Endpoints};

fn config(api_base: Option<&str>, token: Option<&str>) -> EndpointConfig {
    EndpointConfig {
        api_base: api_base.map(str::to_string),
        token: token.map(str::to_string),
        ..EndpointConfig::default()
    }
}

#[test]
fn https_base_upgrades_to_wss() {
    let endpoints = Endpoints::resolve(&config(Some("https://api.example.com"), None)).unwrap();

    assert_eq!(endpoints.websocket.as_str(), "wss://api.example.com/ws/status");
    assert_eq!(endpoints.sse.as_str(), "https://api.example.com/sse/status");
}

#[test]
fn http_base_keeps_port_and_path_prefix() {
    let endpoints =
        Endpoints::resolve(&config(Some("http://localhost:8080/api/"), None)).unwrap();

    assert_eq!(endpoints.websocket.as_str(), "ws://localhost:8080/api/ws/status");
    assert_eq!(endpoints.sse.as_str(), "http://localhost:8080/api/sse/status");
}

#[test]
fn token_is_appended_as_query() {
    let endpoints =
        Endpoints::resolve(&config(Some("https://api.example.com"), Some("a b&c"))).unwrap();

    assert_eq!(
        endpoints.url_for(TransportKind::WebSocket).as_str(),
        "wss://api.example.com/ws/status?token=a+b%26c"
    );
    assert_eq!(
        endpoints.url_for(TransportKind::Sse).as_str(),
        "https://api.example.com/sse/status?token=a+b%26c"
    );
}

#[test]
fn missing_or_blank_base_falls_back_to_origin() {
    let mut cfg = config(Some("   "), None);
    cfg.origin = "https://app.example.com".to_string();
    let endpoints = Endpoints::resolve(&cfg).unwrap();
    assert_eq!(endpoints.websocket.as_str(), "wss://app.example.com/ws/status");

    cfg.api_base = None;
    let endpoints = Endpoints::resolve(&cfg).unwrap();
    assert_eq!(endpoints.sse.as_str(), "https://app.example.com/sse/status");
}

#[test]
fn websocket_base_maps_back_to_http_for_sse() {
    let endpoints = Endpoints::resolve(&config(Some("wss://stream.example.com"), None)).unwrap();

    assert_eq!(endpoints.websocket.as_str(), "wss://stream.example.com/ws/status");
    assert_eq!(endpoints.sse.as_str(), "https://stream.example.com/sse/status");
}

#[test]
fn custom_paths_are_used() {
    let cfg = EndpointConfig {
        api_base: Some("https://api.example.com".into()),
        ws_path: "recoveries/ws".into(),
        sse_path: "/recoveries/sse".into(),
        ..EndpointConfig::default()
    };
    let endpoints = Endpoints::resolve(&cfg).unwrap();

    assert_eq!(endpoints.websocket.path(), "/recoveries/ws");
    assert_eq!(endpoints.sse.path(), "/recoveries/sse");
}

#[test]
fn rejects_bad_bases() {
    assert!(matches!(
        Endpoints::resolve(&config(Some("not a url"), None)),
        Err(EndpointError::InvalidBase { .. })
    ));
    assert_eq!(
        Endpoints::resolve(&config(Some("ftp://files.example.com"), None)),
        Err(EndpointError::UnsupportedScheme("ftp".into()))
    );
}

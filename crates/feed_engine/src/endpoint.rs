use url::Url;

use feed_core::TransportKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    /// Configured API base. Empty or missing falls back to `origin`.
    pub api_base: Option<String>,
    /// Origin the frontend is served from.
    pub origin: String,
    pub token: Option<String>,
    pub ws_path: String,
    pub sse_path: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            origin: "http://localhost:3000".to_string(),
            token: None,
            ws_path: "/ws/status".to_string(),
            sse_path: "/sse/status".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointError {
    #[error("invalid base url {base:?}: {message}")]
    InvalidBase { base: String, message: String },
    #[error("unsupported url scheme {0:?}")]
    UnsupportedScheme(String),
}

/// Resolved stream URLs for both transports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub websocket: Url,
    pub sse: Url,
}

impl Endpoints {
    pub fn resolve(config: &EndpointConfig) -> Result<Self, EndpointError> {
        let base = config
            .api_base
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .unwrap_or_else(|| config.origin.trim());
        let parsed = Url::parse(base).map_err(|err| EndpointError::InvalidBase {
            base: base.to_string(),
            message: err.to_string(),
        })?;

        let (ws_scheme, http_scheme) = match parsed.scheme() {
            "http" | "ws" => ("ws", "http"),
            "https" | "wss" => ("wss", "https"),
            other => return Err(EndpointError::UnsupportedScheme(other.to_string())),
        };

        let token = config.token.as_deref().filter(|token| !token.is_empty());
        Ok(Self {
            websocket: build_url(&parsed, ws_scheme, &config.ws_path, token)?,
            sse: build_url(&parsed, http_scheme, &config.sse_path, token)?,
        })
    }

    pub fn url_for(&self, transport: TransportKind) -> &Url {
        match transport {
            TransportKind::WebSocket => &self.websocket,
            TransportKind::Sse => &self.sse,
        }
    }
}

fn build_url(
    base: &Url,
    scheme: &str,
    path: &str,
    token: Option<&str>,
) -> Result<Url, EndpointError> {
    let mut url = base.clone();
    url.set_scheme(scheme)
        .map_err(|()| EndpointError::UnsupportedScheme(base.scheme().to_string()))?;

    let joined = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url.set_query(None);
    url.set_fragment(None);
    if let Some(token) = token {
        url.query_pairs_mut().append_pair("token", token);
    }
    Ok(url)
}

/// Scheme, host and path only; keeps tokens out of logs.
pub(crate) fn display_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or("");
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use feed_engine::ClientSettings;
use feed_logging::feed_info;
use serde::{Deserialize, Serialize};

/// Looked up in the working directory when no `--config` is given.
pub const CONFIG_FILENAME: &str = "feed.ron";
pub const ENV_PREFIX: &str = "FEED_";

/// One source of settings. Unset fields defer to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub api_base: Option<String>,
    pub origin: Option<String>,
    pub token: Option<String>,
    pub session_cookie: Option<String>,
    pub ws_path: Option<String>,
    pub sse_path: Option<String>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub fallback_threshold: Option<u32>,
    pub websocket: Option<bool>,
    pub sse: Option<bool>,
    pub connect_timeout_ms: Option<u64>,
}

impl ConfigLayer {
    /// Reads a RON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let layer = ron::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        feed_info!("Loaded config from {:?}", path);
        Ok(layer)
    }

    /// Like [`ConfigLayer::load`], but a missing file is an empty layer.
    pub fn load_optional(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Collects `FEED_*` variables, e.g. `FEED_API_BASE` or `FEED_MAX_DELAY_MS`.
    pub fn from_env<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "API_BASE" => layer.api_base = Some(value),
                "ORIGIN" => layer.origin = Some(value),
                "TOKEN" => layer.token = Some(value),
                "SESSION_COOKIE" => layer.session_cookie = Some(value),
                "WS_PATH" => layer.ws_path = Some(value),
                "SSE_PATH" => layer.sse_path = Some(value),
                "BASE_DELAY_MS" => layer.base_delay_ms = Some(parse_var(&key, &value)?),
                "MAX_DELAY_MS" => layer.max_delay_ms = Some(parse_var(&key, &value)?),
                "FALLBACK_THRESHOLD" => {
                    layer.fallback_threshold = Some(parse_var(&key, &value)?)
                }
                "WEBSOCKET" => layer.websocket = Some(parse_var(&key, &value)?),
                "SSE" => layer.sse = Some(parse_var(&key, &value)?),
                "CONNECT_TIMEOUT_MS" => {
                    layer.connect_timeout_ms = Some(parse_var(&key, &value)?)
                }
                _ => {}
            }
        }
        Ok(layer)
    }

    /// Returns `self` with every field that `top` sets replaced.
    pub fn overlay(self, top: ConfigLayer) -> ConfigLayer {
        ConfigLayer {
            api_base: top.api_base.or(self.api_base),
            origin: top.origin.or(self.origin),
            token: top.token.or(self.token),
            session_cookie: top.session_cookie.or(self.session_cookie),
            ws_path: top.ws_path.or(self.ws_path),
            sse_path: top.sse_path.or(self.sse_path),
            base_delay_ms: top.base_delay_ms.or(self.base_delay_ms),
            max_delay_ms: top.max_delay_ms.or(self.max_delay_ms),
            fallback_threshold: top.fallback_threshold.or(self.fallback_threshold),
            websocket: top.websocket.or(self.websocket),
            sse: top.sse.or(self.sse),
            connect_timeout_ms: top.connect_timeout_ms.or(self.connect_timeout_ms),
        }
    }

    /// Applies the layer on top of `ClientSettings::default()`.
    pub fn into_settings(self) -> ClientSettings {
        let mut settings = ClientSettings::default();
        let endpoints = &mut settings.endpoints;
        endpoints.api_base = self.api_base;
        if let Some(origin) = self.origin {
            endpoints.origin = origin;
        }
        endpoints.token = self.token;
        if let Some(path) = self.ws_path {
            endpoints.ws_path = path;
        }
        if let Some(path) = self.sse_path {
            endpoints.sse_path = path;
        }

        let reconnect = &mut settings.policy.reconnect;
        if let Some(ms) = self.base_delay_ms {
            reconnect.base_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = self.max_delay_ms {
            reconnect.max_delay = Duration::from_millis(ms);
        }
        if reconnect.max_delay < reconnect.base_delay {
            reconnect.max_delay = reconnect.base_delay;
        }
        if let Some(threshold) = self.fallback_threshold {
            reconnect.fallback_threshold = threshold;
        }

        let support = &mut settings.policy.support;
        if let Some(enabled) = self.websocket {
            support.websocket = enabled;
        }
        if let Some(enabled) = self.sse {
            support.sse = enabled;
        }

        settings.transport.session_cookie = self.session_cookie;
        if let Some(ms) = self.connect_timeout_ms {
            settings.transport.connect_timeout = Duration::from_millis(ms);
        }
        settings
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{key} has invalid value {value:?}"))
}

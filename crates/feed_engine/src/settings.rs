use std::time::Duration;

use feed_core::ClientPolicy;

use crate::EndpointConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    pub connect_timeout: Duration,
    /// Sent as the `Cookie` header for cookie-based sessions.
    pub session_cookie: Option<String>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            session_cookie: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientSettings {
    pub endpoints: EndpointConfig,
    pub transport: TransportSettings,
    pub policy: ClientPolicy,
}

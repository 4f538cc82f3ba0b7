use std::time::Duration;

use crate::EndpointError;

/// One unit read off a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Raw message body, expected to hold one JSON status event.
    Message(String),
    /// Reconnection delay announced by an SSE server.
    RetryHint(Duration),
}

/// Why a transport could not be opened or stopped delivering frames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid session cookie: {0}")]
    InvalidCookie(String),
    #[error("timeout")]
    Timeout,
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("unsupported content type {content_type}")]
    UnsupportedContentType { content_type: String },
    #[error("websocket error: {0}")]
    WebSocket(String),
    #[error("network error: {0}")]
    Network(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    #[error("status client must be created inside a tokio runtime")]
    NoRuntime,
}

use std::time::Duration;

use crate::ConnId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A handler was registered.
    SubscriberAdded,
    /// A handler was removed.
    SubscriberRemoved,
    /// Owner teardown: drop every subscriber and release the connection.
    Shutdown,
    /// The transport of attempt `conn_id` finished its handshake.
    TransportOpened { conn_id: ConnId },
    /// One message body arrived on attempt `conn_id`.
    FrameReceived { conn_id: ConnId, text: String },
    /// Server-sent `retry:` field on an SSE stream.
    RetryHint { conn_id: ConnId, delay: Duration },
    /// Attempt `conn_id` failed to open, errored, or was closed by the peer.
    TransportClosed { conn_id: ConnId },
    /// The reconnect timer armed after attempt `after` elapsed.
    ReconnectTimerFired { after: ConnId },
    /// Fallback for placeholder wiring.
    NoOp,
}

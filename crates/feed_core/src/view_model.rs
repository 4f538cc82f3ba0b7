use std::time::Duration;

use crate::{ConnId, Phase, TransportKind};

/// Read-only snapshot for connection indicators and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionView {
    pub phase: Phase,
    /// Transport of the current attempt, or of the next one while disconnected.
    pub transport: TransportKind,
    pub subscribers: usize,
    pub attempt: u32,
    pub conn_id: ConnId,
    pub reconnect_armed: bool,
    pub next_delay: Option<Duration>,
}

impl ConnectionView {
    pub fn is_connected(&self) -> bool {
        matches!(self.phase, Phase::Connected(_))
    }

    /// Short human label, e.g. "live (websocket)" or "retrying in 4.0s (sse)".
    pub fn label(&self) -> String {
        match self.phase {
            Phase::Connected(transport) => format!("live ({transport})"),
            Phase::Connecting(transport) => format!("connecting ({transport})"),
            Phase::Disconnected => match self.next_delay {
                Some(delay) if self.reconnect_armed => {
                    format!("retrying in {:.1}s ({})", delay.as_secs_f32(), self.transport)
                }
                _ => "offline".to_string(),
            },
        }
    }
}

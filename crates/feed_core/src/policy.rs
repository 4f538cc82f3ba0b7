use std::time::Duration;

use crate::TransportKind;

/// Capped exponential backoff plus the WebSocket to SSE fallback threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Consecutive WebSocket failures after which SSE is used instead.
    pub fallback_threshold: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            fallback_threshold: 3,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before the reconnect that follows failure number `attempt`
    /// (zero based): `min(base * 2^attempt, max)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let multiplier = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(multiplier)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Which transports the host environment can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportSupport {
    pub websocket: bool,
    pub sse: bool,
}

impl Default for TransportSupport {
    fn default() -> Self {
        Self {
            websocket: true,
            sse: true,
        }
    }
}

impl TransportSupport {
    /// Transport used for the first attempt of a session, if any is available.
    pub fn preferred(&self) -> Option<TransportKind> {
        if self.websocket {
            Some(TransportKind::WebSocket)
        } else if self.sse {
            Some(TransportKind::Sse)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientPolicy {
    pub reconnect: ReconnectPolicy,
    pub support: TransportSupport,
}

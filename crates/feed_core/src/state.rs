use std::fmt;
use std::time::Duration;

use crate::view_model::ConnectionView;
use crate::{ClientPolicy, Effect};

/// Stamp carried by every connection attempt; messages from older attempts are stale.
pub type ConnId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    #[default]
    WebSocket,
    Sse,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::WebSocket => f.write_str("websocket"),
            TransportKind::Sse => f.write_str("sse"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Disconnected,
    Connecting(TransportKind),
    Connected(TransportKind),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnState {
    policy: ClientPolicy,
    phase: Phase,
    transport: TransportKind,
    subscribers: usize,
    attempt: u32,
    conn_id: ConnId,
    reconnect_armed: bool,
    next_delay: Option<Duration>,
    retry_hint: Option<Duration>,
    dirty: bool,
}

impl ConnState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ClientPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn view(&self) -> ConnectionView {
        ConnectionView {
            phase: self.phase,
            transport: self.transport,
            subscribers: self.subscribers,
            attempt: self.attempt,
            conn_id: self.conn_id,
            reconnect_armed: self.reconnect_armed,
            next_delay: self.next_delay,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn transport(&self) -> TransportKind {
        self.transport
    }

    pub fn subscribers(&self) -> usize {
        self.subscribers
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn conn_id(&self) -> ConnId {
        self.conn_id
    }

    pub fn reconnect_armed(&self) -> bool {
        self.reconnect_armed
    }

    pub fn policy(&self) -> &ClientPolicy {
        &self.policy
    }

    /// Returns whether the view changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn add_subscriber(&mut self) {
        self.subscribers += 1;
        self.dirty = true;
    }

    /// Returns false when there was no subscriber to remove.
    pub(crate) fn remove_subscriber(&mut self) -> bool {
        if self.subscribers == 0 {
            return false;
        }
        self.subscribers -= 1;
        self.dirty = true;
        true
    }

    pub(crate) fn clear_subscribers(&mut self) {
        if self.subscribers != 0 {
            self.subscribers = 0;
            self.dirty = true;
        }
    }

    pub(crate) fn is_current(&self, conn_id: ConnId) -> bool {
        conn_id == self.conn_id
    }

    /// Resets per-session counters; returns the first transport to try.
    pub(crate) fn begin_session(&mut self) -> Option<TransportKind> {
        self.attempt = 0;
        self.retry_hint = None;
        self.next_delay = None;
        let preferred = self.policy.support.preferred()?;
        self.transport = preferred;
        Some(preferred)
    }

    pub(crate) fn start_attempt(&mut self) -> Effect {
        self.conn_id += 1;
        self.phase = Phase::Connecting(self.transport);
        self.reconnect_armed = false;
        self.next_delay = None;
        self.dirty = true;
        Effect::Connect {
            conn_id: self.conn_id,
            transport: self.transport,
        }
    }

    pub(crate) fn mark_connected(&mut self) {
        self.phase = Phase::Connected(self.transport);
        self.attempt = 0;
        self.dirty = true;
    }

    pub(crate) fn set_retry_hint(&mut self, delay: Duration) {
        self.retry_hint = Some(delay);
    }

    /// Records a failed or closed transport and arms the reconnect timer.
    pub(crate) fn record_failure(&mut self) -> Effect {
        let reconnect = self.policy.reconnect;
        let delay = match (self.transport, self.retry_hint) {
            (TransportKind::Sse, Some(hint)) => hint.min(reconnect.max_delay),
            _ => reconnect.delay_for(self.attempt),
        };
        self.attempt = self.attempt.saturating_add(1);

        if self.transport == TransportKind::WebSocket
            && self.policy.support.sse
            && self.attempt >= reconnect.fallback_threshold
        {
            feed_logging::feed_info!(
                "websocket failed {} times in a row; falling back to sse",
                self.attempt
            );
            self.transport = TransportKind::Sse;
        }

        self.phase = Phase::Disconnected;
        self.reconnect_armed = true;
        self.next_delay = Some(delay);
        self.dirty = true;
        Effect::ScheduleReconnect {
            after: self.conn_id,
            delay,
        }
    }

    /// Drops the live transport and any armed timer. Returns the effects that
    /// release them.
    pub(crate) fn teardown(&mut self) -> Vec<Effect> {
        let mut effects = Vec::with_capacity(2);
        if self.reconnect_armed {
            effects.push(Effect::CancelReconnect);
        }
        if self.phase != Phase::Disconnected {
            effects.push(Effect::CloseTransport {
                conn_id: self.conn_id,
            });
        }
        if !effects.is_empty() {
            self.dirty = true;
        }
        self.phase = Phase::Disconnected;
        self.reconnect_armed = false;
        self.attempt = 0;
        self.next_delay = None;
        self.retry_hint = None;
        effects
    }
}

use feed_logging::{feed_debug, feed_warn};

use crate::{decode_frame, ConnState, Effect, Msg, Phase, TransportKind};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: ConnState, msg: Msg) -> (ConnState, Vec<Effect>) {
    let effects = match msg {
        Msg::SubscriberAdded => {
            state.add_subscriber();
            let first = state.subscribers() == 1;
            if first && state.phase() == Phase::Disconnected && !state.reconnect_armed() {
                match state.begin_session() {
                    Some(_) => vec![state.start_attempt()],
                    None => {
                        feed_warn!("no transport available; live status updates disabled");
                        Vec::new()
                    }
                }
            } else {
                Vec::new()
            }
        }
        Msg::SubscriberRemoved => {
            if state.remove_subscriber() && state.subscribers() == 0 {
                state.teardown()
            } else {
                Vec::new()
            }
        }
        Msg::Shutdown => {
            state.clear_subscribers();
            state.teardown()
        }
        Msg::TransportOpened { conn_id } => {
            if state.is_current(conn_id) && matches!(state.phase(), Phase::Connecting(_)) {
                state.mark_connected();
            } else {
                feed_debug!("ignoring open of stale connection {}", conn_id);
            }
            Vec::new()
        }
        Msg::FrameReceived { conn_id, text } => {
            if !state.is_current(conn_id) || !matches!(state.phase(), Phase::Connected(_)) {
                feed_debug!("ignoring frame from stale connection {}", conn_id);
                return (state, Vec::new());
            }
            match decode_frame(&text) {
                Ok(event) => vec![Effect::Dispatch(event)],
                Err(err) => {
                    feed_warn!("discarding status frame: {}", err);
                    Vec::new()
                }
            }
        }
        Msg::RetryHint { conn_id, delay } => {
            if state.is_current(conn_id) && state.transport() == TransportKind::Sse {
                state.set_retry_hint(delay);
            }
            Vec::new()
        }
        Msg::TransportClosed { conn_id } => {
            if !state.is_current(conn_id)
                || state.phase() == Phase::Disconnected
                || state.subscribers() == 0
            {
                feed_debug!("ignoring close of stale connection {}", conn_id);
                return (state, Vec::new());
            }
            vec![state.record_failure()]
        }
        Msg::ReconnectTimerFired { after } => {
            if state.reconnect_armed() && state.is_current(after) && state.subscribers() > 0 {
                vec![state.start_attempt()]
            } else {
                Vec::new()
            }
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

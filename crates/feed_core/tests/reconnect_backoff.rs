use std::time::Duration;

use feed_core::{
    update, ClientPolicy, ConnState, Effect, Msg, ReconnectPolicy, TransportKind, TransportSupport,
};

/// Closes the current attempt and lets the timer fire. Returns the scheduled
/// delay and the transport of the next attempt.
fn fail_once(state: ConnState) -> (ConnState, Duration, TransportKind) {
    let conn_id = state.conn_id();
    let (state, effects) = update(state, Msg::TransportClosed { conn_id });
    let delay = match effects.as_slice() {
        [Effect::ScheduleReconnect { after, delay }] => {
            assert_eq!(*after, conn_id);
            *delay
        }
        other => panic!("expected a scheduled reconnect, got {other:?}"),
    };
    let (state, effects) = update(state, Msg::ReconnectTimerFired { after: conn_id });
    let transport = match effects.as_slice() {
        [Effect::Connect { transport, .. }] => *transport,
        other => panic!("expected a connect, got {other:?}"),
    };
    (state, delay, transport)
}

#[test]
fn delay_doubles_and_caps() {
    let policy = ReconnectPolicy::default();

    assert_eq!(policy.delay_for(0), Duration::from_secs(1));
    assert_eq!(policy.delay_for(1), Duration::from_secs(2));
    assert_eq!(policy.delay_for(4), Duration::from_secs(16));
    assert_eq!(policy.delay_for(5), Duration::from_secs(30));
    assert_eq!(policy.delay_for(40), Duration::from_secs(30));
    assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(30));
}

#[test]
fn delays_are_non_decreasing_and_bounded() {
    let policy = ClientPolicy::default();
    let (mut state, _) = update(ConnState::with_policy(policy), Msg::SubscriberAdded);

    let mut previous = Duration::ZERO;
    for _ in 0..20 {
        let (next, delay, _) = fail_once(state);
        assert!(delay >= previous, "{delay:?} < {previous:?}");
        assert!(delay <= policy.reconnect.max_delay);
        previous = delay;
        state = next;
    }
    assert_eq!(previous, policy.reconnect.max_delay);
}

#[test]
fn falls_back_to_sse_after_threshold() {
    let (mut state, _) = update(ConnState::new(), Msg::SubscriberAdded);

    let mut transports = Vec::new();
    for _ in 0..5 {
        let (next, _, transport) = fail_once(state);
        transports.push(transport);
        state = next;
    }

    assert_eq!(
        transports,
        vec![
            TransportKind::WebSocket,
            TransportKind::WebSocket,
            TransportKind::Sse,
            TransportKind::Sse,
            TransportKind::Sse,
        ]
    );
}

#[test]
fn successful_open_resets_attempts_but_keeps_sse() {
    let (mut state, _) = update(ConnState::new(), Msg::SubscriberAdded);
    for _ in 0..3 {
        let (next, _, _) = fail_once(state);
        state = next;
    }
    let conn_id = state.conn_id();
    let (state, _) = update(state, Msg::TransportOpened { conn_id });
    assert_eq!(state.attempt(), 0);

    let (_, delay, transport) = fail_once(state);
    assert_eq!(delay, Duration::from_secs(1));
    assert_eq!(transport, TransportKind::Sse);
}

#[test]
fn sse_retry_hint_overrides_backoff() {
    let policy = ClientPolicy {
        support: TransportSupport {
            websocket: false,
            sse: true,
        },
        ..ClientPolicy::default()
    };
    let (state, _) = update(ConnState::with_policy(policy), Msg::SubscriberAdded);
    let (state, _) = update(state, Msg::TransportOpened { conn_id: 1 });
    let (state, _) = update(
        state,
        Msg::RetryHint {
            conn_id: 1,
            delay: Duration::from_millis(2500),
        },
    );

    let (state, first, _) = fail_once(state);
    let (_, second, _) = fail_once(state);
    assert_eq!(first, Duration::from_millis(2500));
    assert_eq!(second, Duration::from_millis(2500));
}

#[test]
fn retry_hint_ignored_on_websocket_and_capped_on_sse() {
    let (state, _) = update(ConnState::new(), Msg::SubscriberAdded);
    let (state, _) = update(
        state,
        Msg::RetryHint {
            conn_id: 1,
            delay: Duration::from_secs(120),
        },
    );
    let (_, delay, _) = fail_once(state);
    assert_eq!(delay, Duration::from_secs(1));

    let policy = ClientPolicy {
        support: TransportSupport {
            websocket: false,
            sse: true,
        },
        ..ClientPolicy::default()
    };
    let (state, _) = update(ConnState::with_policy(policy), Msg::SubscriberAdded);
    let (state, _) = update(
        state,
        Msg::RetryHint {
            conn_id: 1,
            delay: Duration::from_secs(120),
        },
    );
    let (_, delay, _) = fail_once(state);
    assert_eq!(delay, policy.reconnect.max_delay);
}

#[test]
fn without_sse_websocket_retries_forever() {
    let policy = ClientPolicy {
        support: TransportSupport {
            websocket: true,
            sse: false,
        },
        ..ClientPolicy::default()
    };
    let (mut state, _) = update(ConnState::with_policy(policy), Msg::SubscriberAdded);
    for _ in 0..10 {
        let (next, _, transport) = fail_once(state);
        assert_eq!(transport, TransportKind::WebSocket);
        state = next;
    }
    assert_eq!(state.attempt(), 10);
}

use std::time::Duration;

use crate::{ConnId, StatusEvent, TransportKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Connect {
        conn_id: ConnId,
        transport: TransportKind,
    },
    CloseTransport {
        conn_id: ConnId,
    },
    ScheduleReconnect {
        after: ConnId,
        delay: Duration,
    },
    CancelReconnect,
    Dispatch(StatusEvent),
}

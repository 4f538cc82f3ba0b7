use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use feed_core::{
    update, ClientPolicy, ConnId, ConnState, ConnectionView, Effect, Msg, StatusEvent,
    TransportKind,
};
use feed_logging::{feed_debug, feed_error, feed_info, feed_warn};

use crate::endpoint::display_url;
use crate::transport::Connector;
use crate::{ClientError, ClientSettings, Endpoints, Frame, SseConnector, WsConnector};

type Handler = Arc<dyn Fn(&StatusEvent) + Send + Sync>;
type SubscriberId = u64;

enum Command {
    Subscribe { id: SubscriberId, handler: Handler },
    Unsubscribe { id: SubscriberId },
    Shutdown,
    Stop,
}

enum DriverInput {
    Command(Command),
    Msg(Msg),
}

/// Snapshot published after every driver step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClientStatus {
    pub connection: ConnectionView,
    /// A transport task is alive (connecting or connected).
    pub transport_open: bool,
    /// A reconnect timer is pending.
    pub timer_armed: bool,
}

/// Shared live status feed. Cloning is cheap; all clones share one connection.
///
/// The connection opens with the first subscription and closes when the last
/// one is dropped. Dropping every clone stops the background driver.
#[derive(Clone)]
pub struct StatusClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    cmd_tx: mpsc::UnboundedSender<DriverInput>,
    next_id: AtomicU64,
    status_rx: watch::Receiver<ClientStatus>,
}

impl Drop for ClientInner {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(DriverInput::Command(Command::Stop));
    }
}

impl StatusClient {
    /// Builds a client with the WebSocket and SSE connectors. Must be called
    /// from within a tokio runtime.
    pub fn new(settings: ClientSettings) -> Result<Self, ClientError> {
        let endpoints = Endpoints::resolve(&settings.endpoints)?;
        Self::with_connectors(
            endpoints,
            settings.policy,
            Arc::new(WsConnector::new(settings.transport.clone())),
            Arc::new(SseConnector::new(settings.transport)),
        )
    }

    pub fn with_connectors(
        endpoints: Endpoints,
        policy: ClientPolicy,
        websocket: Arc<dyn Connector>,
        sse: Arc<dyn Connector>,
    ) -> Result<Self, ClientError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| ClientError::NoRuntime)?;
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(ClientStatus::default());

        let driver = Driver {
            state: ConnState::with_policy(policy),
            endpoints,
            websocket,
            sse,
            handlers: BTreeMap::new(),
            tx: cmd_tx.clone(),
            live: None,
            timer: None,
            status_tx,
        };
        runtime.spawn(driver.run(cmd_rx));

        Ok(Self {
            inner: Arc::new(ClientInner {
                cmd_tx,
                next_id: AtomicU64::new(1),
                status_rx,
            }),
        })
    }

    /// Registers `handler` for every decoded status event. Never fails; if the
    /// driver has stopped the subscription is inert.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&StatusEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let _ = self
            .inner
            .cmd_tx
            .send(DriverInput::Command(Command::Subscribe {
                id,
                handler: Arc::new(handler),
            }));
        Subscription {
            id,
            cmd_tx: Some(self.inner.cmd_tx.clone()),
        }
    }

    /// Watch channel of connection snapshots.
    pub fn status(&self) -> watch::Receiver<ClientStatus> {
        self.inner.status_rx.clone()
    }

    /// Drops every subscriber and releases the connection.
    pub fn shutdown(&self) {
        let _ = self
            .inner
            .cmd_tx
            .send(DriverInput::Command(Command::Shutdown));
    }
}

/// Handle returned by [`StatusClient::subscribe`]. Dropping it unsubscribes.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    id: SubscriberId,
    cmd_tx: Option<mpsc::UnboundedSender<DriverInput>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(DriverInput::Command(Command::Unsubscribe { id: self.id }));
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

struct LiveTransport {
    conn_id: ConnId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

/// Owns the state machine; all inputs are serialized through one channel.
struct Driver {
    state: ConnState,
    endpoints: Endpoints,
    websocket: Arc<dyn Connector>,
    sse: Arc<dyn Connector>,
    handlers: BTreeMap<SubscriberId, Handler>,
    tx: mpsc::UnboundedSender<DriverInput>,
    live: Option<LiveTransport>,
    timer: Option<JoinHandle<()>>,
    status_tx: watch::Sender<ClientStatus>,
}

impl Driver {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<DriverInput>) {
        while let Some(input) = rx.recv().await {
            match input {
                DriverInput::Command(Command::Subscribe { id, handler }) => {
                    self.handlers.insert(id, handler);
                    self.apply(Msg::SubscriberAdded);
                }
                DriverInput::Command(Command::Unsubscribe { id }) => {
                    if self.handlers.remove(&id).is_some() {
                        self.apply(Msg::SubscriberRemoved);
                    }
                }
                DriverInput::Command(Command::Shutdown) => {
                    self.handlers.clear();
                    self.apply(Msg::Shutdown);
                }
                DriverInput::Command(Command::Stop) => {
                    self.handlers.clear();
                    self.apply(Msg::Shutdown);
                    break;
                }
                DriverInput::Msg(msg) => {
                    self.reap(&msg);
                    self.apply(msg);
                }
            }
        }
        feed_debug!("status client driver stopped");
    }

    /// Forgets task handles that finished on their own.
    fn reap(&mut self, msg: &Msg) {
        match msg {
            Msg::TransportClosed { conn_id } => {
                if self.live.as_ref().is_some_and(|live| live.conn_id == *conn_id) {
                    self.live = None;
                }
            }
            Msg::ReconnectTimerFired { after } if *after == self.state.conn_id() => {
                self.timer = None;
            }
            _ => {}
        }
    }

    fn apply(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let dirty = state.consume_dirty();
        self.state = state;

        let mut touched = dirty;
        for effect in effects {
            touched |= !matches!(effect, Effect::Dispatch(_));
            self.execute(effect);
        }
        if touched {
            self.publish();
        }
    }

    fn publish(&self) {
        let next = ClientStatus {
            connection: self.state.view(),
            transport_open: self.live.is_some(),
            timer_armed: self.timer.is_some(),
        };
        self.status_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::Connect { conn_id, transport } => self.connect(conn_id, transport),
            Effect::CloseTransport { conn_id } => {
                if let Some(live) = self.live.take() {
                    feed_info!("closing connection {}", conn_id);
                    live.cancel.cancel();
                    live.task.abort();
                }
            }
            Effect::ScheduleReconnect { after, delay } => {
                if let Some(timer) = self.timer.take() {
                    timer.abort();
                }
                feed_info!("reconnecting in {:?}", delay);
                let tx = self.tx.clone();
                self.timer = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(DriverInput::Msg(Msg::ReconnectTimerFired { after }));
                }));
            }
            Effect::CancelReconnect => {
                if let Some(timer) = self.timer.take() {
                    timer.abort();
                }
            }
            Effect::Dispatch(event) => self.dispatch(&event),
        }
    }

    fn connect(&mut self, conn_id: ConnId, transport: TransportKind) {
        if let Some(previous) = self.live.take() {
            previous.cancel.cancel();
            previous.task.abort();
        }

        let connector = match transport {
            TransportKind::WebSocket => self.websocket.clone(),
            TransportKind::Sse => self.sse.clone(),
        };
        let url = self.endpoints.url_for(transport).clone();
        feed_info!(
            "connection {} opening via {} to {}",
            conn_id,
            transport,
            display_url(&url)
        );

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = pump_transport(connector.as_ref(), &url, conn_id, &tx) => {}
            }
        });
        self.live = Some(LiveTransport {
            conn_id,
            cancel,
            task,
        });
    }

    fn dispatch(&self, event: &StatusEvent) {
        feed_debug!("dispatching {} to {} subscribers", event, self.handlers.len());
        for handler in self.handlers.values() {
            if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
                feed_error!("status subscriber panicked while handling {}", event);
            }
        }
    }
}

async fn pump_transport(
    connector: &dyn Connector,
    url: &Url,
    conn_id: ConnId,
    tx: &mpsc::UnboundedSender<DriverInput>,
) {
    match connector.open(url).await {
        Ok(mut frames) => {
            let _ = tx.send(DriverInput::Msg(Msg::TransportOpened { conn_id }));
            while let Some(item) = frames.next().await {
                let msg = match item {
                    Ok(Frame::Message(text)) => Msg::FrameReceived { conn_id, text },
                    Ok(Frame::RetryHint(delay)) => Msg::RetryHint { conn_id, delay },
                    Err(err) => {
                        feed_warn!("connection {} dropped: {}", conn_id, err);
                        break;
                    }
                };
                if tx.send(DriverInput::Msg(msg)).is_err() {
                    return;
                }
            }
            feed_info!("connection {} closed", conn_id);
        }
        Err(err) => feed_warn!("connection {} failed to open: {}", conn_id, err),
    }
    let _ = tx.send(DriverInput::Msg(Msg::TransportClosed { conn_id }));
}

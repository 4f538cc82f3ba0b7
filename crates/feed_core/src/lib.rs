//! Status feed core: event schema, reconnect policy and the pure connection
//! state machine.
mod effect;
mod event;
mod msg;
mod policy;
mod state;
mod toast;
mod update;
mod view_model;

pub use effect::Effect;
pub use event::{decode_frame, DecodeError, DetectionStatus, EventKind, StatusEvent, SyncStatus};
pub use msg::Msg;
pub use policy::{ClientPolicy, ReconnectPolicy, TransportSupport};
pub use state::{ConnId, ConnState, Phase, TransportKind};
pub use toast::{toast_for, Toast, ToastLevel};
pub use update::update;
pub use view_model::ConnectionView;

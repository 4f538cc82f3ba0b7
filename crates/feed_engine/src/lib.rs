//! Status feed engine: transports, endpoint resolution and the client driver
//! that executes state-machine effects.
mod client;
mod endpoint;
mod settings;
mod sse;
mod transport;
mod types;
mod ws;

pub use client::{ClientStatus, StatusClient, Subscription};
pub use endpoint::{EndpointConfig, EndpointError, Endpoints};
pub use settings::{ClientSettings, TransportSettings};
pub use sse::{SseConnector, SseParser};
pub use transport::{Connector, FrameStream};
pub use types::{ClientError, Frame, TransportError};
pub use ws::WsConnector;

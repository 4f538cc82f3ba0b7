use futures_util::stream::BoxStream;
use url::Url;

use crate::{Frame, TransportError};

/// Frames of one open connection. The stream ends when the peer closes.
pub type FrameStream = BoxStream<'static, Result<Frame, TransportError>>;

#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// Performs the handshake and returns the live frame stream.
    async fn open(&self, url: &Url) -> Result<FrameStream, TransportError>;
}

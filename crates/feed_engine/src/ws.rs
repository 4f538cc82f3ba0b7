use futures_util::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::COOKIE;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use url::Url;

use feed_logging::feed_warn;

use crate::transport::{Connector, FrameStream};
use crate::{Frame, TransportError, TransportSettings};

#[derive(Debug, Clone)]
pub struct WsConnector {
    settings: TransportSettings,
}

impl WsConnector {
    pub fn new(settings: TransportSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl Connector for WsConnector {
    async fn open(&self, url: &Url) -> Result<FrameStream, TransportError> {
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|err| TransportError::InvalidUrl(err.to_string()))?;
        if let Some(cookie) = self.settings.session_cookie.as_deref() {
            let value = HeaderValue::from_str(cookie)
                .map_err(|err| TransportError::InvalidCookie(err.to_string()))?;
            request.headers_mut().insert(COOKIE, value);
        }

        let (socket, _response) =
            tokio::time::timeout(self.settings.connect_timeout, connect_async(request))
                .await
                .map_err(|_| TransportError::Timeout)?
                .map_err(map_ws_error)?;

        // Pings are answered by tungstenite while the stream is being read.
        let frames = socket.filter_map(|message| async move {
            match message {
                Ok(Message::Text(text)) => Some(Ok(Frame::Message(text.as_str().to_owned()))),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => Some(Ok(Frame::Message(text))),
                    Err(_) => {
                        feed_warn!("dropping non utf-8 binary frame ({} bytes)", bytes.len());
                        None
                    }
                },
                Ok(_) => None,
                Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => None,
                Err(err) => Some(Err(map_ws_error(err))),
            }
        });

        Ok(frames.boxed())
    }
}

fn map_ws_error(err: WsError) -> TransportError {
    match err {
        WsError::Http(response) => TransportError::HttpStatus(response.status().as_u16()),
        WsError::Url(err) => TransportError::InvalidUrl(err.to_string()),
        WsError::Io(err) if err.kind() == std::io::ErrorKind::TimedOut => TransportError::Timeout,
        WsError::Io(err) => TransportError::Network(err.to_string()),
        other => TransportError::WebSocket(other.to_string()),
    }
}

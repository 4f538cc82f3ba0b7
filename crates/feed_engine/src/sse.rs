use std::time::Duration;

use bytes::{Buf, BytesMut};
use futures_util::{stream, StreamExt};
use reqwest::header::{HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, COOKIE};
use url::Url;

use feed_logging::feed_debug;

use crate::transport::{Connector, FrameStream};
use crate::{Frame, TransportError, TransportSettings};

const EVENT_STREAM: &str = "text/event-stream";
const BOM: &[u8] = b"\xEF\xBB\xBF";

/// Server-Sent Events transport over a streaming HTTP GET.
#[derive(Debug, Clone)]
pub struct SseConnector {
    settings: TransportSettings,
}

impl SseConnector {
    pub fn new(settings: TransportSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, TransportError> {
        // No overall request timeout: the body is a long-lived stream.
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .build()
            .map_err(|err| TransportError::Network(err.to_string()))
    }
}

#[async_trait::async_trait]
impl Connector for SseConnector {
    async fn open(&self, url: &Url) -> Result<FrameStream, TransportError> {
        let client = self.build_client()?;
        let mut request = client
            .get(url.as_str())
            .header(ACCEPT, EVENT_STREAM)
            .header(CACHE_CONTROL, "no-cache");
        if let Some(cookie) = self.settings.session_cookie.as_deref() {
            let value = HeaderValue::from_str(cookie)
                .map_err(|err| TransportError::InvalidCookie(err.to_string()))?;
            request = request.header(COOKIE, value);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !is_event_stream(&content_type) {
            return Err(TransportError::UnsupportedContentType { content_type });
        }

        let mut parser = SseParser::new();
        let frames = response
            .bytes_stream()
            .map(move |chunk| match chunk {
                Ok(bytes) => parser.feed(&bytes).into_iter().map(Ok).collect::<Vec<_>>(),
                Err(err) => vec![Err(map_reqwest_error(err))],
            })
            .flat_map(stream::iter);

        Ok(frames.boxed())
    }
}

fn is_event_stream(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    mime.eq_ignore_ascii_case(EVENT_STREAM)
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::Timeout;
    }
    TransportError::Network(err.to_string())
}

/// Incremental parser for the `text/event-stream` format.
///
/// Bytes may be split anywhere, including inside a CRLF pair or the BOM.
/// Only unnamed and `message` events are surfaced; `id` fields are ignored.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: BytesMut,
    data: String,
    event: String,
    skip_lf: bool,
    bom_checked: bool,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);
        let mut frames = Vec::new();

        if !self.bom_checked {
            if self.buffer.len() < BOM.len() && BOM.starts_with(&self.buffer) {
                return frames;
            }
            if self.buffer.starts_with(BOM) {
                self.buffer.advance(BOM.len());
            }
            self.bom_checked = true;
        }

        loop {
            if self.skip_lf {
                match self.buffer.first() {
                    None => break,
                    Some(b'\n') => self.buffer.advance(1),
                    Some(_) => {}
                }
                self.skip_lf = false;
            }

            let Some(end) = self
                .buffer
                .iter()
                .position(|byte| *byte == b'\n' || *byte == b'\r')
            else {
                break;
            };
            let line = self.buffer.split_to(end);
            if self.buffer[0] == b'\r' {
                self.skip_lf = true;
            }
            self.buffer.advance(1);

            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }

        frames
    }

    fn process_line(&mut self, line: &str) -> Option<Frame> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
                None
            }
            "event" => {
                self.event = value.to_string();
                None
            }
            "retry" if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) => value
                .parse::<u64>()
                .ok()
                .map(|millis| Frame::RetryHint(Duration::from_millis(millis))),
            _ => None,
        }
    }

    fn dispatch(&mut self) -> Option<Frame> {
        let event = std::mem::take(&mut self.event);
        if self.data.is_empty() {
            return None;
        }
        let mut data = std::mem::take(&mut self.data);
        data.pop();
        if event.is_empty() || event == "message" {
            Some(Frame::Message(data))
        } else {
            feed_debug!("ignoring sse event named {:?}", event);
            None
        }
    }
}

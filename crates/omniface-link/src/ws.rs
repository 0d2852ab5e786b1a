//! WebSocket link via `tokio-tungstenite`.

use crate::transport::{Connector, Link, LinkEvent, TransportError};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Close frame received without a status code.
const NO_STATUS_RECEIVED: u16 = 1005;

/// Connector for `ws://` and `wss://` URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn open(&self, url: &str) -> Result<Box<dyn Link>, TransportError> {
        let (stream, response) = tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| match e {
                tungstenite::Error::Http(response) => TransportError::Rejected {
                    status: response.status().as_u16(),
                },
                other => TransportError::Handshake(other.to_string()),
            })?;
        tracing::debug!(status = %response.status(), "websocket handshake complete");
        Ok(Box::new(WsLink {
            stream,
            failed: false,
        }))
    }
}

pub struct WsLink {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// Set after a read error; the stream is treated as ended from then on.
    failed: bool,
}

#[async_trait]
impl Link for WsLink {
    async fn next_event(&mut self) -> Option<LinkEvent> {
        if self.failed {
            return None;
        }
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(LinkEvent::Text(text)),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => return Some(LinkEvent::Text(text)),
                    Err(_) => tracing::debug!("ignoring non-UTF-8 binary message"),
                },
                Ok(Message::Close(frame)) => {
                    let (code, reason) = match frame {
                        Some(f) => (u16::from(f.code), f.reason.into_owned()),
                        None => (NO_STATUS_RECEIVED, String::new()),
                    };
                    return Some(LinkEvent::Closed { code, reason });
                }
                // Ping/pong are answered by tungstenite itself.
                Ok(_) => {}
                Err(e) => {
                    self.failed = true;
                    return Some(LinkEvent::Failed(e.to_string()));
                }
            }
        }
    }

    async fn close(&mut self, code: u16, reason: &str) -> Result<(), TransportError> {
        self.stream
            .close(Some(CloseFrame {
                code: CloseCode::from(code),
                reason: reason.into(),
            }))
            .await
            .map_err(|e| TransportError::Close(e.to_string()))
    }
}

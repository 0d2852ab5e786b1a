use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("handshake failed: {0}")]
    Handshake(String),
    /// The server answered the upgrade request with a non-101 HTTP status.
    #[error("handshake rejected with HTTP {status}")]
    Rejected { status: u16 },
    #[error("close failed: {0}")]
    Close(String),
}

impl TransportError {
    /// The handshake was refused because of the credential (HTTP 401/403).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TransportError::Rejected { status: 401 | 403 })
    }
}

/// Something that happened on an open link, in delivery order.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkEvent {
    /// A text payload (or a binary payload holding UTF-8).
    Text(String),
    /// The peer closed the connection.
    Closed { code: u16, reason: String },
    /// Transport-level failure. A `Closed` event or end of stream follows.
    Failed(String),
}

/// One open bidirectional stream to the backend.
#[async_trait]
pub trait Link: Send {
    /// Next event, or `None` once the stream has ended.
    async fn next_event(&mut self) -> Option<LinkEvent>;

    /// Initiate a close handshake with the given code.
    async fn close(&mut self, code: u16, reason: &str) -> Result<(), TransportError>;
}

/// Opens links. Resolves once the handshake has completed.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self, url: &str) -> Result<Box<dyn Link>, TransportError>;
}

//! Channel-backed transport fakes for session and registry tests.

use async_trait::async_trait;
use omniface_core::ViewState;
use omniface_link::{Connector, Link, LinkEvent, TransportError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::session::StreamSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handshake {
    Accept,
    Reject,
    /// The server answers the upgrade with this HTTP status.
    RejectStatus(u16),
    /// Never completes.
    Hang,
}

/// Records every `open` and hands out a scriptable peer per accepted link.
pub struct MockConnector {
    handshake: Mutex<Handshake>,
    opens: AtomicUsize,
    urls: Mutex<Vec<String>>,
    peers: Mutex<Vec<MockPeer>>,
}

impl MockConnector {
    pub fn new() -> Arc<Self> {
        Self::with_handshake(Handshake::Accept)
    }

    pub fn with_handshake(handshake: Handshake) -> Arc<Self> {
        Arc::new(Self {
            handshake: Mutex::new(handshake),
            opens: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
            peers: Mutex::new(Vec::new()),
        })
    }

    pub fn set_handshake(&self, handshake: Handshake) {
        *self.handshake.lock().unwrap() = handshake;
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    /// Peer of the `index`-th accepted link.
    pub fn peer(&self, index: usize) -> MockPeer {
        self.peers.lock().unwrap()[index].clone()
    }

    pub fn peer_count(&self) -> usize {
        self.peers.lock().unwrap().len()
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn open(&self, url: &str) -> Result<Box<dyn Link>, TransportError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        let handshake = *self.handshake.lock().unwrap();
        match handshake {
            Handshake::Reject => Err(TransportError::Handshake("connection refused".into())),
            Handshake::RejectStatus(status) => Err(TransportError::Rejected { status }),
            Handshake::Hang => std::future::pending().await,
            Handshake::Accept => {
                let (tx, rx) = mpsc::unbounded_channel();
                let closed = Arc::new(Mutex::new(None));
                self.peers.lock().unwrap().push(MockPeer {
                    tx: Arc::new(Mutex::new(Some(tx))),
                    closed: Arc::clone(&closed),
                });
                Ok(Box::new(MockLink { rx, closed }))
            }
        }
    }
}

struct MockLink {
    rx: mpsc::UnboundedReceiver<LinkEvent>,
    closed: Arc<Mutex<Option<u16>>>,
}

#[async_trait]
impl Link for MockLink {
    async fn next_event(&mut self) -> Option<LinkEvent> {
        self.rx.recv().await
    }

    async fn close(&mut self, code: u16, _reason: &str) -> Result<(), TransportError> {
        *self.closed.lock().unwrap() = Some(code);
        Ok(())
    }
}

/// The backend side of a mock link.
#[derive(Clone)]
pub struct MockPeer {
    tx: Arc<Mutex<Option<mpsc::UnboundedSender<LinkEvent>>>>,
    closed: Arc<Mutex<Option<u16>>>,
}

impl MockPeer {
    pub fn send(&self, event: LinkEvent) {
        if let Some(tx) = self.tx.lock().unwrap().as_ref() {
            let _ = tx.send(event);
        }
    }

    pub fn send_text(&self, text: &str) {
        self.send(LinkEvent::Text(text.to_string()));
    }

    /// Drop the sending side; the link reports end of stream.
    pub fn hang_up(&self) {
        self.tx.lock().unwrap().take();
    }

    pub fn closed_code(&self) -> Option<u16> {
        *self.closed.lock().unwrap()
    }

    /// Wait until the session closed this link; returns the close code.
    pub async fn wait_closed(&self) -> u16 {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(code) = self.closed_code() {
                    return code;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("link was not closed")
    }
}

/// Frame message JSON with `faces` dummy detections, stamped with the current time.
pub fn frame_json(frame: &str, fps: f64, faces: usize) -> String {
    let face = r#"{"bbox":[10,10,60,80],"nombre":"Ana","similitud":0.91,"emocion":"neutral"}"#;
    let faces = vec![face; faces].join(",");
    let timestamp = chrono::Utc::now().timestamp_millis() as f64 / 1000.0;
    format!(
        r#"{{"type":"frame","frame":"{frame}","faces":[{faces}],"fps":{fps},"timestamp":{timestamp}}}"#
    )
}

/// Wait until `pred` holds for the session state and return that state.
pub async fn wait_for_state(
    session: &StreamSession,
    pred: impl FnMut(&ViewState) -> bool,
) -> ViewState {
    let mut rx = session.subscribe();
    let state = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("timed out waiting for session state")
        .expect("session state channel closed");
    state.clone()
}

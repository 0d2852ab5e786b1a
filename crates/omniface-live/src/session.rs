//! Per-camera live stream session.
//!
//! Each `connect` spawns one link task. The task owns the transport and
//! feeds decoded messages into the shared [`ViewState`]. Every state change
//! made by a task is checked against the session's generation counter
//! under the control lock, so events from a transport that was stopped or
//! replaced are dropped.

use omniface_core::close::{ABNORMAL_CLOSURE, INVALID_TOKEN, NORMAL_CLOSURE};
use omniface_core::protocol::{self, ServerMessage};
use omniface_core::state::{CONNECTION_FAILED, TOKEN_MISSING};
use omniface_core::throttle::DEFAULT_WINDOW;
use omniface_core::{CameraId, Mode, Throttle, ViewState};
use omniface_link::{normalize_token, Connector, Endpoint, LinkEvent};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{oneshot, watch};

const STOP_REASON: &str = "Stopped by user";

/// Tunables shared by every session of a registry.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Minimum interval between two applied frames.
    pub throttle_window: Duration,
    /// Handshake deadline; an unfinished handshake is abandoned as a transport error.
    pub connect_timeout: Duration,
    /// Samples kept in the fps/latency histories.
    pub history_len: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            throttle_window: DEFAULT_WINDOW,
            connect_timeout: Duration::from_secs(10),
            history_len: omniface_core::history::HISTORY_LEN,
        }
    }
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Connecting,
    Connected,
    ConnectedPaused,
    /// A transport-level error was reported; `ViewState::error` holds it.
    Errored,
}

/// Handle to the live stream of one camera. Cloning yields the same session;
/// the transport is closed when the last clone is dropped.
#[derive(Clone)]
pub struct StreamSession {
    core: Arc<SessionCore>,
}

struct SessionCore {
    endpoint: Endpoint,
    connector: Arc<dyn Connector>,
    options: SessionOptions,
    shared: Arc<Shared>,
}

/// State reachable from both the handle and the link task.
struct Shared {
    camera: CameraId,
    state: watch::Sender<ViewState>,
    control: Mutex<Control>,
}

#[derive(Default)]
struct Control {
    /// Bumped by `connect`, `stop` and drop; link tasks carry the value they started with.
    generation: u64,
    active: Option<ActiveLink>,
    transport_failed: bool,
}

struct ActiveLink {
    open: bool,
    stop_tx: oneshot::Sender<()>,
}

impl StreamSession {
    pub fn new(
        camera: CameraId,
        endpoint: Endpoint,
        connector: Arc<dyn Connector>,
        options: SessionOptions,
    ) -> Self {
        let (state, _) = watch::channel(ViewState::with_history_len(options.history_len));
        Self {
            core: Arc::new(SessionCore {
                endpoint,
                connector,
                options,
                shared: Arc::new(Shared {
                    camera,
                    state,
                    control: Mutex::new(Control::default()),
                }),
            }),
        }
    }

    pub fn camera(&self) -> CameraId {
        self.core.shared.camera
    }

    /// Snapshot of the current view state.
    pub fn state(&self) -> ViewState {
        self.core.shared.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.core.shared.state.subscribe()
    }

    /// True if both handles refer to the same session.
    pub fn ptr_eq(&self, other: &StreamSession) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }

    pub fn phase(&self) -> SessionPhase {
        let control = self.core.shared.control();
        if control.transport_failed {
            return SessionPhase::Errored;
        }
        match &control.active {
            Some(active) if !active.open => SessionPhase::Connecting,
            Some(_) => {
                if self.core.shared.state.borrow().paused {
                    SessionPhase::ConnectedPaused
                } else {
                    SessionPhase::Connected
                }
            }
            None => SessionPhase::Idle,
        }
    }

    /// Open the stream for this session's camera.
    ///
    /// No-op while a transport is connecting or open. A missing token sets
    /// the error and opens nothing. Outside a Tokio runtime the attempt is
    /// reported as a connection failure.
    pub fn connect(&self, mode: Mode, token: &str) {
        let shared = &self.core.shared;
        let camera = shared.camera;
        let mut control = shared.control();

        if control.active.is_some() {
            tracing::debug!(camera = %camera, "connect ignored; transport already active");
            return;
        }

        let Some(token) = normalize_token(token) else {
            tracing::warn!(camera = %camera, "connect without token");
            shared
                .state
                .send_modify(|s| s.error = Some(TOKEN_MISSING.to_string()));
            return;
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::warn!(camera = %camera, error = %err, "connect outside a Tokio runtime");
                control.transport_failed = true;
                shared
                    .state
                    .send_modify(|s| s.error = Some(CONNECTION_FAILED.to_string()));
                return;
            }
        };

        control.generation += 1;
        control.transport_failed = false;
        let generation = control.generation;
        let (stop_tx, stop_rx) = oneshot::channel();
        control.active = Some(ActiveLink {
            open: false,
            stop_tx,
        });
        drop(control);

        tracing::info!(
            camera = %camera,
            mode = %mode,
            host = self.core.endpoint.host(),
            "connecting"
        );

        runtime.spawn(run_link(LinkTask {
            shared: Arc::clone(shared),
            connector: Arc::clone(&self.core.connector),
            url: self.core.endpoint.stream_url(camera, token, mode),
            generation,
            options: self.core.options.clone(),
            stop_rx,
        }));
    }

    /// Hold the current frame; metadata keeps updating.
    pub fn pause(&self) {
        self.core.shared.state.send_modify(|s| s.paused = true);
    }

    pub fn resume(&self) {
        self.core.shared.state.send_modify(|s| s.paused = false);
    }

    /// Close the transport (normal closure) and reset to the blank state
    /// immediately. Idempotent.
    pub fn stop(&self) {
        let shared = &self.core.shared;
        let mut control = shared.control();
        control.generation += 1;
        control.transport_failed = false;
        if let Some(active) = control.active.take() {
            tracing::info!(camera = %shared.camera, "stopping stream");
            let _ = active.stop_tx.send(());
        }
        shared.state.send_if_modified(|s| {
            let blank = ViewState::with_history_len(s.fps_history.capacity());
            if *s == blank {
                false
            } else {
                *s = blank;
                true
            }
        });
    }
}

impl Drop for SessionCore {
    fn drop(&mut self) {
        let mut control = self.shared.control();
        control.generation += 1;
        if let Some(active) = control.active.take() {
            tracing::debug!(camera = %self.shared.camera, "session dropped; closing transport");
            let _ = active.stop_tx.send(());
        }
    }
}

impl Shared {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` if `generation` still owns the session.
    fn update(&self, generation: u64, f: impl FnOnce(&mut ViewState)) -> bool {
        let control = self.control();
        if control.generation != generation {
            return false;
        }
        self.state.send_modify(f);
        true
    }

    fn mark_open(&self, generation: u64) -> bool {
        let mut control = self.control();
        if control.generation != generation {
            return false;
        }
        if let Some(active) = control.active.as_mut() {
            active.open = true;
        }
        self.state.send_modify(ViewState::mark_open);
        true
    }

    fn mark_transport_error(&self, generation: u64) {
        let mut control = self.control();
        if control.generation != generation {
            return;
        }
        control.transport_failed = true;
        self.state.send_modify(ViewState::mark_transport_error);
    }

    /// The link ended with `code`; release it so `connect` can run again.
    fn mark_closed(&self, generation: u64, code: u16) {
        let mut control = self.control();
        if control.generation != generation {
            return;
        }
        control.active = None;
        control.transport_failed = false;
        self.state.send_modify(|s| s.mark_closed(code));
    }

    /// The handshake never completed; `code` is recorded as the close code.
    fn mark_handshake_failed(&self, generation: u64, code: u16) {
        let mut control = self.control();
        if control.generation != generation {
            return;
        }
        control.active = None;
        control.transport_failed = true;
        self.state.send_modify(|s| {
            s.mark_transport_error();
            s.mark_closed(code);
        });
    }

    fn handle_text(&self, generation: u64, text: &str, throttle: &mut Throttle) {
        let camera = self.camera;
        match protocol::decode(text) {
            Ok(ServerMessage::Frame(frame)) => {
                if !throttle.admit(tokio::time::Instant::now().into_std()) {
                    tracing::trace!(camera = %camera, "frame throttled");
                    return;
                }
                let now_ms = chrono::Utc::now().timestamp_millis() as f64;
                self.update(generation, |s| s.apply_frame(frame, now_ms));
            }
            Ok(ServerMessage::Error { detail }) => {
                tracing::warn!(camera = %camera, detail = %detail, "backend reported error");
                self.update(generation, |s| s.apply_error(detail));
            }
            Ok(ServerMessage::Unknown) => {
                tracing::debug!(camera = %camera, "ignoring message of unknown type");
            }
            Err(err) => {
                tracing::warn!(camera = %camera, error = %err, "ignoring malformed message");
            }
        }
    }
}

struct LinkTask {
    shared: Arc<Shared>,
    connector: Arc<dyn Connector>,
    url: String,
    generation: u64,
    options: SessionOptions,
    stop_rx: oneshot::Receiver<()>,
}

async fn run_link(task: LinkTask) {
    let LinkTask {
        shared,
        connector,
        url,
        generation,
        options,
        mut stop_rx,
    } = task;
    let camera = shared.camera;

    let opened = tokio::select! {
        biased;
        _ = &mut stop_rx => return,
        opened = tokio::time::timeout(options.connect_timeout, connector.open(&url)) => opened,
    };

    let mut link = match opened {
        Ok(Ok(link)) => link,
        Ok(Err(err)) => {
            tracing::warn!(camera = %camera, error = %err, "connection failed");
            let code = if err.is_unauthorized() {
                INVALID_TOKEN
            } else {
                ABNORMAL_CLOSURE
            };
            shared.mark_handshake_failed(generation, code);
            return;
        }
        Err(_) => {
            tracing::warn!(
                camera = %camera,
                timeout_secs = options.connect_timeout.as_secs_f32(),
                "connection timed out"
            );
            shared.mark_handshake_failed(generation, ABNORMAL_CLOSURE);
            return;
        }
    };

    if !shared.mark_open(generation) {
        let _ = link.close(NORMAL_CLOSURE, STOP_REASON).await;
        return;
    }
    tracing::info!(camera = %camera, "stream open");

    let mut throttle = Throttle::new(options.throttle_window);
    loop {
        let event = tokio::select! {
            biased;
            _ = &mut stop_rx => {
                if let Err(err) = link.close(NORMAL_CLOSURE, STOP_REASON).await {
                    tracing::debug!(camera = %camera, error = %err, "close handshake failed");
                }
                tracing::info!(camera = %camera, "stream stopped");
                return;
            }
            event = link.next_event() => event,
        };

        match event {
            Some(LinkEvent::Text(text)) => shared.handle_text(generation, &text, &mut throttle),
            Some(LinkEvent::Failed(err)) => {
                tracing::warn!(camera = %camera, error = %err, "transport error");
                shared.mark_transport_error(generation);
            }
            Some(LinkEvent::Closed { code, reason }) => {
                tracing::info!(camera = %camera, code, reason = %reason, "stream closed");
                shared.mark_closed(generation, code);
                return;
            }
            None => {
                tracing::info!(camera = %camera, "stream ended without close frame");
                shared.mark_closed(generation, ABNORMAL_CLOSURE);
                return;
            }
        }
    }
}

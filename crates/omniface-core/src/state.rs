//! Per-camera view state and the reducer applied to it by stream events.

use crate::close::CloseKind;
use crate::history::{History, HISTORY_LEN};
use crate::protocol::FrameMessage;
use crate::types::FaceObservation;

/// Shown when `connect` is called without a usable credential.
pub const TOKEN_MISSING: &str = "Token no encontrado";
/// Generic transport failure (handshake failure, network error, timeout).
pub const CONNECTION_FAILED: &str = "No se pudo conectar. Revisa consola del servidor.";
/// Backend `error` message that carried no detail.
pub const BACKEND_ERROR: &str = "Error del servidor";

/// Everything a consumer needs to render one live camera.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub connected: bool,
    pub paused: bool,
    /// Most recent base64 JPEG eligible for render.
    pub last_frame: Option<String>,
    pub faces: Vec<FaceObservation>,
    pub fps: f64,
    /// Local clock minus server frame timestamp, in milliseconds.
    pub latency: f64,
    pub fps_history: History,
    pub latency_history: History,
    pub error: Option<String>,
    /// Close code of the last transport close, if any.
    pub close_code: Option<u16>,
}

impl ViewState {
    pub fn blank() -> Self {
        Self::with_history_len(HISTORY_LEN)
    }

    pub fn with_history_len(len: usize) -> Self {
        Self {
            connected: false,
            paused: false,
            last_frame: None,
            faces: Vec::new(),
            fps: 0.0,
            latency: 0.0,
            fps_history: History::new(len),
            latency_history: History::new(len),
            error: None,
            close_code: None,
        }
    }

    /// Reset to the blank state, keeping the configured history length.
    pub fn reset(&mut self) {
        *self = Self::with_history_len(self.fps_history.capacity());
    }

    /// Apply an admitted frame. The frame image is held back while paused;
    /// everything else is updated.
    pub fn apply_frame(&mut self, msg: FrameMessage, now_ms: f64) {
        let latency = msg.latency_ms(now_ms);
        if !self.paused {
            self.last_frame = Some(msg.frame);
        }
        self.faces = msg.faces;
        self.fps = msg.fps;
        self.latency = latency;
        self.fps_history.push(msg.fps);
        self.latency_history.push(latency);
    }

    /// Application-level error pushed by the backend.
    pub fn apply_error(&mut self, detail: impl Into<String>) {
        let detail = detail.into();
        self.error = Some(if detail.trim().is_empty() {
            BACKEND_ERROR.to_string()
        } else {
            detail
        });
    }

    pub fn mark_open(&mut self) {
        self.connected = true;
        self.paused = false;
        self.error = None;
        self.close_code = None;
    }

    pub fn mark_closed(&mut self, code: u16) {
        self.connected = false;
        self.close_code = Some(code);
    }

    pub fn mark_transport_error(&mut self) {
        self.error = Some(CONNECTION_FAILED.to_string());
    }

    pub fn close_kind(&self) -> Option<CloseKind> {
        self.close_code.map(CloseKind::from_code)
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::blank()
    }
}

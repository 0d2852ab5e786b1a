//! Inbound stream messages (JSON text frames pushed by the backend).

use crate::types::FaceObservation;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A decoded server message, discriminated by its `type` field.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage {
    Frame(FrameMessage),
    Error {
        #[serde(default)]
        detail: String,
    },
    /// Any other `type`; consumers ignore it.
    #[serde(other)]
    Unknown,
}

/// Video frame plus recognition metadata.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FrameMessage {
    /// Base64-encoded JPEG.
    pub frame: String,
    #[serde(default)]
    pub faces: Vec<FaceObservation>,
    #[serde(default)]
    pub fps: f64,
    /// Server wall clock at send time, Unix seconds.
    pub timestamp: f64,
}

impl FrameMessage {
    /// Milliseconds between the server timestamp and `now_ms` (Unix millis).
    pub fn latency_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.timestamp * 1000.0
    }
}

/// Decode one text payload.
pub fn decode(text: &str) -> Result<ServerMessage, ProtocolError> {
    Ok(serde_json::from_str(text)?)
}

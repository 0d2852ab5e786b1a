//! omniface-core — Live recognition stream model.
//!
//! Decodes the messages pushed by the Omniface recognition backend and
//! reduces them into the per-camera view state that consumers render:
//! latest frame, detected faces, fps/latency and their bounded histories.
//! No I/O happens here; transports live in `omniface-link`.

pub mod close;
pub mod history;
pub mod protocol;
pub mod state;
pub mod throttle;
pub mod types;

pub use close::CloseKind;
pub use history::History;
pub use protocol::{FrameMessage, ServerMessage};
pub use state::ViewState;
pub use throttle::Throttle;
pub use types::{BoundingBox, CameraId, FaceObservation, Mode};

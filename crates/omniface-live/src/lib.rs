//! omniface-live — Live recognition sessions.
//!
//! A [`StreamSession`] owns the stream of one camera and keeps its
//! [`ViewState`](omniface_core::ViewState) current; a [`SessionRegistry`]
//! hands out exactly one session per camera for a multi-camera view.

pub mod preferences;
pub mod registry;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use preferences::{PreferencesError, ViewPreferences};
pub use registry::SessionRegistry;
pub use session::{SessionOptions, SessionPhase, StreamSession};

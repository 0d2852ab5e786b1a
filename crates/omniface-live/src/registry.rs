//! One session per camera for a multi-camera view.

use crate::preferences::ViewPreferences;
use crate::session::{SessionOptions, StreamSession};
use omniface_core::CameraId;
use omniface_link::{Connector, Endpoint};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Keyed map from camera to its [`StreamSession`].
///
/// Sessions evicted through [`remove`](Self::remove) or [`retain`](Self::retain)
/// are stopped; dropping the registry stops every session it still holds.
pub struct SessionRegistry {
    endpoint: Endpoint,
    connector: Arc<dyn Connector>,
    options: SessionOptions,
    sessions: Mutex<HashMap<CameraId, StreamSession>>,
}

impl SessionRegistry {
    pub fn new(endpoint: Endpoint, connector: Arc<dyn Connector>, options: SessionOptions) -> Self {
        Self {
            endpoint,
            connector,
            options,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<CameraId, StreamSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The session for `camera`, created blank on first request. Repeated
    /// calls for the same camera return the same session.
    pub fn get_or_create(&self, camera: CameraId) -> StreamSession {
        self.sessions()
            .entry(camera)
            .or_insert_with(|| {
                tracing::debug!(camera = %camera, "session created");
                StreamSession::new(
                    camera,
                    self.endpoint.clone(),
                    Arc::clone(&self.connector),
                    self.options.clone(),
                )
            })
            .clone()
    }

    pub fn get(&self, camera: CameraId) -> Option<StreamSession> {
        self.sessions().get(&camera).cloned()
    }

    pub fn contains(&self, camera: CameraId) -> bool {
        self.sessions().contains_key(&camera)
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }

    /// Registered cameras in ascending order.
    pub fn cameras(&self) -> Vec<CameraId> {
        let mut cameras: Vec<CameraId> = self.sessions().keys().copied().collect();
        cameras.sort();
        cameras
    }

    /// Stop and forget the session for `camera`. Returns whether one existed.
    pub fn remove(&self, camera: CameraId) -> bool {
        let removed = self.sessions().remove(&camera);
        match removed {
            Some(session) => {
                tracing::debug!(camera = %camera, "session evicted");
                session.stop();
                true
            }
            None => false,
        }
    }

    /// Stop and forget every session whose camera is not in `keep`.
    /// Returns the evicted cameras.
    pub fn retain(&self, keep: &[CameraId]) -> Vec<CameraId> {
        let evicted: Vec<StreamSession> = {
            let mut sessions = self.sessions();
            let stale: Vec<CameraId> = sessions
                .keys()
                .filter(|camera| !keep.contains(camera))
                .copied()
                .collect();
            stale
                .iter()
                .filter_map(|camera| sessions.remove(camera))
                .collect()
        };
        let mut cameras = Vec::with_capacity(evicted.len());
        for session in evicted {
            tracing::debug!(camera = %session.camera(), "session evicted");
            session.stop();
            cameras.push(session.camera());
        }
        cameras.sort();
        cameras
    }

    /// Stop every session, keeping them registered.
    pub fn stop_all(&self) {
        let sessions: Vec<StreamSession> = self.sessions().values().cloned().collect();
        for session in sessions {
            session.stop();
        }
    }

    /// Reconnect the remembered view: evict cameras that are no longer
    /// selected, then connect every selected camera in the saved mode.
    pub fn resume(&self, prefs: &ViewPreferences, token: &str) -> Vec<StreamSession> {
        let cameras = prefs.selected_cameras();
        let evicted = self.retain(&cameras);
        tracing::info!(
            cameras = ?cameras,
            evicted = ?evicted,
            mode = %prefs.mode,
            "resuming view"
        );
        cameras
            .into_iter()
            .map(|camera| {
                let session = self.get_or_create(camera);
                session.connect(prefs.mode, token);
                session
            })
            .collect()
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        self.stop_all();
    }
}

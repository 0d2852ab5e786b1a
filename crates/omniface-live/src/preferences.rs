//! Remembered multi-camera view: how many cameras, which ones, which mode.

use omniface_core::{CameraId, Mode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Maximum number of simultaneously displayed cameras.
pub const MAX_CAMERAS: usize = 3;

#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid preferences file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("camera slot {slot} out of range (slots are 0, 1 and 2)")]
    SlotOutOfRange { slot: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewPreferences {
    /// Number of camera slots shown (1..=3).
    pub camera_count: usize,
    pub mode: Mode,
    /// Camera assigned to each slot.
    pub selections: Vec<CameraId>,
    /// Slot shown in the mini preview.
    pub active_preview: usize,
}

impl Default for ViewPreferences {
    fn default() -> Self {
        Self {
            camera_count: 1,
            mode: Mode::Normal,
            selections: vec![CameraId(0); MAX_CAMERAS],
            active_preview: 0,
        }
    }
}

impl ViewPreferences {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, PreferencesError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no saved view preferences");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let mut prefs: Self = toml::from_str(&text)?;
        prefs.normalize();
        Ok(prefs)
    }

    pub fn save(&self, path: &Path) -> Result<(), PreferencesError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        tracing::debug!(path = %path.display(), "view preferences saved");
        Ok(())
    }

    /// Clamp counts into range and pad the slot list.
    pub fn normalize(&mut self) {
        self.camera_count = self.camera_count.clamp(1, MAX_CAMERAS);
        self.selections.resize(MAX_CAMERAS, CameraId(0));
        if self.active_preview >= self.camera_count {
            self.active_preview = 0;
        }
    }

    pub fn set_camera_count(&mut self, count: usize) {
        self.camera_count = count;
        self.normalize();
    }

    pub fn select(&mut self, slot: usize, camera: CameraId) -> Result<(), PreferencesError> {
        if slot >= MAX_CAMERAS {
            return Err(PreferencesError::SlotOutOfRange { slot });
        }
        self.normalize();
        self.selections[slot] = camera;
        Ok(())
    }

    pub fn set_preview(&mut self, slot: usize) -> Result<(), PreferencesError> {
        if slot >= MAX_CAMERAS {
            return Err(PreferencesError::SlotOutOfRange { slot });
        }
        self.active_preview = slot;
        self.normalize();
        Ok(())
    }

    /// Distinct cameras of the visible slots, in slot order.
    pub fn selected_cameras(&self) -> Vec<CameraId> {
        let count = self.camera_count.clamp(1, MAX_CAMERAS);
        let mut cameras = Vec::with_capacity(count);
        for camera in self.selections.iter().take(count) {
            if !cameras.contains(camera) {
                cameras.push(*camera);
            }
        }
        cameras
    }

    /// Camera shown in the mini preview.
    pub fn preview_camera(&self) -> Option<CameraId> {
        if self.active_preview >= self.camera_count {
            return None;
        }
        self.selections.get(self.active_preview).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("omniface-prefs-{}-{name}", std::process::id()))
            .join("view.toml")
    }

    #[test]
    fn test_defaults() {
        let prefs = ViewPreferences::default();
        assert_eq!(prefs.selected_cameras(), vec![CameraId(0)]);
        assert_eq!(prefs.preview_camera(), Some(CameraId(0)));
    }

    #[test]
    fn test_selected_cameras_distinct() {
        let mut prefs = ViewPreferences::default();
        prefs.set_camera_count(3);
        prefs.select(0, CameraId(2)).unwrap();
        prefs.select(1, CameraId(0)).unwrap();
        prefs.select(2, CameraId(2)).unwrap();
        assert_eq!(prefs.selected_cameras(), vec![CameraId(2), CameraId(0)]);
    }

    #[test]
    fn test_count_clamped() {
        let mut prefs = ViewPreferences::default();
        prefs.set_camera_count(7);
        assert_eq!(prefs.camera_count, MAX_CAMERAS);
        prefs.set_camera_count(0);
        assert_eq!(prefs.camera_count, 1);
    }

    #[test]
    fn test_slot_out_of_range() {
        let mut prefs = ViewPreferences::default();
        assert!(matches!(
            prefs.select(3, CameraId(1)),
            Err(PreferencesError::SlotOutOfRange { slot: 3 })
        ));
    }

    #[test]
    fn test_preview_outside_visible_slots() {
        let mut prefs = ViewPreferences::default();
        prefs.set_camera_count(2);
        prefs.select(1, CameraId(4)).unwrap();
        prefs.set_preview(1).unwrap();
        assert_eq!(prefs.preview_camera(), Some(CameraId(4)));
        prefs.set_camera_count(1);
        assert_eq!(prefs.active_preview, 0);
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip");
        let mut prefs = ViewPreferences::default();
        prefs.set_camera_count(2);
        prefs.mode = Mode::Attendance;
        prefs.select(1, CameraId(1)).unwrap();
        prefs.save(&path).unwrap();

        let loaded = ViewPreferences::load(&path).unwrap();
        assert_eq!(loaded, prefs);
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("mode = \"asistencia\""));
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_missing_is_default() {
        let loaded = ViewPreferences::load(&temp_path("missing")).unwrap();
        assert_eq!(loaded, ViewPreferences::default());
    }

    #[test]
    fn test_load_partial_file_normalized() {
        let path = temp_path("partial");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "camera_count = 9\nselections = [1]\n").unwrap();
        let loaded = ViewPreferences::load(&path).unwrap();
        assert_eq!(loaded.camera_count, MAX_CAMERAS);
        assert_eq!(
            loaded.selections,
            vec![CameraId(1), CameraId(0), CameraId(0)]
        );
        assert_eq!(loaded.mode, Mode::Normal);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}

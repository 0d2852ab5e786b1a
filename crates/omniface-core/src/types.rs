use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label the backend assigns to faces that matched no enrolled person.
pub const UNKNOWN_LABEL: &str = "Desconocido";

/// Numeric camera index as understood by the backend (`cam_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CameraId(pub u32);

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CameraId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Recognition mode requested when opening a stream.
///
/// `Attendance` and `Exit` make the backend record entries/exits for
/// recognised people; `Normal` only recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "asistencia")]
    Attendance,
    #[serde(rename = "salida")]
    Exit,
}

impl Mode {
    /// Wire value for the `modo` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Attendance => "asistencia",
            Mode::Exit => "salida",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown mode {0:?} (expected normal, asistencia or salida)")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Mode::Normal),
            "asistencia" => Ok(Mode::Attendance),
            "salida" => Ok(Mode::Exit),
            other => Err(ParseModeError(other.to_string())),
        }
    }
}

/// Face bounding box in source-frame pixel coordinates.
///
/// On the wire this is a `[x1, y1, x2, y2]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [f32; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// One detected face inside a frame message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceObservation {
    pub bbox: BoundingBox,
    /// Identity label, or [`UNKNOWN_LABEL`].
    #[serde(rename = "nombre")]
    pub label: String,
    /// Reference photo path relative to the backend's media root.
    #[serde(rename = "foto_path", default, skip_serializing_if = "Option::is_none")]
    pub photo_path: Option<String>,
    #[serde(rename = "similitud", default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
    #[serde(rename = "emocion", default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    /// Set once the person's attendance has already been recorded today.
    #[serde(rename = "registrado", default, skip_serializing_if = "Option::is_none")]
    pub recorded: Option<bool>,
}

impl FaceObservation {
    pub fn is_known(&self) -> bool {
        self.label != UNKNOWN_LABEL
    }

    pub fn is_recorded(&self) -> bool {
        self.recorded.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("normal".parse::<Mode>().unwrap(), Mode::Normal);
        assert_eq!("ASISTENCIA".parse::<Mode>().unwrap(), Mode::Attendance);
        assert_eq!(" salida ".parse::<Mode>().unwrap(), Mode::Exit);
        assert!("entrada".parse::<Mode>().is_err());
    }

    #[test]
    fn test_mode_wire_value() {
        assert_eq!(Mode::Attendance.to_string(), "asistencia");
        assert_eq!(serde_json::to_string(&Mode::Exit).unwrap(), "\"salida\"");
    }

    #[test]
    fn test_face_from_wire() {
        let face: FaceObservation = serde_json::from_str(
            r#"{"bbox":[10,20,110,140],"nombre":"Ana","foto_path":"usuario_1/ana.jpg",
                "similitud":0.83,"registrado":true}"#,
        )
        .unwrap();
        assert_eq!(
            face.bbox,
            BoundingBox {
                x1: 10.0,
                y1: 20.0,
                x2: 110.0,
                y2: 140.0,
            }
        );
        assert_eq!(face.bbox.width(), 100.0);
        assert_eq!(face.bbox.height(), 120.0);
        assert_eq!(face.label, "Ana");
        assert_eq!(face.photo_path.as_deref(), Some("usuario_1/ana.jpg"));
        assert!(face.emotion.is_none());
        assert!(face.is_known());
        assert!(face.is_recorded());
    }

    #[test]
    fn test_face_unknown_with_null_photo() {
        let face: FaceObservation = serde_json::from_str(
            r#"{"bbox":[0,0,5,5],"nombre":"Desconocido","foto_path":null,"similitud":0.12}"#,
        )
        .unwrap();
        assert!(!face.is_known());
        assert!(face.photo_path.is_none());
        assert!(!face.is_recorded());
    }

    #[test]
    fn test_bbox_rejects_short_array() {
        let r: Result<BoundingBox, _> = serde_json::from_str("[1, 2, 3]");
        assert!(r.is_err());
    }
}

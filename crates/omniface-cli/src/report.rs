//! One-line textual rendering of a camera's view state.

use omniface_core::{CameraId, FaceObservation, ViewState};
use omniface_live::SessionPhase;

pub fn phase_label(phase: SessionPhase) -> &'static str {
    match phase {
        SessionPhase::Idle => "idle",
        SessionPhase::Connecting => "connecting",
        SessionPhase::Connected => "live",
        SessionPhase::ConnectedPaused => "paused",
        SessionPhase::Errored => "error",
    }
}

fn describe_face(face: &FaceObservation) -> String {
    let mut out = face.label.clone();
    let mut details = Vec::new();
    if let Some(sim) = face.similarity {
        details.push(format!("{sim:.2}"));
    }
    if let Some(emotion) = &face.emotion {
        details.push(emotion.clone());
    }
    if !details.is_empty() {
        out.push_str(&format!(" ({})", details.join(", ")));
    }
    if face.is_recorded() {
        out.push_str(" [registrado]");
    }
    out
}

pub fn describe(camera: CameraId, phase: SessionPhase, state: &ViewState) -> String {
    let mut line = format!("cam {camera} | {}", phase_label(phase));
    if state.connected {
        line.push_str(&format!(
            " | {:.1} fps (avg {:.1}) | {:.0} ms",
            state.fps,
            state.fps_history.mean(),
            state.latency
        ));
        let faces: Vec<String> = state.faces.iter().map(describe_face).collect();
        match faces.len() {
            0 => line.push_str(" | no faces"),
            n => line.push_str(&format!(" | {n} face(s): {}", faces.join(", "))),
        }
    }
    if let Some(code) = state.close_code.filter(|_| !state.connected) {
        line.push_str(&format!(" | closed ({code})"));
    }
    if let Some(err) = &state.error {
        line.push_str(&format!(" | {err}"));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use omniface_core::{BoundingBox, FrameMessage};

    fn face(
        label: &str,
        similarity: Option<f32>,
        emotion: Option<&str>,
        recorded: bool,
    ) -> FaceObservation {
        FaceObservation {
            bbox: BoundingBox {
                x1: 0.0,
                y1: 0.0,
                x2: 1.0,
                y2: 1.0,
            },
            label: label.into(),
            photo_path: None,
            similarity,
            emotion: emotion.map(str::to_string),
            recorded: Some(recorded),
        }
    }

    #[test]
    fn test_describe_live() {
        let mut state = ViewState::blank();
        state.mark_open();
        state.apply_frame(
            FrameMessage {
                frame: "Zm9v".into(),
                faces: vec![
                    face("Ana", Some(0.912), Some("feliz"), true),
                    face("Desconocido", None, None, false),
                ],
                fps: 24.0,
                timestamp: 1.0,
            },
            1_120.0,
        );
        assert_eq!(
            describe(CameraId(0), SessionPhase::Connected, &state),
            "cam 0 | live | 24.0 fps (avg 24.0) | 120 ms | 2 face(s): Ana (0.91, feliz) [registrado], Desconocido"
        );
    }

    #[test]
    fn test_describe_closed_with_error() {
        let mut state = ViewState::blank();
        state.mark_transport_error();
        state.mark_closed(1006);
        assert_eq!(
            describe(CameraId(2), SessionPhase::Errored, &state),
            "cam 2 | error | closed (1006) | No se pudo conectar. Revisa consola del servidor."
        );
    }

    #[test]
    fn test_describe_idle() {
        assert_eq!(
            describe(CameraId(1), SessionPhase::Idle, &ViewState::blank()),
            "cam 1 | idle"
        );
    }
}

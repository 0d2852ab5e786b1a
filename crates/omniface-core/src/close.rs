//! Classification of WebSocket close codes sent by the recognition backend.

pub const NORMAL_CLOSURE: u16 = 1000;
pub const ABNORMAL_CLOSURE: u16 = 1006;
/// Token rejected. The backend refuses the upgrade with HTTP 403, which the
/// session records under this code.
pub const INVALID_TOKEN: u16 = 4401;
/// The user has no trained recognition model (preceded by an `error` message).
pub const MODEL_NOT_FOUND: u16 = 4004;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseKind {
    Normal,
    Unauthorized,
    ModelUnavailable,
    /// Connection dropped without a close frame.
    Abnormal,
    Other(u16),
}

impl CloseKind {
    pub fn from_code(code: u16) -> Self {
        match code {
            NORMAL_CLOSURE => CloseKind::Normal,
            INVALID_TOKEN => CloseKind::Unauthorized,
            MODEL_NOT_FOUND => CloseKind::ModelUnavailable,
            ABNORMAL_CLOSURE => CloseKind::Abnormal,
            other => CloseKind::Other(other),
        }
    }
}

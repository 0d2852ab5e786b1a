//! Backend address resolution and URL construction.

use omniface_core::{CameraId, Mode};

/// Port the recognition backend listens on when no override is given.
pub const DEFAULT_BACKEND_PORT: u16 = 8000;

/// Where the recognition backend lives and whether to talk to it over TLS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    secure: bool,
}

impl Endpoint {
    /// `host` is `hostname[:port]`, without scheme.
    pub fn new(host: impl Into<String>, secure: bool) -> Self {
        let host = host.into();
        let host = strip_scheme(host.trim()).trim_end_matches('/').to_string();
        Self { host, secure }
    }

    /// Use `override_host` when set and non-empty, otherwise `page_host:port`.
    pub fn resolve(override_host: Option<&str>, page_host: &str, port: u16, secure: bool) -> Self {
        match override_host.map(str::trim).filter(|h| !h.is_empty()) {
            Some(host) => Self::new(host, secure),
            None => Self::new(format!("{page_host}:{port}"), secure),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    pub fn ws_scheme(&self) -> &'static str {
        if self.secure { "wss" } else { "ws" }
    }

    pub fn http_scheme(&self) -> &'static str {
        if self.secure { "https" } else { "http" }
    }

    /// Live recognition stream URL for one camera.
    ///
    /// `token` must already be normalised (see [`normalize_token`]).
    pub fn stream_url(&self, camera: CameraId, token: &str, mode: Mode) -> String {
        format!(
            "{}://{}/recon/ws?cam_id={}&token={}&modo={}",
            self.ws_scheme(),
            self.host,
            camera,
            token,
            mode.as_str()
        )
    }

    /// REST URL for `path` (leading slash optional).
    pub fn http_url(&self, path: &str) -> String {
        format!(
            "{}://{}/{}",
            self.http_scheme(),
            self.host,
            path.trim_start_matches('/')
        )
    }
}

fn strip_scheme(host: &str) -> &str {
    for scheme in ["wss://", "ws://", "https://", "http://"] {
        if let Some(rest) = host.strip_prefix(scheme) {
            return rest;
        }
    }
    host
}

/// Strip a leading `Bearer ` prefix (any case) and surrounding whitespace.
///
/// Returns `None` when nothing usable is left.
pub fn normalize_token(raw: &str) -> Option<&str> {
    let raw = raw.trim_start();
    let token = match (raw.get(..6), raw.get(6..)) {
        (Some(prefix), Some(rest))
            if prefix.eq_ignore_ascii_case("bearer") && rest.starts_with(char::is_whitespace) =>
        {
            rest.trim()
        }
        _ => raw.trim_end(),
    };
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

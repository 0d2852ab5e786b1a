//! Camera catalog (`GET /recon/camaras`).

use crate::endpoint::Endpoint;
use omniface_core::CameraId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const CAMERAS_PATH: &str = "/recon/camaras";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected camera list payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// A camera the backend can stream from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraInfo {
    pub id: CameraId,
    pub name: String,
}

#[derive(Deserialize)]
struct CameraList {
    #[serde(rename = "camaras")]
    cameras: Vec<CameraInfo>,
}

/// Parse the `{"camaras": [...]}` body.
pub fn parse_camera_list(body: &str) -> Result<Vec<CameraInfo>, CatalogError> {
    let list: CameraList = serde_json::from_str(body)?;
    Ok(list.cameras)
}

/// HTTP client for the backend's REST surface.
pub struct CatalogClient {
    http: reqwest::Client,
    endpoint: Endpoint,
    token: Option<String>,
}

impl CatalogClient {
    pub fn new(endpoint: Endpoint, timeout: Duration) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint,
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Cameras the backend currently detects. The backend caches the probe
    /// for a few seconds, so repeated calls are cheap.
    pub async fn list_cameras(&self) -> Result<Vec<CameraInfo>, CatalogError> {
        let url = self.endpoint.http_url(CAMERAS_PATH);
        let mut request = self.http.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let body = request.send().await?.error_for_status()?.text().await?;
        let cameras = parse_camera_list(&body)?;
        tracing::debug!(count = cameras.len(), "camera catalog fetched");
        Ok(cameras)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_camera_list() {
        let cams = parse_camera_list(
            r#"{"camaras":[{"id":0,"name":"Cámara 0"},{"id":2,"name":"Cámara 2"}]}"#,
        )
        .unwrap();
        assert_eq!(
            cams,
            vec![
                CameraInfo {
                    id: CameraId(0),
                    name: "Cámara 0".into(),
                },
                CameraInfo {
                    id: CameraId(2),
                    name: "Cámara 2".into(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_empty_camera_list() {
        assert!(parse_camera_list(r#"{"camaras":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn test_parse_camera_list_rejects_other_shapes() {
        assert!(parse_camera_list(r#"[{"id":0}]"#).is_err());
    }
}

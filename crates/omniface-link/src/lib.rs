//! omniface-link — Transport layer for the Omniface recognition backend.
//!
//! Resolves the backend address, opens the per-camera live stream over
//! WebSocket and fetches the camera catalog over HTTP. The `Connector` /
//! `Link` traits are the seam the session layer is written against.

pub mod catalog;
pub mod endpoint;
pub mod transport;
pub mod ws;

pub use catalog::{CameraInfo, CatalogClient, CatalogError};
pub use endpoint::{normalize_token, Endpoint};
pub use transport::{Connector, Link, LinkEvent, TransportError};
pub use ws::WsConnector;

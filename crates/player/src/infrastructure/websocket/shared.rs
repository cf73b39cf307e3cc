//! Shared helpers for the platform-specific Socket.IO clients.
//!
//! This module is runtime-agnostic (no tokio, no web-sys) so it can be used by
//! both the desktop and WASM implementations.

use rpgboard_protocol::ENGINE_IO_VERSION;
use url::Url;

use crate::ports::outbound::TransportError;

/// How long to wait for the socket and the Engine.IO handshake.
pub const CONNECT_TIMEOUT_MS: u64 = 20_000;

/// Map the server base URL to the Socket.IO WebSocket endpoint.
///
/// `http://host:5000` becomes `ws://host:5000/socket.io/?EIO=4&transport=websocket`.
/// Any path on the base URL is replaced.
pub fn socket_io_url(server_url: &str, socket_path: &str) -> Result<Url, TransportError> {
    let invalid = |reason: String| TransportError::InvalidUrl {
        url: server_url.to_string(),
        reason,
    };

    let mut url = Url::parse(server_url).map_err(|e| invalid(e.to_string()))?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(invalid(format!("unsupported scheme '{}'", other))),
    };
    url.set_scheme(scheme)
        .map_err(|_| invalid(format!("cannot switch scheme to '{}'", scheme)))?;

    url.set_path(&format!("/{}/", socket_path.trim_matches('/')));
    url.set_query(Some(&format!(
        "EIO={}&transport=websocket",
        ENGINE_IO_VERSION
    )));
    url.set_fragment(None);
    Ok(url)
}

//! Socket.IO client transport
//!
//! Platform-specific implementations are in submodules:
//! - `desktop`: tokio-tungstenite based client
//! - `wasm`: web-sys WebSocket based client
//! - `core`: shared handshake / heartbeat / backoff logic

mod core;
mod shared;

#[cfg(not(target_arch = "wasm32"))]
mod desktop;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use self::core::{BackoffState, FrameAction, RetryDecision, SessionPhase, SocketIoSession};
pub use shared::{socket_io_url, CONNECT_TIMEOUT_MS};

// Re-export platform-specific types with unified names
#[cfg(not(target_arch = "wasm32"))]
pub use desktop::SocketIoTransport;

#[cfg(target_arch = "wasm32")]
pub use wasm::WasmSocketIoTransport as SocketIoTransport;

//! Connection state shared between a transport task and its session handle.

pub mod connection;

pub use connection::ConnectionState;
#[cfg(not(target_arch = "wasm32"))]
pub use connection::{set_connection_state, ConnectionStateObserver};

//! rpgboard Protocol - wire types shared by the player front ends
//!
//! This crate contains:
//! - Engine.IO / Socket.IO text packet codec
//! - Named realtime events (ClientEvent, ServerEvent)
//! - HTTP DTOs for the server's JSON endpoints
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde, serde_json, and thiserror
//! 2. **No I/O** - Pure data types and framing
//! 3. **WASM compatible** - Must compile for both native and wasm32 targets

pub mod api;
pub mod events;
pub mod packet;

pub use api::{HealthStatus, ServerConfig, CONFIG_PATH, HEALTH_PATH};
pub use events::{ChatMessage, ClientEvent, ServerEvent};
pub use packet::{
    EnginePacket, OpenHandshake, SocketPacket, DEFAULT_NAMESPACE, ENGINE_IO_VERSION,
};

/// Errors raised while decoding or encoding wire packets
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("empty packet")]
    Empty,
    #[error("unknown Engine.IO packet type '{0}'")]
    UnknownEngineType(char),
    #[error("unknown Socket.IO packet type '{0}'")]
    UnknownSocketType(char),
    #[error("binary packets are not supported")]
    BinaryUnsupported,
    #[error("invalid namespace in packet: {0}")]
    InvalidNamespace(String),
    #[error("event packet must be a JSON array starting with the event name")]
    InvalidEvent,
    #[error("ack packet without an id")]
    MissingAckId,
    #[error("invalid JSON payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

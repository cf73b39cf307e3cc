//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing the client to talk to the realtime server, the page and the HTTP
//! API without depending on concrete implementations.

pub mod display_port;
pub mod realtime_port;
pub mod renderer_port;
pub mod server_api_port;
pub mod session_events;

pub use display_port::{ChatInputField, StatusDisplay};
pub use realtime_port::{
    event_channel, EventReceiver, EventSender, RealtimeTransport, TransportError, TransportSession,
};
pub use renderer_port::BoardRenderer;
pub use server_api_port::{ApiError, ServerApiPort};
pub use session_events::{DisconnectReason, SessionEvent};

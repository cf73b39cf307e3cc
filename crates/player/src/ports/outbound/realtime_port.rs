//! Realtime Transport Port - Outbound port for the server's event socket
//!
//! The transport owns the socket, the handshake and reconnection. The client
//! only opens a session, emits named events and consumes `SessionEvent`s.
//!
//! Neither trait requires `Send`: the browser session holds `Rc`s to web-sys
//! objects and everything runs on one event loop.

use futures_channel::mpsc;
use rpgboard_protocol::{ClientEvent, ProtocolError};

use super::session_events::SessionEvent;

/// Sending half handed to the transport; lifecycle and inbound events flow through it.
pub type EventSender = mpsc::UnboundedSender<SessionEvent>;

/// Receiving half consumed by the front end's dispatch loop.
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Create a connected sender/receiver pair for session events.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded()
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("no async runtime available to drive the socket")]
    NoRuntime,
    #[error("not connected")]
    NotConnected,
    #[error("socket error: {0}")]
    Socket(String),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Factory for realtime sessions.
#[cfg_attr(test, mockall::automock)]
pub trait RealtimeTransport {
    /// Start a session in the background.
    ///
    /// Returns as soon as the connection attempt is scheduled. `Connected`,
    /// `Disconnected` and server events arrive later through `events`.
    fn open(&self, events: EventSender) -> Result<Box<dyn TransportSession>, TransportError>;
}

/// Handle to one open session.
///
/// Dropping the handle closes the session the same way `close()` does.
#[cfg_attr(test, mockall::automock)]
pub trait TransportSession {
    /// Emit a named event to the server.
    fn emit(&self, event: &ClientEvent) -> Result<(), TransportError>;

    /// Whether the socket is currently connected at the transport level.
    fn is_connected(&self) -> bool;

    /// Say goodbye to the server and stop reconnecting.
    fn close(&self);
}

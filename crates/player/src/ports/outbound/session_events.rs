//! Session events - everything the transport reports to the client
//!
//! Lifecycle changes and server events share one enum so the client has a
//! single dispatch point.

use std::fmt;

use rpgboard_protocol::ServerEvent;

/// Why a session ended.
///
/// `Display` uses the reason strings of the Socket.IO client so logs read the
/// same as the server's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The server sent a namespace DISCONNECT
    ServerDisconnect,
    /// `disconnect()` was called locally
    ClientDisconnect,
    /// The socket closed without a goodbye
    TransportClose,
    TransportError(String),
    /// No ping from the server within pingInterval + pingTimeout
    PingTimeout,
    /// The server refused the namespace CONNECT
    ConnectError(String),
}

impl DisconnectReason {
    /// Whether the transport should try to reconnect after this reason.
    ///
    /// A deliberate goodbye from either side, or a refused CONNECT, is final.
    pub fn allows_reconnect(&self) -> bool {
        matches!(
            self,
            DisconnectReason::TransportClose
                | DisconnectReason::TransportError(_)
                | DisconnectReason::PingTimeout
        )
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::ServerDisconnect => write!(f, "io server disconnect"),
            DisconnectReason::ClientDisconnect => write!(f, "io client disconnect"),
            DisconnectReason::TransportClose => write!(f, "transport close"),
            DisconnectReason::TransportError(e) => write!(f, "transport error: {}", e),
            DisconnectReason::PingTimeout => write!(f, "ping timeout"),
            DisconnectReason::ConnectError(e) => write!(f, "connect error: {}", e),
        }
    }
}

/// Event pushed from the transport to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Namespace CONNECT acknowledged by the server
    Connected,
    Disconnected {
        reason: DisconnectReason,
    },
    /// About to retry after `delay_ms`
    Reconnecting {
        attempt: u32,
        delay_ms: u64,
    },
    /// Retry budget exhausted
    ReconnectFailed,
    Server(ServerEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reconnect_policy_by_reason() {
        assert!(!DisconnectReason::ServerDisconnect.allows_reconnect());
        assert!(!DisconnectReason::ClientDisconnect.allows_reconnect());
        assert!(DisconnectReason::TransportClose.allows_reconnect());
        assert!(DisconnectReason::PingTimeout.allows_reconnect());
        assert!(DisconnectReason::TransportError("reset".into()).allows_reconnect());
        assert!(!DisconnectReason::ConnectError("refused".into()).allows_reconnect());
    }

    #[test]
    fn test_reason_strings() {
        assert_eq!(
            DisconnectReason::ServerDisconnect.to_string(),
            "io server disconnect"
        );
        assert_eq!(DisconnectReason::TransportClose.to_string(), "transport close");
    }
}

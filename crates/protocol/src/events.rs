//! Named realtime events exchanged with the game server
//!
//! Payloads are loosely typed on purpose: the server emits free-form JSON
//! and the player only logs or forwards it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::packet::SocketPacket;
use crate::ProtocolError;

/// Outbound chat event name
pub const CHAT_MESSAGE: &str = "chat_message";
/// Outbound echo test event name
pub const ECHO: &str = "echo";
/// Inbound generic server response
pub const RESPONSE: &str = "response";
/// Inbound character movement broadcast
pub const CHARACTER_MOVED: &str = "character_moved";

/// Payload of a `chat_message` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
}

impl ChatMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

// =============================================================================
// Client Events (Player → Server)
// =============================================================================

/// Events the player emits to the server
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    ChatMessage(ChatMessage),
    /// Server echoes the payload back as a `response` event
    Echo(Value),
}

impl ClientEvent {
    pub fn chat(text: impl Into<String>) -> Self {
        ClientEvent::ChatMessage(ChatMessage::new(text))
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::ChatMessage(_) => CHAT_MESSAGE,
            ClientEvent::Echo(_) => ECHO,
        }
    }

    pub fn payload(&self) -> Result<Value, ProtocolError> {
        Ok(match self {
            ClientEvent::ChatMessage(msg) => serde_json::to_value(msg)?,
            ClientEvent::Echo(data) => data.clone(),
        })
    }

    /// Wrap this event in a Socket.IO EVENT packet for `namespace`.
    pub fn to_packet(&self, namespace: &str) -> Result<SocketPacket, ProtocolError> {
        Ok(SocketPacket::event(
            namespace,
            self.name(),
            vec![self.payload()?],
        ))
    }
}

// =============================================================================
// Server Events (Server → Player)
// =============================================================================

/// Events the server pushes to the player
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Generic acknowledgement, usually `{"data": ...}`
    Response(Value),
    /// A character changed tile
    CharacterMoved(Value),
    /// Anything the player does not know about yet
    Other { name: String, args: Vec<Value> },
}

impl ServerEvent {
    /// Classify a decoded Socket.IO event. Only the first argument is kept for
    /// known events; a missing argument becomes `null`.
    pub fn from_event(name: String, args: Vec<Value>) -> Self {
        match name.as_str() {
            RESPONSE => ServerEvent::Response(first_arg(args)),
            CHARACTER_MOVED => ServerEvent::CharacterMoved(first_arg(args)),
            _ => ServerEvent::Other { name, args },
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ServerEvent::Response(_) => RESPONSE,
            ServerEvent::CharacterMoved(_) => CHARACTER_MOVED,
            ServerEvent::Other { name, .. } => name,
        }
    }
}

fn first_arg(args: Vec<Value>) -> Value {
    args.into_iter().next().unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_event_packet() {
        let packet = ClientEvent::chat("roll for initiative")
            .to_packet("/")
            .unwrap();

        assert_eq!(
            packet,
            SocketPacket::event(
                "/",
                "chat_message",
                vec![json!({"text": "roll for initiative"})]
            )
        );
    }

    #[test]
    fn test_echo_payload_passes_through() {
        let event = ClientEvent::Echo(json!({"test": "data"}));
        assert_eq!(event.name(), "echo");
        assert_eq!(event.payload().unwrap(), json!({"test": "data"}));
    }

    #[test]
    fn test_server_event_classification() {
        let moved = ServerEvent::from_event(
            "character_moved".to_string(),
            vec![json!({"x": 10, "y": 20})],
        );
        assert_eq!(moved, ServerEvent::CharacterMoved(json!({"x": 10, "y": 20})));

        let response = ServerEvent::from_event("response".to_string(), vec![]);
        assert_eq!(response, ServerEvent::Response(Value::Null));

        let other = ServerEvent::from_event("game_state_update".to_string(), vec![json!(1)]);
        assert_eq!(other.name(), "game_state_update");
        assert!(matches!(other, ServerEvent::Other { ref args, .. } if args.len() == 1));
    }
}

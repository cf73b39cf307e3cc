//! Engine.IO v4 and Socket.IO v5 text packet codec
//!
//! The game server speaks Socket.IO on top of Engine.IO. Only the text framing
//! over a WebSocket is supported; binary attachments are rejected.
//!
//! Engine.IO frame: `<type>[data]`
//! Socket.IO packet (carried inside an Engine.IO `message`):
//! `<type>[<namespace>,][<ack id>][json]`

use serde::Deserialize;
use serde_json::Value;

use crate::ProtocolError;

/// Engine.IO protocol revision spoken by the client.
pub const ENGINE_IO_VERSION: u8 = 4;

/// Namespace every client joins unless told otherwise.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Handshake payload carried by the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between server pings
    pub ping_interval: u64,
    /// Milliseconds the server waits for a pong
    pub ping_timeout: u64,
    #[serde(default)]
    pub max_payload: Option<u64>,
}

// =============================================================================
// Engine.IO
// =============================================================================

/// A single Engine.IO frame.
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(OpenHandshake),
    Close,
    /// Heartbeat probe; servers may attach data that must be echoed back
    Ping(String),
    Pong(String),
    /// Socket.IO payload, still encoded
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(ProtocolError::Empty)?;
        let rest = chars.as_str();

        Ok(match kind {
            '0' => EnginePacket::Open(serde_json::from_str(rest)?),
            '1' => EnginePacket::Close,
            '2' => EnginePacket::Ping(rest.to_string()),
            '3' => EnginePacket::Pong(rest.to_string()),
            '4' => EnginePacket::Message(rest.to_string()),
            '5' => EnginePacket::Upgrade,
            '6' => EnginePacket::Noop,
            // Engine.IO v3 base64 binary frames
            'b' => return Err(ProtocolError::BinaryUnsupported),
            other => return Err(ProtocolError::UnknownEngineType(other)),
        })
    }

    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(_) => "0".to_string(),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(data) => format!("2{}", data),
            EnginePacket::Pong(data) => format!("3{}", data),
            EnginePacket::Message(data) => format!("4{}", data),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        }
    }
}

// =============================================================================
// Socket.IO
// =============================================================================

/// A Socket.IO packet addressed to one namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        data: Option<Value>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        id: Option<u64>,
        name: String,
        args: Vec<Value>,
    },
    Ack {
        namespace: String,
        id: u64,
        args: Vec<Value>,
    },
    ConnectError {
        namespace: String,
        data: Option<Value>,
    },
}

impl SocketPacket {
    /// Build a CONNECT packet for `namespace`.
    pub fn connect(namespace: impl Into<String>) -> Self {
        SocketPacket::Connect {
            namespace: namespace.into(),
            data: None,
        }
    }

    /// Build a DISCONNECT packet for `namespace`.
    pub fn disconnect(namespace: impl Into<String>) -> Self {
        SocketPacket::Disconnect {
            namespace: namespace.into(),
        }
    }

    /// Build a fire-and-forget EVENT packet.
    pub fn event(namespace: impl Into<String>, name: impl Into<String>, args: Vec<Value>) -> Self {
        SocketPacket::Event {
            namespace: namespace.into(),
            id: None,
            name: name.into(),
            args,
        }
    }

    pub fn namespace(&self) -> &str {
        match self {
            SocketPacket::Connect { namespace, .. }
            | SocketPacket::Disconnect { namespace }
            | SocketPacket::Event { namespace, .. }
            | SocketPacket::Ack { namespace, .. }
            | SocketPacket::ConnectError { namespace, .. } => namespace,
        }
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        let mut chars = text.chars();
        let kind = chars.next().ok_or(ProtocolError::Empty)?;
        if matches!(kind, '5' | '6') {
            return Err(ProtocolError::BinaryUnsupported);
        }

        let (namespace, rest) = split_namespace(chars.as_str())?;
        let (id, body) = split_ack_id(rest);
        let payload = if body.is_empty() {
            None
        } else {
            Some(serde_json::from_str::<Value>(body)?)
        };

        match kind {
            '0' => Ok(SocketPacket::Connect {
                namespace,
                data: payload,
            }),
            '1' => Ok(SocketPacket::Disconnect { namespace }),
            '2' => {
                let (name, args) = split_event(payload)?;
                Ok(SocketPacket::Event {
                    namespace,
                    id,
                    name,
                    args,
                })
            }
            '3' => {
                let id = id.ok_or(ProtocolError::MissingAckId)?;
                let args = match payload {
                    Some(Value::Array(args)) => args,
                    _ => return Err(ProtocolError::InvalidEvent),
                };
                Ok(SocketPacket::Ack {
                    namespace,
                    id,
                    args,
                })
            }
            '4' => Ok(SocketPacket::ConnectError {
                namespace,
                data: payload,
            }),
            other => Err(ProtocolError::UnknownSocketType(other)),
        }
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        let (kind, id, body) = match self {
            SocketPacket::Connect { data, .. } => ('0', None, optional_json(data)?),
            SocketPacket::Disconnect { .. } => ('1', None, String::new()),
            SocketPacket::Event { id, name, args, .. } => {
                let mut items = Vec::with_capacity(args.len() + 1);
                items.push(Value::String(name.clone()));
                items.extend(args.iter().cloned());
                ('2', *id, serde_json::to_string(&items)?)
            }
            SocketPacket::Ack { id, args, .. } => ('3', Some(*id), serde_json::to_string(args)?),
            SocketPacket::ConnectError { data, .. } => ('4', None, optional_json(data)?),
        };

        let mut out = String::with_capacity(body.len() + 8);
        out.push(kind);
        let namespace = self.namespace();
        if namespace != DEFAULT_NAMESPACE {
            out.push_str(namespace);
            out.push(',');
        }
        if let Some(id) = id {
            out.push_str(&id.to_string());
        }
        out.push_str(&body);
        Ok(out)
    }

    /// Encode as a complete Engine.IO `message` frame.
    pub fn to_frame(&self) -> Result<String, ProtocolError> {
        Ok(EnginePacket::Message(self.encode()?).encode())
    }
}

fn optional_json(data: &Option<Value>) -> Result<String, ProtocolError> {
    match data {
        Some(value) => Ok(serde_json::to_string(value)?),
        None => Ok(String::new()),
    }
}

fn split_namespace(rest: &str) -> Result<(String, &str), ProtocolError> {
    if !rest.starts_with('/') {
        return Ok((DEFAULT_NAMESPACE.to_string(), rest));
    }
    match rest.find(',') {
        Some(idx) => Ok((rest[..idx].to_string(), &rest[idx + 1..])),
        // "1/admin" has no trailing comma when there is nothing after it
        None if !rest.contains(['[', '{']) => Ok((rest.to_string(), "")),
        None => Err(ProtocolError::InvalidNamespace(rest.to_string())),
    }
}

fn split_ack_id(rest: &str) -> (Option<u64>, &str) {
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return (None, rest);
    }
    match rest[..digits].parse::<u64>() {
        Ok(id) => (Some(id), &rest[digits..]),
        Err(_) => (None, rest),
    }
}

fn split_event(payload: Option<Value>) -> Result<(String, Vec<Value>), ProtocolError> {
    let Some(Value::Array(mut items)) = payload else {
        return Err(ProtocolError::InvalidEvent);
    };
    if items.is_empty() {
        return Err(ProtocolError::InvalidEvent);
    }
    match items.remove(0) {
        Value::String(name) => Ok((name, items)),
        _ => Err(ProtocolError::InvalidEvent),
    }
}

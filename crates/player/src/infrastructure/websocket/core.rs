//! Platform-agnostic core logic for the Socket.IO client.
//!
//! This is free of any runtime / platform dependencies (tokio, web-sys, etc).
//! Platform clients (desktop/wasm) own the actual socket, feed every text frame
//! into [`SocketIoSession`] and carry out the returned [`FrameAction`]s.

use std::time::Duration;

use rpgboard_protocol::{
    ClientEvent, EnginePacket, OpenHandshake, ServerEvent, SocketPacket,
};
use serde_json::Value;

use crate::config::ReconnectPolicy;
use crate::ports::outbound::{DisconnectReason, SessionEvent, TransportError};

/// Where a single socket is in the Socket.IO handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Waiting for the Engine.IO `open` packet
    Opening,
    /// CONNECT sent, waiting for the namespace acknowledgement
    Joining,
    Connected,
    Closed,
}

/// What the platform client must do after a frame was processed.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameAction {
    /// Write this text frame to the socket
    Send(String),
    /// Hand this event to the client
    Deliver(SessionEvent),
    /// Close the socket; the session is over
    Close(DisconnectReason),
}

/// Protocol state of one socket, from `open` to close.
#[derive(Debug)]
pub struct SocketIoSession {
    namespace: String,
    phase: SessionPhase,
    handshake: Option<OpenHandshake>,
    was_connected: bool,
}

impl SocketIoSession {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            phase: SessionPhase::Opening,
            handshake: None,
            was_connected: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_connected(&self) -> bool {
        self.phase == SessionPhase::Connected
    }

    /// Whether this socket ever reached `Connected`.
    pub fn was_connected(&self) -> bool {
        self.was_connected
    }

    /// Silence allowed between server pings before the socket counts as dead.
    pub fn ping_window(&self) -> Option<Duration> {
        self.handshake
            .as_ref()
            .map(|h| Duration::from_millis(h.ping_interval.saturating_add(h.ping_timeout)))
    }

    /// Process one inbound text frame.
    pub fn on_frame(&mut self, text: &str) -> Vec<FrameAction> {
        let packet = match EnginePacket::decode(text) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::warn!("Failed to parse Engine.IO frame: {}", e);
                return Vec::new();
            }
        };

        match packet {
            EnginePacket::Open(handshake) => self.on_open(handshake),
            EnginePacket::Ping(data) => vec![FrameAction::Send(EnginePacket::Pong(data).encode())],
            EnginePacket::Close => self.end(DisconnectReason::TransportClose),
            EnginePacket::Message(body) => self.on_message(&body),
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => Vec::new(),
        }
    }

    /// Encode an outbound event. Only allowed once the namespace is joined.
    pub fn emit_frame(&self, event: &ClientEvent) -> Result<String, TransportError> {
        if !self.is_connected() {
            return Err(TransportError::NotConnected);
        }
        Ok(event.to_packet(&self.namespace)?.to_frame()?)
    }

    /// Goodbye frame to send before a client-initiated close, if the
    /// namespace was (being) joined.
    pub fn close_frame(&self) -> Option<String> {
        match self.phase {
            SessionPhase::Joining | SessionPhase::Connected => {
                SocketPacket::disconnect(self.namespace.as_str())
                    .to_frame()
                    .ok()
            }
            SessionPhase::Opening | SessionPhase::Closed => None,
        }
    }

    /// Mark the socket closed. Returns the `Disconnected` event to deliver
    /// when the session had been connected.
    pub fn on_transport_closed(&mut self, reason: DisconnectReason) -> Option<SessionEvent> {
        let connected = self.is_connected();
        self.phase = SessionPhase::Closed;
        connected.then_some(SessionEvent::Disconnected { reason })
    }

    fn on_open(&mut self, handshake: OpenHandshake) -> Vec<FrameAction> {
        if self.phase != SessionPhase::Opening {
            tracing::debug!("Ignoring duplicate open packet");
            return Vec::new();
        }
        tracing::debug!(
            sid = %handshake.sid,
            ping_interval = handshake.ping_interval,
            ping_timeout = handshake.ping_timeout,
            "Engine.IO handshake"
        );
        self.handshake = Some(handshake);
        self.phase = SessionPhase::Joining;

        match SocketPacket::connect(self.namespace.as_str()).to_frame() {
            Ok(frame) => vec![FrameAction::Send(frame)],
            Err(e) => self.end(DisconnectReason::TransportError(e.to_string())),
        }
    }

    fn on_message(&mut self, body: &str) -> Vec<FrameAction> {
        let packet = match SocketPacket::decode(body) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::warn!("Failed to parse Socket.IO packet: {}", e);
                return Vec::new();
            }
        };
        if packet.namespace() != self.namespace {
            tracing::debug!(namespace = packet.namespace(), "Packet for another namespace");
            return Vec::new();
        }

        match packet {
            SocketPacket::Connect { .. } => {
                if self.phase != SessionPhase::Joining {
                    return Vec::new();
                }
                self.phase = SessionPhase::Connected;
                self.was_connected = true;
                vec![FrameAction::Deliver(SessionEvent::Connected)]
            }
            SocketPacket::Disconnect { .. } => self.end(DisconnectReason::ServerDisconnect),
            SocketPacket::Event { name, args, .. } => {
                if !self.is_connected() {
                    tracing::debug!(event = %name, "Event before namespace join");
                    return Vec::new();
                }
                vec![FrameAction::Deliver(SessionEvent::Server(
                    ServerEvent::from_event(name, args),
                ))]
            }
            SocketPacket::Ack { id, .. } => {
                tracing::debug!(id, "Unexpected ack");
                Vec::new()
            }
            SocketPacket::ConnectError { data, .. } => {
                self.end(DisconnectReason::ConnectError(connect_error_message(data)))
            }
        }
    }

    fn end(&mut self, reason: DisconnectReason) -> Vec<FrameAction> {
        let mut actions = Vec::with_capacity(2);
        if let Some(event) = self.on_transport_closed(reason.clone()) {
            actions.push(FrameAction::Deliver(event));
        }
        actions.push(FrameAction::Close(reason));
        actions
    }
}

fn connect_error_message(data: Option<Value>) -> String {
    match data {
        Some(Value::String(message)) => message,
        Some(Value::Object(map)) => match map.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => Value::Object(map).to_string(),
        },
        Some(other) => other.to_string(),
        None => "connection refused".to_string(),
    }
}

// =============================================================================
// Reconnection
// =============================================================================

/// What to do after a socket ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { attempt: u32, delay_ms: u64 },
    /// Never (re)connected and not going to try again
    GiveUp,
    /// Session ended for good after having been connected
    Stop,
}

/// Exponential backoff state shared by reconnect logic.
#[derive(Debug, Clone)]
pub struct BackoffState {
    policy: ReconnectPolicy,
    attempts: u32,
}

impl BackoffState {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.policy.max_attempts, Some(max) if self.attempts >= max)
    }

    /// Advance to the next attempt and return the delay to wait before it.
    ///
    /// `random` is a sample from [0, 1) used for jitter.
    pub fn next_delay_and_advance(&mut self, random: f64) -> Option<u64> {
        if self.is_exhausted() {
            return None;
        }

        let exponent = self.attempts.min(32) as i32;
        let base = self.policy.initial_delay_ms as f64 * self.policy.factor.powi(exponent);
        self.attempts = self.attempts.saturating_add(1);

        let jitter = self.policy.randomization.clamp(0.0, 1.0);
        let mut delay = base;
        if jitter > 0.0 {
            let deviation = (random * jitter * base).floor();
            if ((random * 10.0).floor() as u64) & 1 == 0 {
                delay -= deviation;
            } else {
                delay += deviation;
            }
        }

        Some(delay.clamp(0.0, self.policy.max_delay_ms as f64) as u64)
    }

    /// Decide whether to reconnect after a socket ended with `reason`.
    pub fn plan(
        &mut self,
        reason: &DisconnectReason,
        was_connected: bool,
        random: f64,
    ) -> RetryDecision {
        if was_connected {
            self.reset();
        }
        if !self.policy.enabled || !reason.allows_reconnect() {
            return if was_connected {
                RetryDecision::Stop
            } else {
                RetryDecision::GiveUp
            };
        }
        match self.next_delay_and_advance(random) {
            Some(delay_ms) => RetryDecision::Retry {
                attempt: self.attempts,
                delay_ms,
            },
            None => RetryDecision::GiveUp,
        }
    }
}

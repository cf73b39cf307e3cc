//! Connection client: owns the realtime session and dispatches its events.

use rpgboard_protocol::{ClientEvent, ServerEvent};
use serde_json::Value;

use crate::application::services::status_reflector::{
    StatusReflector, STATUS_CONNECTED, STATUS_DISCONNECTED,
};
use crate::infrastructure::messaging::ConnectionState;
use crate::ports::outbound::{
    event_channel, BoardRenderer, EventReceiver, RealtimeTransport, SessionEvent, StatusDisplay,
    TransportError, TransportSession,
};

/// Player-side client for the game server.
///
/// Holds at most one transport session. All collaborators are injected so
/// tests can substitute doubles for the socket, the page and the renderer.
pub struct GameClient {
    transport: Box<dyn RealtimeTransport>,
    status: StatusReflector,
    renderer: Box<dyn BoardRenderer>,
    session: Option<Box<dyn TransportSession>>,
    state: ConnectionState,
}

impl GameClient {
    pub fn new(
        transport: Box<dyn RealtimeTransport>,
        display: Box<dyn StatusDisplay>,
        renderer: Box<dyn BoardRenderer>,
    ) -> Self {
        Self {
            transport,
            status: StatusReflector::new(display),
            renderer,
            session: None,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Open a session with the server.
    ///
    /// Any previous session is closed first. Lifecycle and server events are
    /// delivered through the returned receiver and must be fed back into
    /// [`GameClient::handle_event`].
    pub fn connect(&mut self) -> Result<EventReceiver, TransportError> {
        self.release_session();

        let (events_tx, events_rx) = event_channel();
        self.state = ConnectionState::Connecting;

        match self.transport.open(events_tx) {
            Ok(session) => {
                self.session = Some(session);
                Ok(events_rx)
            }
            Err(e) => {
                tracing::error!("Failed to open realtime session: {}", e);
                self.state = ConnectionState::Failed;
                Err(e)
            }
        }
    }

    /// Close the session and release the handle.
    pub fn disconnect(&mut self) {
        self.release_session();
        self.state = ConnectionState::Disconnected;
    }

    /// Single dispatch point for everything the transport reports.
    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Connected => {
                tracing::info!("Connected to server");
                self.state = ConnectionState::Connected;
                self.set_status(STATUS_CONNECTED, true);
            }
            SessionEvent::Disconnected { reason } => {
                tracing::info!(%reason, "Disconnected from server");
                self.state = ConnectionState::Disconnected;
                self.set_status(STATUS_DISCONNECTED, false);
            }
            SessionEvent::Reconnecting { attempt, delay_ms } => {
                tracing::info!(attempt, delay_ms, "Reconnecting to server");
                self.state = ConnectionState::Reconnecting;
            }
            SessionEvent::ReconnectFailed => {
                tracing::error!("Gave up connecting to server");
                self.release_session();
                self.state = ConnectionState::Failed;
            }
            SessionEvent::Server(ServerEvent::Response(data)) => {
                tracing::info!(%data, "Server response");
            }
            SessionEvent::Server(ServerEvent::CharacterMoved(data)) => {
                tracing::info!(%data, "Character moved");
                self.update_character_position(&data);
            }
            SessionEvent::Server(ServerEvent::Other { name, args }) => {
                tracing::debug!(event = %name, args = args.len(), "Unhandled server event");
            }
        }
    }

    pub fn set_status(&self, message: &str, connected: bool) {
        self.status.set_status(message, connected);
    }

    /// Emit a `chat_message`. Dropped silently without an active session.
    pub fn send_message(&self, text: &str) {
        self.emit(ClientEvent::chat(text));
    }

    /// Emit the server's `echo` test event. Same rules as `send_message`.
    pub fn send_echo(&self, payload: Value) {
        self.emit(ClientEvent::Echo(payload));
    }

    pub fn update_character_position(&self, data: &Value) {
        self.renderer.update_character_position(data);
    }

    fn emit(&self, event: ClientEvent) {
        let Some(session) = self.active_session() else {
            tracing::debug!(event = event.name(), "No active session, dropping event");
            return;
        };
        if let Err(e) = session.emit(&event) {
            tracing::warn!(event = event.name(), "Failed to emit event: {}", e);
        }
    }

    fn active_session(&self) -> Option<&dyn TransportSession> {
        if self.state != ConnectionState::Connected {
            return None;
        }
        self.session.as_deref().filter(|session| session.is_connected())
    }

    fn release_session(&mut self) {
        if let Some(session) = self.session.take() {
            session.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::display_port::MockStatusDisplay;
    use crate::ports::outbound::realtime_port::{MockRealtimeTransport, MockTransportSession};
    use crate::ports::outbound::renderer_port::MockBoardRenderer;
    use crate::ports::outbound::DisconnectReason;
    use mockall::predicate::eq;
    use serde_json::json;

    fn lenient_display() -> MockStatusDisplay {
        let mut display = MockStatusDisplay::new();
        display.expect_set_text().return_const(());
        display.expect_set_connected().return_const(());
        display
    }

    fn lenient_renderer() -> MockBoardRenderer {
        let mut renderer = MockBoardRenderer::new();
        renderer.expect_update_character_position().return_const(());
        renderer
    }

    fn transport_with(session: MockTransportSession) -> MockRealtimeTransport {
        let mut transport = MockRealtimeTransport::new();
        transport
            .expect_open()
            .times(1)
            .return_once(move |_| Ok(Box::new(session) as Box<dyn TransportSession>));
        transport
    }

    fn connected_client(session: MockTransportSession) -> GameClient {
        let mut client = GameClient::new(
            Box::new(transport_with(session)),
            Box::new(lenient_display()),
            Box::new(lenient_renderer()),
        );
        let _events = client.connect().unwrap();
        client.handle_event(SessionEvent::Connected);
        client
    }

    #[test]
    fn test_connect_event_sets_connected_status() {
        let mut display = MockStatusDisplay::new();
        display
            .expect_set_text()
            .with(eq("Connected"))
            .times(1)
            .return_const(());
        display
            .expect_set_connected()
            .with(eq(true))
            .times(1)
            .return_const(());

        let mut client = GameClient::new(
            Box::new(MockRealtimeTransport::new()),
            Box::new(display),
            Box::new(lenient_renderer()),
        );
        client.handle_event(SessionEvent::Connected);

        assert_eq!(client.state(), ConnectionState::Connected);
    }

    #[test]
    fn test_disconnect_event_clears_connected_status() {
        let mut display = MockStatusDisplay::new();
        display
            .expect_set_text()
            .with(eq("Disconnected"))
            .times(1)
            .return_const(());
        display
            .expect_set_connected()
            .with(eq(false))
            .times(1)
            .return_const(());

        let mut client = GameClient::new(
            Box::new(MockRealtimeTransport::new()),
            Box::new(display),
            Box::new(lenient_renderer()),
        );
        client.handle_event(SessionEvent::Disconnected {
            reason: DisconnectReason::TransportClose,
        });

        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_send_without_session_emits_nothing() {
        let client = GameClient::new(
            Box::new(MockRealtimeTransport::new()),
            Box::new(lenient_display()),
            Box::new(lenient_renderer()),
        );

        // MockRealtimeTransport has no expectations: any call would panic
        client.send_message("hello");
        assert!(!client.has_session());
    }

    #[test]
    fn test_send_before_server_acknowledges_emits_nothing() {
        let mut session = MockTransportSession::new();
        session.expect_emit().times(0);
        session.expect_close().return_const(());

        let mut client = GameClient::new(
            Box::new(transport_with(session)),
            Box::new(lenient_display()),
            Box::new(lenient_renderer()),
        );
        let _events = client.connect().unwrap();

        assert_eq!(client.state(), ConnectionState::Connecting);
        client.send_message("too early");
    }

    #[test]
    fn test_send_with_active_session_emits_one_chat_message() {
        let mut session = MockTransportSession::new();
        session
            .expect_emit()
            .with(eq(ClientEvent::chat("hello")))
            .times(1)
            .returning(|_| Ok(()));
        session.expect_is_connected().return_const(true);
        session.expect_close().return_const(());

        let client = connected_client(session);
        client.send_message("hello");
    }

    #[test]
    fn test_send_after_disconnect_is_dropped() {
        let mut session = MockTransportSession::new();
        session.expect_emit().times(0);
        session.expect_close().return_const(());

        let mut client = connected_client(session);
        client.handle_event(SessionEvent::Disconnected {
            reason: DisconnectReason::PingTimeout,
        });
        client.send_message("anyone there?");
    }

    #[test]
    fn test_emit_failure_is_not_propagated() {
        let mut session = MockTransportSession::new();
        session
            .expect_emit()
            .times(1)
            .returning(|_| Err(TransportError::NotConnected));
        session.expect_is_connected().return_const(true);
        session.expect_close().return_const(());

        let client = connected_client(session);
        client.send_message("lost in transit");
    }

    #[test]
    fn test_echo_uses_active_session() {
        let mut session = MockTransportSession::new();
        session
            .expect_emit()
            .with(eq(ClientEvent::Echo(json!({"ping": 1}))))
            .times(1)
            .returning(|_| Ok(()));
        session.expect_is_connected().return_const(true);
        session.expect_close().return_const(());

        let client = connected_client(session);
        client.send_echo(json!({"ping": 1}));
    }

    #[test]
    fn test_character_moved_reaches_renderer_with_exact_payload() {
        let payload = json!({"character_id": "pc-1", "x": 10, "y": 20});

        let mut renderer = MockBoardRenderer::new();
        renderer
            .expect_update_character_position()
            .with(eq(payload.clone()))
            .times(1)
            .return_const(());

        let mut client = GameClient::new(
            Box::new(MockRealtimeTransport::new()),
            Box::new(lenient_display()),
            Box::new(renderer),
        );
        client.handle_event(SessionEvent::Server(ServerEvent::CharacterMoved(payload)));
    }

    #[test]
    fn test_response_and_unknown_events_touch_nothing() {
        let mut renderer = MockBoardRenderer::new();
        renderer.expect_update_character_position().times(0);

        let mut client = GameClient::new(
            Box::new(MockRealtimeTransport::new()),
            Box::new(MockStatusDisplay::new()),
            Box::new(renderer),
        );
        client.handle_event(SessionEvent::Server(ServerEvent::Response(
            json!({"data": "Connected to server"}),
        )));
        client.handle_event(SessionEvent::Server(ServerEvent::Other {
            name: "game_state_update".to_string(),
            args: vec![json!({"state": "active"})],
        }));
    }

    #[test]
    fn test_reconnect_events_leave_status_alone() {
        let mut client = GameClient::new(
            Box::new(MockRealtimeTransport::new()),
            Box::new(MockStatusDisplay::new()),
            Box::new(lenient_renderer()),
        );

        client.handle_event(SessionEvent::Reconnecting {
            attempt: 1,
            delay_ms: 1000,
        });
        assert_eq!(client.state(), ConnectionState::Reconnecting);

        client.handle_event(SessionEvent::ReconnectFailed);
        assert_eq!(client.state(), ConnectionState::Failed);
    }

    #[test]
    fn test_connect_again_closes_previous_session() {
        let mut first = MockTransportSession::new();
        first.expect_close().times(1).return_const(());
        let mut second = MockTransportSession::new();
        second.expect_close().times(1).return_const(());

        let mut transport = MockRealtimeTransport::new();
        let mut sessions = vec![second, first];
        transport
            .expect_open()
            .times(2)
            .returning_st(move |_| match sessions.pop() {
                Some(session) => Ok(Box::new(session) as Box<dyn TransportSession>),
                None => Err(TransportError::NoRuntime),
            });

        let mut client = GameClient::new(
            Box::new(transport),
            Box::new(lenient_display()),
            Box::new(lenient_renderer()),
        );
        let _first_events = client.connect().unwrap();
        let _second_events = client.connect().unwrap();
        assert!(client.has_session());

        client.disconnect();
        assert!(!client.has_session());
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_send_is_dropped_when_transport_reports_no_connection() {
        let mut session = MockTransportSession::new();
        session.expect_is_connected().return_const(false);
        session.expect_emit().times(0);
        session.expect_close().return_const(());

        let client = connected_client(session);
        client.send_message("into the void");
    }

    #[test]
    fn test_reconnect_failure_releases_session() {
        let mut session = MockTransportSession::new();
        session.expect_emit().times(0);
        session.expect_close().times(1).return_const(());

        let mut client = GameClient::new(
            Box::new(transport_with(session)),
            Box::new(lenient_display()),
            Box::new(lenient_renderer()),
        );
        let _events = client.connect().unwrap();
        client.handle_event(SessionEvent::ReconnectFailed);

        assert_eq!(client.state(), ConnectionState::Failed);
        assert!(!client.has_session());
        client.send_message("nobody home");
    }

    #[test]
    fn test_open_failure_is_reported() {
        let mut transport = MockRealtimeTransport::new();
        transport
            .expect_open()
            .times(1)
            .returning(|_| Err(TransportError::NoRuntime));

        let mut client = GameClient::new(
            Box::new(transport),
            Box::new(lenient_display()),
            Box::new(lenient_renderer()),
        );

        assert!(matches!(client.connect(), Err(TransportError::NoRuntime)));
        assert_eq!(client.state(), ConnectionState::Failed);
        assert!(!client.has_session());
    }
}

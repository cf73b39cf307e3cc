//! Forwards the chat field to the client on Enter.

use crate::application::services::game_client::GameClient;
use crate::ports::outbound::ChatInputField;

/// `KeyboardEvent.key` value that submits the field.
pub const ENTER_KEY: &str = "Enter";

pub struct ChatInputForwarder<F: ChatInputField> {
    field: F,
}

impl<F: ChatInputField> ChatInputForwarder<F> {
    pub fn new(field: F) -> Self {
        Self { field }
    }

    pub fn field(&self) -> &F {
        &self.field
    }

    /// Handle one key press. Returns `true` when a message was sent.
    ///
    /// Only an empty field is ignored; whitespace is sent as typed.
    pub fn on_key(&self, key: &str, client: &GameClient) -> bool {
        if key != ENTER_KEY {
            return false;
        }
        let text = self.field.value();
        if text.is_empty() {
            return false;
        }
        client.send_message(&text);
        self.field.clear();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::display_port::{MockChatInputField, MockStatusDisplay};
    use crate::ports::outbound::realtime_port::{MockRealtimeTransport, MockTransportSession};
    use crate::ports::outbound::renderer_port::MockBoardRenderer;
    use crate::ports::outbound::{SessionEvent, TransportSession};
    use mockall::predicate::eq;
    use rpgboard_protocol::ClientEvent;

    fn client_expecting(sends: usize, text: &'static str) -> GameClient {
        let mut session = MockTransportSession::new();
        session
            .expect_emit()
            .with(eq(ClientEvent::chat(text)))
            .times(sends)
            .returning(|_| Ok(()));
        session.expect_is_connected().return_const(true);
        session.expect_close().return_const(());

        let mut transport = MockRealtimeTransport::new();
        transport
            .expect_open()
            .return_once(move |_| Ok(Box::new(session) as Box<dyn TransportSession>));

        let mut display = MockStatusDisplay::new();
        display.expect_set_text().return_const(());
        display.expect_set_connected().return_const(());

        let mut client = GameClient::new(
            Box::new(transport),
            Box::new(display),
            Box::new(MockBoardRenderer::new()),
        );
        let _events = client.connect().unwrap();
        client.handle_event(SessionEvent::Connected);
        client
    }

    #[test]
    fn test_enter_sends_once_and_clears() {
        let client = client_expecting(1, "I open the door");

        let mut field = MockChatInputField::new();
        field
            .expect_value()
            .times(1)
            .returning(|| "I open the door".to_string());
        field.expect_clear().times(1).return_const(());

        let forwarder = ChatInputForwarder::new(field);
        assert!(forwarder.on_key("Enter", &client));
    }

    #[test]
    fn test_enter_on_empty_field_does_nothing() {
        let client = client_expecting(0, "");

        let mut field = MockChatInputField::new();
        field.expect_value().returning(String::new);
        field.expect_clear().times(0);

        let forwarder = ChatInputForwarder::new(field);
        assert!(!forwarder.on_key("Enter", &client));
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let client = client_expecting(0, "a");

        let mut field = MockChatInputField::new();
        field.expect_value().times(0);
        field.expect_clear().times(0);

        let forwarder = ChatInputForwarder::new(field);
        assert!(!forwarder.on_key("a", &client));
        assert!(!forwarder.on_key("Shift", &client));
    }

    #[test]
    fn test_whitespace_is_sent_as_typed() {
        let client = client_expecting(1, "   ");

        let mut field = MockChatInputField::new();
        field.expect_value().returning(|| "   ".to_string());
        field.expect_clear().times(1).return_const(());

        let forwarder = ChatInputForwarder::new(field);
        assert!(forwarder.on_key("Enter", &client));
    }
}

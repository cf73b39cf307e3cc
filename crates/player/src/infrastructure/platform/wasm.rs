//! Browser implementations of the page bindings using web-sys

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlInputElement, KeyboardEvent};

use crate::application::{ChatInputForwarder, GameClient};
use crate::ports::outbound::{ChatInputField, StatusDisplay};

pub const STATUS_ELEMENT_ID: &str = "status";
pub const CHAT_INPUT_ID: &str = "chat-input";
/// Class toggled on the status element while connected
pub const CONNECTED_CLASS: &str = "connected";

/// The `#status` element. Updates are no-ops when the page has none.
pub struct DomStatusElement {
    element: Option<Element>,
}

impl DomStatusElement {
    pub fn find(document: &Document) -> Self {
        let element = document.get_element_by_id(STATUS_ELEMENT_ID);
        if element.is_none() {
            tracing::warn!("No #{} element on the page", STATUS_ELEMENT_ID);
        }
        Self { element }
    }
}

impl StatusDisplay for DomStatusElement {
    fn set_text(&self, text: &str) {
        if let Some(element) = &self.element {
            element.set_text_content(Some(text));
        }
    }

    fn set_connected(&self, connected: bool) {
        let Some(element) = &self.element else {
            return;
        };
        let classes = element.class_list();
        let result = if connected {
            classes.add_1(CONNECTED_CLASS)
        } else {
            classes.remove_1(CONNECTED_CLASS)
        };
        if let Err(e) = result {
            tracing::warn!("Failed to toggle status class: {:?}", e);
        }
    }
}

/// The `#chat-input` text field.
pub struct DomChatInput {
    input: HtmlInputElement,
}

impl DomChatInput {
    pub fn find(document: &Document) -> Option<Self> {
        document
            .get_element_by_id(CHAT_INPUT_ID)?
            .dyn_into::<HtmlInputElement>()
            .ok()
            .map(|input| Self { input })
    }
}

impl ChatInputField for DomChatInput {
    fn value(&self) -> String {
        self.input.value()
    }

    fn clear(&self) {
        self.input.set_value("");
    }
}

/// Forward Enter presses in the chat field to the client.
///
/// The listener stays registered for the page lifetime.
pub fn attach_chat_forwarder(
    forwarder: ChatInputForwarder<DomChatInput>,
    client: Rc<RefCell<GameClient>>,
) -> Result<(), JsValue> {
    let target = forwarder.field().input.clone();

    let on_keypress = Closure::<dyn FnMut(_)>::new(move |e: KeyboardEvent| {
        match client.try_borrow() {
            Ok(client) => {
                forwarder.on_key(&e.key(), &client);
            }
            Err(_) => tracing::warn!("Client busy, dropping key press"),
        }
    });
    target.add_event_listener_with_callback("keypress", on_keypress.as_ref().unchecked_ref())?;
    on_keypress.forget();

    Ok(())
}

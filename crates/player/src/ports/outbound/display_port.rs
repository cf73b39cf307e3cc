//! Page bindings used by the client
//!
//! In the browser these wrap the `#status` element and the `#chat-input`
//! field. The terminal front end provides its own equivalents.

/// A single status line with a `connected` flag.
#[cfg_attr(test, mockall::automock)]
pub trait StatusDisplay {
    fn set_text(&self, text: &str);

    /// Toggle the `connected` visual flag (CSS class in the browser).
    fn set_connected(&self, connected: bool);
}

/// A single-line text input.
#[cfg_attr(test, mockall::automock)]
pub trait ChatInputField {
    fn value(&self) -> String;

    fn clear(&self);
}

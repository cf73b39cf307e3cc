//! Terminal implementations of the page bindings

use std::cell::{Cell, RefCell};
use std::io::Write;

use crate::ports::outbound::{ChatInputField, StatusDisplay};

/// Status line printed to stdout.
///
/// Printed on `set_connected`, which comes after `set_text` in every status update.
#[derive(Default)]
pub struct TerminalStatus {
    text: RefCell<String>,
    connected: Cell<bool>,
}

impl TerminalStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn is_connected(&self) -> bool {
        self.connected.get()
    }

    fn render(&self) {
        let marker = if self.is_connected() { "*" } else { " " };
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "[{}] {}", marker, self.text.borrow());
        let _ = stdout.flush();
    }
}

impl StatusDisplay for TerminalStatus {
    fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }

    fn set_connected(&self, connected: bool) {
        self.connected.set(connected);
        self.render();
    }
}

/// Chat field backed by the last line read from stdin.
#[derive(Default)]
pub struct TerminalInput {
    line: RefCell<String>,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a freshly read line into the field, without its line ending.
    pub fn fill(&self, line: &str) {
        *self.line.borrow_mut() = line.trim_end_matches(['\r', '\n']).to_string();
    }
}

impl ChatInputField for TerminalInput {
    fn value(&self) -> String {
        self.line.borrow().clone()
    }

    fn clear(&self) {
        self.line.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_tracks_text_and_flag() {
        let status = TerminalStatus::new();
        status.set_text("Connected");
        status.set_connected(true);

        assert_eq!(status.text(), "Connected");
        assert!(status.is_connected());

        status.set_text("Disconnected");
        status.set_connected(false);
        assert_eq!(status.text(), "Disconnected");
        assert!(!status.is_connected());
    }

    #[test]
    fn test_input_keeps_spaces_but_not_line_ending() {
        let input = TerminalInput::new();
        input.fill("  hello there \r\n");
        assert_eq!(input.value(), "  hello there ");

        input.clear();
        assert_eq!(input.value(), "");
    }
}

//! Mirrors the connection state into the status display.

use crate::ports::outbound::StatusDisplay;

pub const STATUS_CONNECTED: &str = "Connected";
pub const STATUS_DISCONNECTED: &str = "Disconnected";

pub struct StatusReflector {
    display: Box<dyn StatusDisplay>,
}

impl StatusReflector {
    pub fn new(display: Box<dyn StatusDisplay>) -> Self {
        Self { display }
    }

    /// Set the status text and the `connected` flag. Idempotent.
    pub fn set_status(&self, message: &str, connected: bool) {
        self.display.set_text(message);
        self.display.set_connected(connected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::display_port::MockStatusDisplay;
    use mockall::predicate::eq;

    #[test]
    fn test_set_status_updates_text_and_flag() {
        let mut display = MockStatusDisplay::new();
        display
            .expect_set_text()
            .with(eq("Reconnecting soon"))
            .times(1)
            .return_const(());
        display
            .expect_set_connected()
            .with(eq(false))
            .times(1)
            .return_const(());

        StatusReflector::new(Box::new(display)).set_status("Reconnecting soon", false);
    }

    #[test]
    fn test_set_status_twice_writes_same_values() {
        let mut display = MockStatusDisplay::new();
        display
            .expect_set_text()
            .with(eq("Connected"))
            .times(2)
            .return_const(());
        display
            .expect_set_connected()
            .with(eq(true))
            .times(2)
            .return_const(());

        let reflector = StatusReflector::new(Box::new(display));
        reflector.set_status(STATUS_CONNECTED, true);
        reflector.set_status(STATUS_CONNECTED, true);
    }
}

//! Default position-update handler.

use serde_json::Value;

use crate::ports::outbound::BoardRenderer;

/// Logs position updates until the gameboard renderer exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingBoardRenderer;

impl BoardRenderer for LoggingBoardRenderer {
    fn update_character_position(&self, data: &Value) {
        tracing::info!(%data, "Position update");
    }
}

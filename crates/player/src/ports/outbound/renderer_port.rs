//! Board renderer port
//!
//! Receives position updates from `character_moved`. Only a logging
//! implementation exists until a gameboard renderer lands.

use serde_json::Value;

#[cfg_attr(test, mockall::automock)]
pub trait BoardRenderer {
    fn update_character_position(&self, data: &Value);
}

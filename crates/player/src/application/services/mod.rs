//! Application services
//!
//! This module contains the services that make up the player client. Services
//! depend on port traits, not concrete infrastructure implementations.

pub mod board_renderer;
pub mod chat_input;
pub mod game_client;
pub mod status_reflector;

pub use board_renderer::LoggingBoardRenderer;
pub use chat_input::{ChatInputForwarder, ENTER_KEY};
pub use game_client::GameClient;
pub use status_reflector::{StatusReflector, STATUS_CONNECTED, STATUS_DISCONNECTED};

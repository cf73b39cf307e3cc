//! Application layer
//!
//! Client behavior expressed against the outbound ports only.

pub mod services;

pub use services::{ChatInputForwarder, GameClient, LoggingBoardRenderer, StatusReflector};

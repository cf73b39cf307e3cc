//! Platform-specific page bindings
//!
//! The browser drives the `#status` element and the `#chat-input` field. The
//! terminal front end prints the status line and reads chat from stdin.
//!
//! The correct platform is selected at compile time based on the target architecture.

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(not(target_arch = "wasm32"))]
mod desktop;

#[cfg(target_arch = "wasm32")]
pub use wasm::{
    attach_chat_forwarder, DomChatInput, DomStatusElement, CHAT_INPUT_ID, CONNECTED_CLASS,
    STATUS_ELEMENT_ID,
};

#[cfg(not(target_arch = "wasm32"))]
pub use desktop::{TerminalInput, TerminalStatus};

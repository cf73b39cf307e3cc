//! rpgboard Player - realtime client for the rpgboard game server.
//!
//! The same client runs in the browser (WASM, driving the page's status line
//! and chat field) and in a terminal (tokio). Platform adapters are selected
//! at compile time with `cfg(target_arch)`.

pub mod application;
pub mod config;
pub mod infrastructure;
pub mod ports;
pub mod runner;

pub use application::GameClient;
pub use config::{ClientConfig, ReconnectPolicy};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Browser entry point, run when the WASM module is instantiated.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    tracing::info!("Starting rpgboard Player");
    runner::run_browser(ClientConfig::from_location())
}

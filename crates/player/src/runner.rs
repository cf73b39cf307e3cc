//! Composition root: wires the adapters into a [`GameClient`] and drives it.
//!
//! The browser entry point hooks the page once the DOM is ready; the terminal
//! entry point reads chat lines from stdin until Ctrl-C.

use rpgboard_protocol::ServerConfig;

use crate::ports::outbound::ServerApiPort;

#[cfg(not(target_arch = "wasm32"))]
pub use desktop::{run_terminal, spawn_server_report};

#[cfg(target_arch = "wasm32")]
pub use browser::run_browser;

/// Probe the HTTP API and log what the server reports.
///
/// Failures are logged and otherwise ignored; the socket does not depend on them.
pub async fn report_server(api: &dyn ServerApiPort) -> Option<ServerConfig> {
    match api.health().await {
        Ok(health) if health.is_ok() => {
            tracing::info!(message = ?health.message, "Server is healthy");
        }
        Ok(health) => tracing::warn!(status = %health.status, "Server reports a problem"),
        Err(e) => tracing::warn!("Health check failed: {}", e),
    }

    match api.config().await {
        Ok(config) => {
            tracing::info!(
                grid_size = config.grid_size,
                max_players = config.max_players,
                "Server configuration"
            );
            Some(config)
        }
        Err(e) => {
            tracing::warn!("Failed to fetch server configuration: {}", e);
            None
        }
    }
}

/// Split a terminal line into an `/echo` payload, if it is one.
///
/// `/echo {"a":1}` sends the JSON value; anything that is not JSON is sent
/// as a string.
pub fn parse_echo_command(line: &str) -> Option<serde_json::Value> {
    let rest = line.strip_prefix("/echo")?;
    if !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return None;
    }
    let rest = rest.trim();
    Some(
        serde_json::from_str(rest)
            .unwrap_or_else(|_| serde_json::Value::String(rest.to_string())),
    )
}

#[cfg(not(target_arch = "wasm32"))]
mod desktop {
    use std::time::Duration;

    use futures_util::StreamExt;
    use rpgboard_protocol::ServerConfig;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::task::JoinHandle;

    use crate::application::services::ENTER_KEY;
    use crate::application::{ChatInputForwarder, GameClient, LoggingBoardRenderer};
    use crate::config::ClientConfig;
    use crate::infrastructure::platform::{TerminalInput, TerminalStatus};
    use crate::infrastructure::{HttpServerApi, SocketIoTransport};
    use crate::ports::outbound::ServerApiPort;

    use super::{parse_echo_command, report_server};

    /// How long to wait for the goodbye to be acknowledged on shutdown.
    const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

    /// Probe the HTTP API on a background task so the socket never waits on it.
    pub fn spawn_server_report<A>(api: A) -> JoinHandle<Option<ServerConfig>>
    where
        A: ServerApiPort + 'static,
    {
        tokio::spawn(async move { report_server(&api).await })
    }

    /// Run the terminal client until the session ends, stdin closes or Ctrl-C.
    pub async fn run_terminal(config: ClientConfig) -> anyhow::Result<()> {
        let transport = SocketIoTransport::new(&config)?;
        tracing::info!("Connecting to {}", transport.endpoint());

        let report = spawn_server_report(HttpServerApi::new(&config.server_url));

        let mut client = GameClient::new(
            Box::new(transport),
            Box::new(TerminalStatus::new()),
            Box::new(LoggingBoardRenderer),
        );
        let mut events = client.connect()?;
        let forwarder = ChatInputForwarder::new(TerminalInput::new());

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        loop {
            tokio::select! {
                event = events.next() => match event {
                    Some(event) => client.handle_event(event),
                    None => {
                        tracing::info!("Session ended");
                        break;
                    }
                },
                line = lines.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => {
                        if let Some(payload) = parse_echo_command(&line) {
                            client.send_echo(payload);
                        } else {
                            forwarder.field().fill(&line);
                            forwarder.on_key(ENTER_KEY, &client);
                        }
                    }
                    Ok(None) => {
                        tracing::debug!("stdin closed");
                        stdin_open = false;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to read stdin: {}", e);
                        stdin_open = false;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted");
                    break;
                }
            }
        }

        report.abort();
        client.disconnect();
        while let Ok(Some(event)) = tokio::time::timeout(SHUTDOWN_GRACE, events.next()).await {
            client.handle_event(event);
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod browser {
    use std::cell::RefCell;
    use std::rc::Rc;

    use futures_util::StreamExt;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::Document;

    use crate::application::{ChatInputForwarder, GameClient, LoggingBoardRenderer};
    use crate::config::ClientConfig;
    use crate::infrastructure::platform::{attach_chat_forwarder, DomChatInput, DomStatusElement};
    use crate::infrastructure::{HttpServerApi, SocketIoTransport};

    use super::report_server;

    /// Start the client once the DOM is ready.
    pub fn run_browser(config: ClientConfig) -> Result<(), JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document available"))?;

        let ready_state = js_sys::Reflect::get(&document, &JsValue::from_str("readyState"))?
            .as_string()
            .unwrap_or_default();
        if ready_state == "loading" {
            let ready_document = document.clone();
            let on_ready = Closure::once_into_js(move || {
                if let Err(e) = start(&ready_document, config) {
                    tracing::error!("Failed to start client: {:?}", e);
                }
            });
            document
                .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())?;
            Ok(())
        } else {
            start(&document, config)
        }
    }

    fn start(document: &Document, config: ClientConfig) -> Result<(), JsValue> {
        let transport = SocketIoTransport::new(&config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        tracing::info!("Connecting to {}", transport.endpoint());

        let client = Rc::new(RefCell::new(GameClient::new(
            Box::new(transport),
            Box::new(DomStatusElement::find(document)),
            Box::new(LoggingBoardRenderer),
        )));
        let mut events = client
            .borrow_mut()
            .connect()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        match DomChatInput::find(document) {
            Some(input) => attach_chat_forwarder(ChatInputForwarder::new(input), Rc::clone(&client))?,
            None => tracing::warn!("No chat input on the page"),
        }

        let api = HttpServerApi::new(&config.server_url);
        wasm_bindgen_futures::spawn_local(async move {
            report_server(&api).await;
        });

        wasm_bindgen_futures::spawn_local(async move {
            while let Some(event) = events.next().await {
                client.borrow_mut().handle_event(event);
            }
            tracing::info!("Session ended");
        });

        Ok(())
    }
}

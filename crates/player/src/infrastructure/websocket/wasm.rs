//! WASM Socket.IO client using web-sys
//!
//! Everything runs on the browser event loop, so state lives in `Rc` +
//! `Cell`/`RefCell`. Socket callbacks only hold a `Weak` to the session so
//! dropping the handle tears everything down.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo_timers::future::TimeoutFuture;
use rpgboard_protocol::ClientEvent;
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket};

use crate::config::{ClientConfig, ReconnectPolicy};
use crate::infrastructure::messaging::ConnectionState;
use crate::ports::outbound::{
    DisconnectReason, EventSender, RealtimeTransport, SessionEvent, TransportError,
    TransportSession,
};

use super::core::{BackoffState, FrameAction, RetryDecision, SocketIoSession};
use super::shared::socket_io_url;

/// Storage for WebSocket event closures, replaced on every reconnect
struct WasmClosures {
    #[allow(dead_code)]
    onopen: Closure<dyn FnMut()>,
    #[allow(dead_code)]
    onmessage: Closure<dyn FnMut(MessageEvent)>,
    #[allow(dead_code)]
    onclose: Closure<dyn FnMut(CloseEvent)>,
    #[allow(dead_code)]
    onerror: Closure<dyn FnMut(Event)>,
}

/// Socket.IO transport for the browser (WASM).
#[derive(Debug, Clone)]
pub struct WasmSocketIoTransport {
    endpoint: Url,
    namespace: String,
    policy: ReconnectPolicy,
}

impl WasmSocketIoTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        Ok(Self {
            endpoint: socket_io_url(&config.server_url, &config.socket_path)?,
            namespace: config.namespace.clone(),
            policy: config.reconnect.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl RealtimeTransport for WasmSocketIoTransport {
    fn open(&self, events: EventSender) -> Result<Box<dyn TransportSession>, TransportError> {
        let inner = Rc::new(SocketInner {
            endpoint: self.endpoint.to_string(),
            namespace: self.namespace.clone(),
            events: RefCell::new(Some(events)),
            backoff: RefCell::new(BackoffState::new(self.policy.clone())),
            session: RefCell::new(SocketIoSession::new(self.namespace.as_str())),
            ws: RefCell::new(None),
            closures: RefCell::new(None),
            state: Cell::new(ConnectionState::Disconnected),
            saw_error: Cell::new(false),
            closed: Cell::new(false),
        });
        inner.connect();
        Ok(Box::new(WasmSession { inner }))
    }
}

struct SocketInner {
    endpoint: String,
    namespace: String,
    /// Taken when the session ends for good so the receiver sees the end
    events: RefCell<Option<EventSender>>,
    backoff: RefCell<BackoffState>,
    session: RefCell<SocketIoSession>,
    ws: RefCell<Option<WebSocket>>,
    closures: RefCell<Option<WasmClosures>>,
    state: Cell<ConnectionState>,
    saw_error: Cell<bool>,
    closed: Cell<bool>,
}

impl SocketInner {
    fn connect(self: &Rc<Self>) {
        // Never called from inside one of the stored closures, so dropping them is fine
        *self.closures.borrow_mut() = None;
        *self.session.borrow_mut() = SocketIoSession::new(self.namespace.as_str());
        self.saw_error.set(false);
        self.state.set(ConnectionState::Connecting);

        let ws = match WebSocket::new(&self.endpoint) {
            Ok(ws) => ws,
            Err(e) => {
                tracing::error!("Failed to create WebSocket: {:?}", e);
                self.on_ended(
                    DisconnectReason::TransportError(format!("{:?}", e)),
                    false,
                );
                return;
            }
        };

        let endpoint = self.endpoint.clone();
        let onopen = Closure::<dyn FnMut()>::new(move || {
            tracing::debug!("WebSocket open to {}", endpoint);
        });
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));

        let weak = Rc::downgrade(self);
        let onmessage = Closure::<dyn FnMut(_)>::new(move |e: MessageEvent| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            match e.data().dyn_into::<js_sys::JsString>() {
                Ok(text) => inner.on_text(&String::from(text)),
                Err(_) => tracing::warn!("Ignoring binary frame"),
            }
        });
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

        let weak = Rc::downgrade(self);
        let onclose = Closure::<dyn FnMut(_)>::new(move |e: CloseEvent| {
            tracing::info!(code = e.code(), "WebSocket closed");
            if let Some(inner) = weak.upgrade() {
                inner.on_socket_closed();
            }
        });
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        let weak: Weak<SocketInner> = Rc::downgrade(self);
        let onerror = Closure::<dyn FnMut(_)>::new(move |_e: Event| {
            tracing::error!("WebSocket error");
            // The browser follows up with a close event
            if let Some(inner) = weak.upgrade() {
                inner.saw_error.set(true);
            }
        });
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        *self.closures.borrow_mut() = Some(WasmClosures {
            onopen,
            onmessage,
            onclose,
            onerror,
        });
        *self.ws.borrow_mut() = Some(ws);
    }

    fn on_text(self: &Rc<Self>, text: &str) {
        let actions = self.session.borrow_mut().on_frame(text);
        for action in actions {
            match action {
                FrameAction::Send(frame) => {
                    if let Err(e) = self.send_frame(&frame) {
                        tracing::error!("Failed to write frame: {}", e);
                    }
                }
                FrameAction::Deliver(event) => self.deliver(event),
                FrameAction::Close(reason) => {
                    let was_connected = self.session.borrow().was_connected();
                    self.detach();
                    self.on_ended(reason, was_connected);
                    return;
                }
            }
        }
    }

    fn on_socket_closed(self: &Rc<Self>) {
        let reason = if self.saw_error.get() {
            DisconnectReason::TransportError("websocket error".to_string())
        } else {
            DisconnectReason::TransportClose
        };
        let event = self.session.borrow_mut().on_transport_closed(reason.clone());
        let was_connected = self.session.borrow().was_connected();
        if let Some(event) = event {
            self.deliver(event);
        }
        self.detach();
        self.on_ended(reason, was_connected);
    }

    fn on_ended(self: &Rc<Self>, reason: DisconnectReason, was_connected: bool) {
        if self.closed.get() {
            return;
        }

        let decision =
            self.backoff
                .borrow_mut()
                .plan(&reason, was_connected, js_sys::Math::random());
        match decision {
            RetryDecision::Retry { attempt, delay_ms } => {
                tracing::info!(
                    "Reconnection attempt {}, waiting {}ms ({})",
                    attempt,
                    delay_ms,
                    reason
                );
                self.state.set(ConnectionState::Reconnecting);
                self.deliver(SessionEvent::Reconnecting { attempt, delay_ms });

                let weak = Rc::downgrade(self);
                let delay = u32::try_from(delay_ms).unwrap_or(u32::MAX);
                wasm_bindgen_futures::spawn_local(async move {
                    TimeoutFuture::new(delay).await;
                    match weak.upgrade() {
                        Some(inner) if !inner.closed.get() => inner.connect(),
                        _ => tracing::debug!("Reconnection cancelled"),
                    }
                });
            }
            RetryDecision::GiveUp => {
                tracing::error!("Giving up on {}: {}", self.endpoint, reason);
                self.state.set(ConnectionState::Failed);
                self.deliver(SessionEvent::ReconnectFailed);
                self.finish();
            }
            RetryDecision::Stop => {
                tracing::info!("Session ended: {}", reason);
                self.state.set(ConnectionState::Disconnected);
                self.finish();
            }
        }
    }

    fn send_frame(&self, frame: &str) -> Result<(), TransportError> {
        match self.ws.borrow().as_ref() {
            Some(ws) => ws
                .send_with_str(frame)
                .map_err(|e| TransportError::Socket(format!("{:?}", e))),
            None => Err(TransportError::NotConnected),
        }
    }

    fn deliver(&self, event: SessionEvent) {
        match &event {
            SessionEvent::Connected => {
                tracing::info!("Connected to {}", self.endpoint);
                self.state.set(ConnectionState::Connected);
            }
            SessionEvent::Disconnected { reason } => {
                tracing::info!("Disconnected: {}", reason);
                self.state.set(ConnectionState::Disconnected);
            }
            _ => {}
        }
        if let Some(events) = self.events.borrow().as_ref() {
            if events.unbounded_send(event).is_err() {
                tracing::debug!("Session event receiver dropped");
            }
        }
    }

    /// Unhook and close the current socket. Closures stay stored until the
    /// next `connect()` or `close()` since this may run inside one of them.
    fn detach(&self) {
        if let Some(ws) = self.ws.borrow_mut().take() {
            ws.set_onopen(None);
            ws.set_onmessage(None);
            ws.set_onclose(None);
            ws.set_onerror(None);
            if ws.ready_state() == WebSocket::CONNECTING || ws.ready_state() == WebSocket::OPEN {
                let _ = ws.close();
            }
        }
    }

    fn finish(&self) {
        self.closed.set(true);
        self.events.borrow_mut().take();
    }

    fn close(&self) {
        if self.closed.get() {
            return;
        }

        if let Some(frame) = self.session.borrow().close_frame() {
            if let Err(e) = self.send_frame(&frame) {
                tracing::debug!("Failed to send disconnect packet: {}", e);
            }
        }
        let event = self
            .session
            .borrow_mut()
            .on_transport_closed(DisconnectReason::ClientDisconnect);
        self.detach();
        *self.closures.borrow_mut() = None;

        self.state.set(ConnectionState::Disconnected);
        if let Some(event) = event {
            self.deliver(event);
        }
        tracing::info!("Session closed by client");
        self.finish();
    }
}

/// Handle to a browser session.
struct WasmSession {
    inner: Rc<SocketInner>,
}

impl TransportSession for WasmSession {
    fn emit(&self, event: &ClientEvent) -> Result<(), TransportError> {
        let frame = self.inner.session.borrow().emit_frame(event)?;
        self.inner.send_frame(&frame)
    }

    fn is_connected(&self) -> bool {
        self.inner.state.get() == ConnectionState::Connected
    }

    fn close(&self) {
        self.inner.close();
    }
}

impl Drop for WasmSession {
    fn drop(&mut self) {
        self.inner.close();
    }
}

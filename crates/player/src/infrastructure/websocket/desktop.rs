//! Desktop Socket.IO client using tokio-tungstenite
//!
//! One spawned task owns the socket for the whole session lifetime, including
//! reconnect attempts. The session handle talks to it through channels.

use std::sync::atomic::AtomicU8;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rpgboard_protocol::ClientEvent;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use crate::config::{ClientConfig, ReconnectPolicy};
use crate::infrastructure::messaging::{
    set_connection_state, ConnectionState, ConnectionStateObserver,
};
use crate::ports::outbound::{
    DisconnectReason, EventSender, RealtimeTransport, SessionEvent, TransportError,
    TransportSession,
};

use super::core::{BackoffState, FrameAction, RetryDecision, SocketIoSession};
use super::shared::{socket_io_url, CONNECT_TIMEOUT_MS};

/// Socket.IO transport for native targets (Desktop).
///
/// `open()` must be called from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct SocketIoTransport {
    endpoint: Url,
    namespace: String,
    policy: ReconnectPolicy,
}

impl SocketIoTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        Ok(Self {
            endpoint: socket_io_url(&config.server_url, &config.socket_path)?,
            namespace: config.namespace.clone(),
            policy: config.reconnect.clone(),
        })
    }

    /// WebSocket URL the transport connects to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl RealtimeTransport for SocketIoTransport {
    fn open(&self, events: EventSender) -> Result<Box<dyn TransportSession>, TransportError> {
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| TransportError::NoRuntime)?;

        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = oneshot::channel();
        let state = Arc::new(AtomicU8::new(ConnectionState::Connecting.to_u8()));

        let driver = SessionDriver {
            endpoint: self.endpoint.clone(),
            namespace: self.namespace.clone(),
            events,
            state: Arc::clone(&state),
        };
        runtime.spawn(driver.run(self.policy.clone(), outbound_rx, close_rx));

        Ok(Box::new(DesktopSession {
            outbound: outbound_tx,
            close_tx: Mutex::new(Some(close_tx)),
            state: ConnectionStateObserver::new(state),
        }))
    }
}

/// Handle to a running session task.
struct DesktopSession {
    outbound: mpsc::UnboundedSender<ClientEvent>,
    close_tx: Mutex<Option<oneshot::Sender<()>>>,
    state: ConnectionStateObserver,
}

impl TransportSession for DesktopSession {
    fn emit(&self, event: &ClientEvent) -> Result<(), TransportError> {
        if !self.state.is_connected() {
            return Err(TransportError::NotConnected);
        }
        self.outbound
            .send(event.clone())
            .map_err(|_| TransportError::NotConnected)
    }

    fn is_connected(&self) -> bool {
        self.state.is_connected()
    }

    fn close(&self) {
        let sender = match self.close_tx.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(sender) = sender {
            // The task may already be gone
            let _ = sender.send(());
        }
    }
}

impl Drop for DesktopSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Longest the ping watchdog waits when the server's window does not fit in an `Instant`.
const MAX_PING_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

fn deadline_after(window: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(window)
        .unwrap_or_else(|| now + MAX_PING_WINDOW)
}

/// How a single socket ended.
enum SocketOutcome {
    ClosedByClient,
    Ended {
        reason: DisconnectReason,
        was_connected: bool,
    },
}

struct SessionDriver {
    endpoint: Url,
    namespace: String,
    events: EventSender,
    state: Arc<AtomicU8>,
}

impl SessionDriver {
    async fn run(
        self,
        policy: ReconnectPolicy,
        mut outbound: mpsc::UnboundedReceiver<ClientEvent>,
        mut close_rx: oneshot::Receiver<()>,
    ) {
        let mut backoff = BackoffState::new(policy);

        loop {
            let (reason, was_connected) =
                match self.run_once(&mut outbound, &mut close_rx).await {
                    SocketOutcome::ClosedByClient => {
                        tracing::info!("Session closed by client");
                        self.set_state(ConnectionState::Disconnected);
                        return;
                    }
                    SocketOutcome::Ended {
                        reason,
                        was_connected,
                    } => (reason, was_connected),
                };

            match backoff.plan(&reason, was_connected, rand::random::<f64>()) {
                RetryDecision::Retry { attempt, delay_ms } => {
                    tracing::info!(
                        "Reconnection attempt {}, waiting {}ms ({})",
                        attempt,
                        delay_ms,
                        reason
                    );
                    self.set_state(ConnectionState::Reconnecting);
                    self.deliver(SessionEvent::Reconnecting { attempt, delay_ms });

                    tokio::select! {
                        _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => {}
                        _ = &mut close_rx => {
                            tracing::info!("Reconnection cancelled by client");
                            self.set_state(ConnectionState::Disconnected);
                            return;
                        }
                    }
                    self.set_state(ConnectionState::Connecting);
                }
                RetryDecision::GiveUp => {
                    tracing::error!("Giving up on {}: {}", self.endpoint, reason);
                    self.set_state(ConnectionState::Failed);
                    self.deliver(SessionEvent::ReconnectFailed);
                    return;
                }
                RetryDecision::Stop => {
                    tracing::info!("Session ended: {}", reason);
                    self.set_state(ConnectionState::Disconnected);
                    return;
                }
            }
        }
    }

    async fn run_once(
        &self,
        outbound: &mut mpsc::UnboundedReceiver<ClientEvent>,
        close_rx: &mut oneshot::Receiver<()>,
    ) -> SocketOutcome {
        let mut session = SocketIoSession::new(self.namespace.as_str());
        let connect_timeout = Duration::from_millis(CONNECT_TIMEOUT_MS);

        let stream = tokio::select! {
            _ = &mut *close_rx => return SocketOutcome::ClosedByClient,
            result = tokio::time::timeout(connect_timeout, connect_async(self.endpoint.as_str())) => {
                match result {
                    Ok(Ok((stream, _))) => stream,
                    Ok(Err(e)) => {
                        tracing::warn!("Failed to connect to {}: {}", self.endpoint, e);
                        return SocketOutcome::Ended {
                            reason: DisconnectReason::TransportError(e.to_string()),
                            was_connected: false,
                        };
                    }
                    Err(_) => {
                        tracing::warn!("Timed out connecting to {}", self.endpoint);
                        return SocketOutcome::Ended {
                            reason: DisconnectReason::TransportError("connect timeout".to_string()),
                            was_connected: false,
                        };
                    }
                }
            }
        };

        tracing::debug!("WebSocket open to {}", self.endpoint);
        let (mut write, mut read) = stream.split();
        // Until the handshake arrives the connect timeout applies
        let mut deadline = deadline_after(connect_timeout);

        loop {
            tokio::select! {
                _ = &mut *close_rx => {
                    if let Some(frame) = session.close_frame() {
                        if let Err(e) = write.send(Message::Text(frame)).await {
                            tracing::debug!("Failed to send disconnect packet: {}", e);
                        }
                    }
                    let _ = write.close().await;
                    if let Some(event) = session.on_transport_closed(DisconnectReason::ClientDisconnect) {
                        self.deliver(event);
                    }
                    return SocketOutcome::ClosedByClient;
                }
                Some(event) = outbound.recv() => {
                    match session.emit_frame(&event) {
                        Ok(frame) => {
                            if let Err(e) = write.send(Message::Text(frame)).await {
                                tracing::error!("Failed to send {} event: {}", event.name(), e);
                                return self.finish(&mut session, DisconnectReason::TransportError(e.to_string()));
                            }
                        }
                        Err(e) => tracing::warn!("Dropping {} event: {}", event.name(), e),
                    }
                }
                message = read.next() => match message {
                    Some(Ok(Message::Text(text))) => {
                        for action in session.on_frame(&text) {
                            match action {
                                FrameAction::Send(frame) => {
                                    if let Err(e) = write.send(Message::Text(frame)).await {
                                        tracing::error!("Failed to write frame: {}", e);
                                        return self.finish(&mut session, DisconnectReason::TransportError(e.to_string()));
                                    }
                                }
                                FrameAction::Deliver(event) => self.deliver(event),
                                FrameAction::Close(reason) => {
                                    let _ = write.close().await;
                                    return SocketOutcome::Ended {
                                        reason,
                                        was_connected: session.was_connected(),
                                    };
                                }
                            }
                        }
                        if let Some(window) = session.ping_window() {
                            deadline = deadline_after(window);
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        tracing::warn!("Ignoring binary frame");
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("Server closed connection");
                        return self.finish(&mut session, DisconnectReason::TransportClose);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        return self.finish(&mut session, DisconnectReason::TransportError(e.to_string()));
                    }
                },
                _ = tokio::time::sleep_until(deadline) => {
                    let reason = if session.ping_window().is_some() {
                        DisconnectReason::PingTimeout
                    } else {
                        DisconnectReason::TransportError("handshake timeout".to_string())
                    };
                    tracing::warn!("No traffic from server: {}", reason);
                    let _ = write.close().await;
                    return self.finish(&mut session, reason);
                }
            }
        }
    }

    fn finish(&self, session: &mut SocketIoSession, reason: DisconnectReason) -> SocketOutcome {
        if let Some(event) = session.on_transport_closed(reason.clone()) {
            self.deliver(event);
        }
        SocketOutcome::Ended {
            reason,
            was_connected: session.was_connected(),
        }
    }

    fn deliver(&self, event: SessionEvent) {
        match &event {
            SessionEvent::Connected => {
                tracing::info!("Connected to {}", self.endpoint);
                self.set_state(ConnectionState::Connected);
            }
            SessionEvent::Disconnected { reason } => {
                tracing::info!("Disconnected: {}", reason);
                self.set_state(ConnectionState::Disconnected);
            }
            _ => {}
        }
        if self.events.unbounded_send(event).is_err() {
            tracing::debug!("Session event receiver dropped");
        }
    }

    fn set_state(&self, state: ConnectionState) {
        set_connection_state(&self.state, state);
    }
}

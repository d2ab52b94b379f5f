//! WebSocket client for the chat relay.
//!
//! `connect` spawns the connection lifecycle as a local async task and hands
//! back a `RelaySender` plus a `RelayShutdown`. The task opens the socket,
//! drives a `RelaySession`, dispatches inbound events to the registered
//! `RelayHandlers`, and reconnects with jittered exponential backoff when the
//! socket drops or goes silent past the heartbeat deadline.
//!
//! A server `disconnect` or a `connect_error` ends the task for good, as does
//! closing or dropping the `RelayShutdown` at any point, including
//! mid-handshake and during a backoff wait.
//!
//! Outbound packets are queued on an unbounded channel and only written
//! while the session is connected, so sends made while offline go out after
//! the next successful connect.
//!
//! The socket itself is gated behind `#[cfg(feature = "csr")]`; the sender
//! and sink trait build natively so the view logic can be tested.
//!
//! ERROR HANDLING
//! ==============
//! Transport failures never reach the view. They are logged and absorbed by
//! the reconnect loop.

#[cfg(test)]
#[path = "relay_client_test.rs"]
mod relay_client_test;

use std::future::Future;
use std::pin::pin;

use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::channel::oneshot;
use futures::future::Either;
use packets::{ChatPayload, RelayEvent};

#[cfg(feature = "csr")]
use super::RelayHandlers;
#[cfg(feature = "csr")]
use super::session::{CloseReason, RelaySession, SessionAction};
#[cfg(feature = "csr")]
use crate::config::{Backoff, RelayConfig};
#[cfg(feature = "csr")]
use crate::state::connection::ConnectionStatus;

/// Error ending a single connection attempt.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("failed to open websocket: {0}")]
    Open(String),
    #[error("websocket transport error: {0}")]
    Transport(String),
    #[error("invalid relay handshake: {0}")]
    Handshake(String),
    #[error("relay refused connection: {0}")]
    Rejected(String),
}

impl RelayError {
    /// Whether the reconnect loop should try again after this failure.
    /// A relay that refused the namespace will refuse it again.
    #[must_use]
    pub fn reconnects(&self) -> bool {
        !matches!(self, Self::Rejected(_))
    }
}

/// Outbound side of the relay connection.
///
/// All emits are fire-and-forget: the return value only says whether the
/// packet was queued, never whether the relay received it.
pub trait RelaySink {
    fn emit(&self, event: RelayEvent) -> bool;

    /// Emit a `"chat message"` event.
    fn send(&self, author: &str, text: &str) -> bool {
        self.emit(RelayEvent::ChatMessage(ChatPayload {
            user: author.to_owned(),
            message: text.to_owned(),
        }))
    }

    /// Emit the one-time `"user connected"` announcement.
    fn announce_presence(&self, name: &str) -> bool {
        self.emit(RelayEvent::UserConnected(name.to_owned()))
    }
}

/// Cloneable handle feeding the connection task's outbound queue.
#[derive(Clone, Debug, Default)]
pub struct RelaySender {
    tx: Option<UnboundedSender<String>>,
}

impl RelaySender {
    /// Sender plus the receiving end the connection task drains.
    #[must_use]
    pub fn channel() -> (Self, UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded();
        (Self { tx: Some(tx) }, rx)
    }

    /// True when the sender is wired to a connection task.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }
}

impl RelaySink for RelaySender {
    fn emit(&self, event: RelayEvent) -> bool {
        let Some(tx) = &self.tx else {
            log::warn!("relay sender not attached; dropping {}", event.name());
            return false;
        };
        tx.unbounded_send(packets::encode_event(&event)).is_ok()
    }
}

/// Stops the connection task when closed or dropped.
#[derive(Debug)]
pub struct RelayShutdown {
    tx: oneshot::Sender<()>,
}

impl RelayShutdown {
    /// Shutdown handle plus the signal the connection task watches.
    #[must_use]
    pub fn pair() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    pub fn close(self) {
        // The task may already be gone; nothing to stop then.
        let _ = self.tx.send(());
    }
}

/// Run `work` unless the shutdown signal fires first.
///
/// Returns `None` once shutdown was requested or its handle dropped; `work`
/// is dropped unfinished in that case. The signal must not be awaited again
/// after it returned `None`.
pub async fn until_shutdown<F: Future>(
    shutdown: &mut oneshot::Receiver<()>,
    work: F,
) -> Option<F::Output> {
    let work = pin!(work);
    match futures::future::select(shutdown, work).await {
        Either::Left(_) => None,
        Either::Right((output, _)) => Some(output),
    }
}

/// Start the relay connection and return the handles used to emit events and
/// to stop the connection.
///
/// The connection attempt begins immediately; handlers run on the UI thread
/// as packets arrive.
#[cfg(feature = "csr")]
pub fn connect(
    config: RelayConfig,
    handlers: RelayHandlers,
    status: leptos::prelude::RwSignal<ConnectionStatus>,
) -> (RelaySender, RelayShutdown) {
    let (sender, rx) = RelaySender::channel();
    let (shutdown, shutdown_rx) = RelayShutdown::pair();
    leptos::task::spawn_local(relay_client_loop(config, handlers, status, rx, shutdown_rx));
    (sender, shutdown)
}

#[cfg(feature = "csr")]
enum RunOutcome {
    /// The relay closed the socket or session.
    RelayClosed(CloseReason),
    /// Every `RelaySender` was dropped; the widget is gone.
    SenderDropped,
}

/// What woke the connection loop.
#[cfg(feature = "csr")]
enum Wake {
    Incoming(Option<Result<gloo_net::websocket::Message, gloo_net::websocket::WebSocketError>>),
    Outgoing(Option<String>),
    HeartbeatExpired,
}

/// Main connection loop with reconnect logic.
#[cfg(feature = "csr")]
async fn relay_client_loop(
    config: RelayConfig,
    handlers: RelayHandlers,
    status: leptos::prelude::RwSignal<ConnectionStatus>,
    mut rx: UnboundedReceiver<String>,
    mut shutdown: oneshot::Receiver<()>,
) {
    use leptos::prelude::Set;

    let mut backoff = config.backoff();

    loop {
        status.set(ConnectionStatus::Connecting);

        let run = connect_and_run(&config, &handlers, status, &mut backoff, &mut rx);
        let reconnect = match until_shutdown(&mut shutdown, run).await {
            None | Some(Ok(RunOutcome::SenderDropped)) => {
                log::info!("relay client stopped");
                return;
            }
            Some(Ok(RunOutcome::RelayClosed(reason))) => {
                log::info!("relay disconnected: {reason}");
                reason.reconnects()
            }
            Some(Err(e)) => {
                log::warn!("relay connection failed: {e}");
                e.reconnects()
            }
        };

        status.set(ConnectionStatus::Disconnected);
        if !reconnect {
            log::info!("relay ended the session; not reconnecting");
            return;
        }

        let delay = backoff.next_delay(js_sys::Math::random());
        log::debug!("reconnecting in {}ms (attempt {})", delay.as_millis(), backoff.attempts());
        if until_shutdown(&mut shutdown, gloo_timers::future::sleep(delay)).await.is_none() {
            log::info!("relay client stopped");
            return;
        }
    }
}

/// Time since `since`, a `Date.now()` timestamp in milliseconds.
#[cfg(feature = "csr")]
fn elapsed_since(since: f64) -> std::time::Duration {
    std::time::Duration::from_secs_f64(((js_sys::Date::now() - since) / 1000.0).max(0.0))
}

/// Connect to the relay and process packets until the session ends.
///
/// Until the handshake arrives the connect timeout bounds the wait; after it,
/// each `ping` must arrive within the handshake's heartbeat timeout.
#[cfg(feature = "csr")]
async fn connect_and_run(
    config: &RelayConfig,
    handlers: &RelayHandlers,
    status: leptos::prelude::RwSignal<ConnectionStatus>,
    backoff: &mut Backoff,
    rx: &mut UnboundedReceiver<String>,
) -> Result<RunOutcome, RelayError> {
    use futures::{SinkExt, StreamExt};
    use gloo_net::websocket::Message;
    use gloo_net::websocket::futures::WebSocket;
    use leptos::prelude::Set;

    let ws = WebSocket::open(&config.websocket_url()).map_err(|e| RelayError::Open(e.to_string()))?;
    let (mut ws_write, mut ws_read) = ws.split();
    let mut session = RelaySession::new();
    let mut last_heartbeat = js_sys::Date::now();

    loop {
        let deadline = session
            .heartbeat_timeout()
            .unwrap_or(config.connect_timeout)
            .saturating_sub(elapsed_since(last_heartbeat));

        // Outbound packets wait in the channel until the namespace is joined.
        let connected = session.is_connected();
        let read = pin!(async {
            if connected {
                match futures::future::select(ws_read.next(), rx.next()).await {
                    Either::Left((msg, _)) => Wake::Incoming(msg),
                    Either::Right((text, _)) => Wake::Outgoing(text),
                }
            } else {
                Wake::Incoming(ws_read.next().await)
            }
        });
        let timer = pin!(gloo_timers::future::sleep(deadline));
        let wake = match futures::future::select(read, timer).await {
            Either::Left((wake, _)) => wake,
            Either::Right(_) => Wake::HeartbeatExpired,
        };

        let incoming = match wake {
            Wake::HeartbeatExpired => {
                return Err(RelayError::Transport(format!(
                    "no heartbeat within {}ms",
                    session.heartbeat_timeout().unwrap_or(config.connect_timeout).as_millis()
                )));
            }
            Wake::Outgoing(Some(text)) => {
                ws_write
                    .send(Message::Text(text))
                    .await
                    .map_err(|e| RelayError::Transport(e.to_string()))?;
                continue;
            }
            Wake::Outgoing(None) => return Ok(RunOutcome::SenderDropped),
            Wake::Incoming(incoming) => incoming,
        };

        let text = match incoming {
            None => return Ok(RunOutcome::RelayClosed(CloseReason::TransportClose)),
            Some(Ok(Message::Text(text))) => text,
            Some(Ok(Message::Bytes(_))) => {
                log::debug!("ignoring binary relay frame");
                continue;
            }
            Some(Err(e)) => return Err(RelayError::Transport(e.to_string())),
        };

        for action in session.handle_text(&text)? {
            match action {
                SessionAction::Send(reply) => {
                    ws_write
                        .send(Message::Text(reply))
                        .await
                        .map_err(|e| RelayError::Transport(e.to_string()))?;
                }
                SessionAction::Connected => {
                    log::info!("relay connected");
                    backoff.reset();
                    status.set(ConnectionStatus::Connected);
                }
                SessionAction::Event(event) => {
                    handlers.dispatch(event);
                }
                SessionAction::Heartbeat => last_heartbeat = js_sys::Date::now(),
                SessionAction::Closed(reason) => return Ok(RunOutcome::RelayClosed(reason)),
            }
        }
    }
}

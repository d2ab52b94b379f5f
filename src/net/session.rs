//! Relay protocol session, independent of the socket.
//!
//! DESIGN
//! ======
//! `RelaySession` consumes one WebSocket text message at a time and returns
//! the actions the transport loop must carry out (replies, state changes,
//! events to dispatch). Keeping it free of I/O lets the handshake and
//! heartbeat logic run under native unit tests.
//!
//! LIFECYCLE
//! =========
//! 1. Engine.IO `open` → reply with a Socket.IO connect for `/`, arm the
//!    heartbeat deadline
//! 2. Socket.IO connect ack → connected
//! 3. Engine.IO `ping` → `pong` (payload echoed), re-arm the deadline
//! 4. Socket.IO events → typed `RelayEvent`s
//! 5. Engine.IO `close` → closed, transport may reconnect
//! 6. Socket.IO `disconnect` → closed by the server, no reconnect
//!
//! Malformed or unknown packets are logged and skipped once the session is
//! open. A malformed `open` fails the attempt, since nothing else can follow.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::fmt;
use std::time::Duration;

use packets::{
    DEFAULT_NAMESPACE, EnginePacket, Handshake, RelayEvent, SocketPacket, decode_engine_packet,
    decode_socket_packet, encode_engine_packet, encode_socket_packet,
};

use super::RelayError;

/// Something the transport loop has to do after a packet was handled.
#[derive(Clone, Debug, PartialEq)]
pub enum SessionAction {
    /// Write this text message to the socket.
    Send(String),
    /// The relay accepted the namespace connect.
    Connected,
    /// Dispatch an inbound chat event.
    Event(RelayEvent),
    /// The relay proved it is alive; restart the heartbeat deadline.
    Heartbeat,
    /// The relay ended the session.
    Closed(CloseReason),
}

/// Why the relay ended a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseReason {
    /// Engine.IO `close`: the transport went away.
    TransportClose,
    /// Socket.IO `disconnect`: the server kicked this client.
    ServerDisconnect,
}

impl CloseReason {
    /// Whether the transport loop should try again.
    #[must_use]
    pub fn reconnects(self) -> bool {
        self == Self::TransportClose
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::TransportClose => "transport close",
            Self::ServerDisconnect => "io server disconnect",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SessionPhase {
    AwaitingOpen,
    AwaitingConnect,
    Connected,
    Closed,
}

#[derive(Debug)]
pub struct RelaySession {
    phase: SessionPhase,
    handshake: Option<Handshake>,
}

impl Default for RelaySession {
    fn default() -> Self {
        Self::new()
    }
}

impl RelaySession {
    #[must_use]
    pub fn new() -> Self {
        Self { phase: SessionPhase::AwaitingOpen, handshake: None }
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.phase == SessionPhase::Connected
    }

    /// How long the relay may stay silent before the socket counts as dead:
    /// `pingInterval + pingTimeout` from the handshake. `None` until open.
    #[must_use]
    pub fn heartbeat_timeout(&self) -> Option<Duration> {
        self.handshake
            .as_ref()
            .map(|h| Duration::from_millis(h.ping_interval.saturating_add(h.ping_timeout)))
    }

    /// Handle one WebSocket text message.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Handshake`] when the first packet is not a valid
    /// Engine.IO `open`, and [`RelayError::Rejected`] when the relay answers
    /// the namespace connect with a `connect_error`.
    pub fn handle_text(&mut self, text: &str) -> Result<Vec<SessionAction>, RelayError> {
        let packet = match decode_engine_packet(text) {
            Ok(packet) => packet,
            Err(e) if self.phase == SessionPhase::AwaitingOpen => {
                self.phase = SessionPhase::Closed;
                return Err(RelayError::Handshake(e.to_string()));
            }
            Err(e) => {
                log::debug!("skipping malformed engine packet: {e}");
                return Ok(Vec::new());
            }
        };

        match packet {
            EnginePacket::Open(handshake) => {
                log::debug!("relay open, sid={}", handshake.sid);
                self.handshake = Some(handshake);
                self.phase = SessionPhase::AwaitingConnect;
                let connect = encode_socket_packet(&SocketPacket::connect());
                Ok(vec![
                    SessionAction::Heartbeat,
                    SessionAction::Send(encode_engine_packet(&EnginePacket::Message(connect))),
                ])
            }
            EnginePacket::Ping(data) => Ok(vec![
                SessionAction::Heartbeat,
                SessionAction::Send(encode_engine_packet(&EnginePacket::Pong(data))),
            ]),
            EnginePacket::Close => Ok(self.close(CloseReason::TransportClose)),
            EnginePacket::Message(body) => self.handle_socket(&body),
            EnginePacket::Pong(_) | EnginePacket::Upgrade | EnginePacket::Noop => Ok(Vec::new()),
        }
    }

    fn handle_socket(&mut self, body: &str) -> Result<Vec<SessionAction>, RelayError> {
        let packet = match decode_socket_packet(body) {
            Ok(packet) => packet,
            Err(e) => {
                log::debug!("skipping malformed socket packet: {e}");
                return Ok(Vec::new());
            }
        };

        if packet.namespace() != DEFAULT_NAMESPACE {
            return Ok(Vec::new());
        }

        match &packet {
            SocketPacket::Connect { .. } => {
                self.phase = SessionPhase::Connected;
                Ok(vec![SessionAction::Connected])
            }
            SocketPacket::Disconnect { .. } => Ok(self.close(CloseReason::ServerDisconnect)),
            SocketPacket::ConnectError { data, .. } => {
                self.phase = SessionPhase::Closed;
                Err(RelayError::Rejected(connect_error_message(data)))
            }
            SocketPacket::Event { .. } if self.is_connected() => {
                match RelayEvent::from_socket_packet(&packet) {
                    Ok(event) => Ok(vec![SessionAction::Event(event)]),
                    Err(e) => {
                        log::debug!("skipping relay event: {e}");
                        Ok(Vec::new())
                    }
                }
            }
            SocketPacket::Event { .. } | SocketPacket::Ack { .. } => Ok(Vec::new()),
        }
    }

    fn close(&mut self, reason: CloseReason) -> Vec<SessionAction> {
        self.phase = SessionPhase::Closed;
        vec![SessionAction::Closed(reason)]
    }
}

fn connect_error_message(data: &serde_json::Value) -> String {
    data.get("message")
        .and_then(serde_json::Value::as_str)
        .or_else(|| data.as_str())
        .map_or_else(|| data.to_string(), str::to_owned)
}

//! Engine.IO / Socket.IO text packet codec for the chat relay transport.
//!
//! The relay speaks Socket.IO v5 on top of an Engine.IO v4 WebSocket. Every
//! WebSocket text message carries exactly one Engine.IO packet, and Socket.IO
//! packets ride inside Engine.IO `message` packets. This crate owns both
//! layers plus the typed chat events exchanged with the relay, so the widget
//! never touches raw packet strings.
//!
//! Binary attachments (Socket.IO types 5 and 6) are rejected.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// ERRORS
// =============================================================================

/// Error returned by the decoders in this crate.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The packet text was empty.
    #[error("empty packet")]
    Empty,
    /// The leading Engine.IO type digit is not a known packet type.
    #[error("unknown engine packet type: {0:?}")]
    UnknownEngineType(char),
    /// The leading Socket.IO type digit is not a known packet type.
    #[error("unknown socket packet type: {0:?}")]
    UnknownSocketType(char),
    /// Binary event/ack packets need attachment reassembly, which is not supported.
    #[error("binary socket packets are not supported")]
    BinaryUnsupported,
    /// The packet structure is invalid.
    #[error("malformed packet: {0}")]
    Malformed(&'static str),
    /// A JSON section of the packet failed to parse.
    #[error("invalid packet json: {0}")]
    Json(#[from] serde_json::Error),
    /// The event name is not part of the chat wire contract.
    #[error("unknown relay event: {0}")]
    UnknownEvent(String),
    /// The event name is known but its arguments have the wrong shape.
    #[error("relay event {event:?} has an invalid payload")]
    InvalidPayload { event: String },
}

// =============================================================================
// ENGINE.IO
// =============================================================================

/// Payload of the Engine.IO `open` packet sent by the server on connect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    /// Engine.IO session id.
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between server heartbeats.
    pub ping_interval: u64,
    /// Milliseconds the server waits for a pong.
    pub ping_timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_payload: Option<u64>,
}

/// A single Engine.IO packet.
#[derive(Clone, Debug, PartialEq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    /// Heartbeat from the server; may carry a payload to echo.
    Ping(String),
    /// Heartbeat reply; echoes the ping payload.
    Pong(String),
    /// Carries an encoded Socket.IO packet.
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    fn type_char(&self) -> char {
        match self {
            Self::Open(_) => '0',
            Self::Close => '1',
            Self::Ping(_) => '2',
            Self::Pong(_) => '3',
            Self::Message(_) => '4',
            Self::Upgrade => '5',
            Self::Noop => '6',
        }
    }
}

/// Encode an Engine.IO packet into its text form.
#[must_use]
pub fn encode_engine_packet(packet: &EnginePacket) -> String {
    let mut out = String::new();
    out.push(packet.type_char());
    match packet {
        EnginePacket::Open(handshake) => {
            // Serializing a struct of strings and integers cannot fail.
            out.push_str(&serde_json::to_string(handshake).unwrap_or_default());
        }
        EnginePacket::Ping(data) | EnginePacket::Pong(data) | EnginePacket::Message(data) => {
            out.push_str(data);
        }
        EnginePacket::Close | EnginePacket::Upgrade | EnginePacket::Noop => {}
    }
    out
}

/// Decode the text form of an Engine.IO packet.
///
/// # Errors
///
/// Returns [`CodecError::Empty`] for empty input, [`CodecError::UnknownEngineType`]
/// for an unknown type digit and [`CodecError::Json`] for a malformed handshake.
pub fn decode_engine_packet(text: &str) -> Result<EnginePacket, CodecError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(CodecError::Empty)?;
    let data = chars.as_str();

    match kind {
        '0' => Ok(EnginePacket::Open(serde_json::from_str(data)?)),
        '1' => Ok(EnginePacket::Close),
        '2' => Ok(EnginePacket::Ping(data.to_owned())),
        '3' => Ok(EnginePacket::Pong(data.to_owned())),
        '4' => Ok(EnginePacket::Message(data.to_owned())),
        '5' => Ok(EnginePacket::Upgrade),
        '6' => Ok(EnginePacket::Noop),
        other => Err(CodecError::UnknownEngineType(other)),
    }
}

// =============================================================================
// SOCKET.IO
// =============================================================================

/// Namespace used when a packet does not name one.
pub const DEFAULT_NAMESPACE: &str = "/";

/// A single Socket.IO packet (non-binary subset).
#[derive(Clone, Debug, PartialEq)]
pub enum SocketPacket {
    Connect { namespace: String, data: Option<Value> },
    Disconnect { namespace: String },
    Event { namespace: String, ack_id: Option<u64>, name: String, args: Vec<Value> },
    Ack { namespace: String, ack_id: u64, args: Vec<Value> },
    ConnectError { namespace: String, data: Value },
}

impl SocketPacket {
    /// Connect request for the default namespace.
    #[must_use]
    pub fn connect() -> Self {
        Self::Connect { namespace: DEFAULT_NAMESPACE.to_owned(), data: None }
    }

    /// Fire-and-forget event on the default namespace.
    #[must_use]
    pub fn event(name: impl Into<String>, args: Vec<Value>) -> Self {
        Self::Event { namespace: DEFAULT_NAMESPACE.to_owned(), ack_id: None, name: name.into(), args }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        match self {
            Self::Connect { namespace, .. }
            | Self::Disconnect { namespace }
            | Self::Event { namespace, .. }
            | Self::Ack { namespace, .. }
            | Self::ConnectError { namespace, .. } => namespace,
        }
    }

    fn type_char(&self) -> char {
        match self {
            Self::Connect { .. } => '0',
            Self::Disconnect { .. } => '1',
            Self::Event { .. } => '2',
            Self::Ack { .. } => '3',
            Self::ConnectError { .. } => '4',
        }
    }
}

/// Encode a Socket.IO packet into its text form (without the Engine.IO prefix).
#[must_use]
pub fn encode_socket_packet(packet: &SocketPacket) -> String {
    let mut out = String::new();
    out.push(packet.type_char());

    let namespace = packet.namespace();
    if namespace != DEFAULT_NAMESPACE {
        out.push_str(namespace);
        out.push(',');
    }

    match packet {
        SocketPacket::Connect { data, .. } => {
            if let Some(data) = data {
                out.push_str(&data.to_string());
            }
        }
        SocketPacket::Disconnect { .. } => {}
        SocketPacket::Event { ack_id, name, args, .. } => {
            if let Some(id) = ack_id {
                out.push_str(&id.to_string());
            }
            let mut items = Vec::with_capacity(args.len() + 1);
            items.push(Value::String(name.clone()));
            items.extend(args.iter().cloned());
            out.push_str(&Value::Array(items).to_string());
        }
        SocketPacket::Ack { ack_id, args, .. } => {
            out.push_str(&ack_id.to_string());
            out.push_str(&Value::Array(args.clone()).to_string());
        }
        SocketPacket::ConnectError { data, .. } => {
            out.push_str(&data.to_string());
        }
    }
    out
}

/// Decode the text form of a Socket.IO packet.
///
/// # Errors
///
/// Returns [`CodecError::BinaryUnsupported`] for binary packet types,
/// [`CodecError::UnknownSocketType`] for unknown type digits, and
/// [`CodecError::Malformed`] / [`CodecError::Json`] for broken bodies.
pub fn decode_socket_packet(text: &str) -> Result<SocketPacket, CodecError> {
    let mut chars = text.chars();
    let kind = chars.next().ok_or(CodecError::Empty)?;
    let mut rest = chars.as_str();

    if matches!(kind, '5' | '6') {
        return Err(CodecError::BinaryUnsupported);
    }

    let namespace = if rest.starts_with('/') {
        let (nsp, tail) = match rest.find(',') {
            Some(idx) => (&rest[..idx], &rest[idx + 1..]),
            None => (rest, ""),
        };
        rest = tail;
        nsp.to_owned()
    } else {
        DEFAULT_NAMESPACE.to_owned()
    };

    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let ack_id = if digits == 0 {
        None
    } else {
        let id = rest[..digits]
            .parse::<u64>()
            .map_err(|_| CodecError::Malformed("ack id out of range"))?;
        Some(id)
    };
    let payload = &rest[digits..];

    match kind {
        '0' => Ok(SocketPacket::Connect { namespace, data: parse_optional(payload)? }),
        '1' => Ok(SocketPacket::Disconnect { namespace }),
        '2' => {
            let mut items = parse_array(payload)?;
            if items.is_empty() {
                return Err(CodecError::Malformed("event without a name"));
            }
            let Value::String(name) = items.remove(0) else {
                return Err(CodecError::Malformed("event name is not a string"));
            };
            Ok(SocketPacket::Event { namespace, ack_id, name, args: items })
        }
        '3' => {
            let ack_id = ack_id.ok_or(CodecError::Malformed("ack without an id"))?;
            Ok(SocketPacket::Ack { namespace, ack_id, args: parse_array(payload)? })
        }
        '4' => {
            let data = parse_optional(payload)?.unwrap_or(Value::Null);
            Ok(SocketPacket::ConnectError { namespace, data })
        }
        other => Err(CodecError::UnknownSocketType(other)),
    }
}

fn parse_optional(payload: &str) -> Result<Option<Value>, CodecError> {
    if payload.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(payload)?))
}

fn parse_array(payload: &str) -> Result<Vec<Value>, CodecError> {
    if payload.is_empty() {
        return Err(CodecError::Malformed("missing payload"));
    }
    Ok(serde_json::from_str(payload)?)
}

// =============================================================================
// RELAY EVENTS
// =============================================================================

/// Event name for posted chat messages (both directions).
pub const EVENT_CHAT_MESSAGE: &str = "chat message";
/// Event name for the one-time presence announcement (outbound).
pub const EVENT_USER_CONNECTED: &str = "user connected";
/// Event name for another participant's presence announcement (inbound).
pub const EVENT_USER_JOINED: &str = "user joined";
/// Event name for another participant's disconnect (inbound).
pub const EVENT_USER_LEFT: &str = "user left";

/// Body of a `"chat message"` event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPayload {
    pub user: String,
    pub message: String,
}

/// A chat event exchanged with the relay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayEvent {
    ChatMessage(ChatPayload),
    UserConnected(String),
    UserJoined(String),
    UserLeft(String),
}

impl RelayEvent {
    /// Wire name of this event.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::ChatMessage(_) => EVENT_CHAT_MESSAGE,
            Self::UserConnected(_) => EVENT_USER_CONNECTED,
            Self::UserJoined(_) => EVENT_USER_JOINED,
            Self::UserLeft(_) => EVENT_USER_LEFT,
        }
    }

    #[must_use]
    pub fn to_socket_packet(&self) -> SocketPacket {
        let arg = match self {
            Self::ChatMessage(payload) => serde_json::json!({
                "user": payload.user,
                "message": payload.message,
            }),
            Self::UserConnected(name) | Self::UserJoined(name) | Self::UserLeft(name) => {
                Value::String(name.clone())
            }
        };
        SocketPacket::event(self.name(), vec![arg])
    }

    /// Interpret a Socket.IO event packet as a relay event.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Malformed`] for non-event packets,
    /// [`CodecError::UnknownEvent`] for names outside the chat contract and
    /// [`CodecError::InvalidPayload`] when the first argument has the wrong shape.
    pub fn from_socket_packet(packet: &SocketPacket) -> Result<Self, CodecError> {
        let SocketPacket::Event { name, args, .. } = packet else {
            return Err(CodecError::Malformed("not an event packet"));
        };

        let invalid = || CodecError::InvalidPayload { event: name.clone() };
        let first = args.first().ok_or_else(invalid)?;
        let as_name = || first.as_str().map(str::to_owned).ok_or_else(invalid);

        match name.as_str() {
            EVENT_CHAT_MESSAGE => serde_json::from_value::<ChatPayload>(first.clone())
                .map(Self::ChatMessage)
                .map_err(|_| invalid()),
            EVENT_USER_CONNECTED => as_name().map(Self::UserConnected),
            EVENT_USER_JOINED => as_name().map(Self::UserJoined),
            EVENT_USER_LEFT => as_name().map(Self::UserLeft),
            other => Err(CodecError::UnknownEvent(other.to_owned())),
        }
    }
}

/// Encode a relay event as the full WebSocket text message (`42[...]`).
#[must_use]
pub fn encode_event(event: &RelayEvent) -> String {
    let socket = encode_socket_packet(&event.to_socket_packet());
    encode_engine_packet(&EnginePacket::Message(socket))
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;

//! Relay connection lifecycle as seen by the view.

#[cfg(test)]
#[path = "connection_test.rs"]
mod connection_test;

/// Connection lifecycle of the relay client. Display only; sends never branch on it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Socket is closed and a reconnect is pending.
    Disconnected,
    /// WebSocket or Socket.IO handshake in progress.
    #[default]
    Connecting,
    /// Relay acknowledged the namespace connect.
    Connected,
}

impl ConnectionStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "offline",
            Self::Connecting => "connecting",
            Self::Connected => "online",
        }
    }
}

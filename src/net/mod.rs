//! Connection to the chat relay.
//!
//! SYSTEM CONTEXT
//! ==============
//! `session` interprets relay packets without doing I/O, `handlers` fans
//! typed events out to the view, and `relay_client` owns the WebSocket
//! lifecycle and the outbound buffer.

pub mod handlers;
pub mod relay_client;
pub mod session;

pub use handlers::RelayHandlers;
pub use relay_client::{RelayError, RelaySender, RelayShutdown, RelaySink};

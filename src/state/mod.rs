//! Client-side state for the chat widget.
//!
//! DESIGN
//! ======
//! `chat` holds everything the view owns (log, draft, identity) and is
//! mutated only through its methods. `connection` is written by the relay
//! client and only read by the view.

pub mod chat;
pub mod connection;

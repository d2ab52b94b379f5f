//! Chat widget components.
//!
//! SYSTEM CONTEXT
//! ==============
//! Components read and write `ChatState` through Leptos context and emit
//! through the shared `RelaySender`; neither talks to the socket directly.

pub mod chat_panel;
pub mod onboarding;

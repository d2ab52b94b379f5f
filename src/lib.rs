//! # relay-chat
//!
//! Leptos + WASM real-time chat widget. Connects to a Socket.IO relay, shows
//! an append-only message log, and lets the user post messages under a
//! display name chosen at startup.
//!
//! This crate contains the root component, the chat view components, the
//! view state, input validation, and the relay WebSocket client. The wire
//! codec lives in the sibling `packets` crate.

pub mod app;
pub mod components;
pub mod config;
pub mod net;
pub mod state;
pub mod util;
pub mod validation;

/// Browser entry point: install logging and mount the widget on `<body>`.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn mount() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);

    log::info!("mounting chat widget");
    leptos::mount::mount_to_body(app::App);
}

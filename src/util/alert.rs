//! Blocking validation alerts.
//!
//! In the browser this is `window.alert`, which blocks the UI thread until
//! dismissed. Native builds have no dialog and log the message instead.

/// Show `message` in a modal alert.
pub fn show(message: &str) {
    #[cfg(feature = "csr")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }
    #[cfg(not(feature = "csr"))]
    {
        log::warn!("alert: {message}");
    }
}

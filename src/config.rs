//! Fixed relay endpoint and connection tuning.
//!
//! DESIGN
//! ======
//! The widget has no config file and reads no environment. Everything that
//! would otherwise be a magic number lives on `RelayConfig`, whose `Default`
//! is the production value. Tests build their own instances.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

/// Relay endpoint the widget always connects to.
pub const RELAY_ENDPOINT: &str = "https://chat-app-ravi-ec170cd38b3a.herokuapp.com/";

/// Author of locally synthesized welcome entries.
pub const WELCOME_AUTHOR: &str = "bot";

/// Author of synthesized join/leave entries.
pub const PRESENCE_AUTHOR: &str = "Awesome bot";

/// Identity used when onboarding is skipped.
pub const DEFAULT_IDENTITY: &str = "user";

#[derive(Clone, Debug, PartialEq)]
pub struct RelayConfig {
    /// HTTP(S) base URL of the relay.
    pub endpoint: String,
    /// First reconnect delay.
    pub reconnect_delay: Duration,
    /// Upper bound for the reconnect delay.
    pub reconnect_delay_max: Duration,
    /// Jitter applied to each delay, in `0.0..=1.0`.
    pub randomization_factor: f64,
    /// How long to wait for the Engine.IO handshake on a fresh socket.
    pub connect_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint: RELAY_ENDPOINT.to_owned(),
            reconnect_delay: Duration::from_millis(1000),
            reconnect_delay_max: Duration::from_millis(5000),
            randomization_factor: 0.5,
            connect_timeout: Duration::from_millis(20_000),
        }
    }
}

impl RelayConfig {
    /// WebSocket transport URL for the configured endpoint.
    ///
    /// `http` maps to `ws` and `https` to `wss`; the Engine.IO path and query
    /// are appended after the endpoint's own path.
    #[must_use]
    pub fn websocket_url(&self) -> String {
        let endpoint = self.endpoint.trim_end_matches('/');
        let rewritten = if let Some(rest) = endpoint.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = endpoint.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            endpoint.to_owned()
        };
        format!("{rewritten}/socket.io/?EIO=4&transport=websocket")
    }

    #[must_use]
    pub fn backoff(&self) -> Backoff {
        Backoff {
            base: self.reconnect_delay,
            max: self.reconnect_delay_max,
            jitter: self.randomization_factor.clamp(0.0, 1.0),
            attempts: 0,
        }
    }
}

/// Exponential reconnect delay with jitter, reset after a successful connect.
#[derive(Clone, Debug)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    jitter: f64,
    attempts: u32,
}

impl Backoff {
    /// Delay before the next attempt. `random` is a sample in `0.0..1.0`.
    pub fn next_delay(&mut self, random: f64) -> Duration {
        let exp = 2_u32.saturating_pow(self.attempts.min(16));
        self.attempts = self.attempts.saturating_add(1);

        let mut ms = self.base.as_secs_f64() * 1000.0 * f64::from(exp);
        if self.jitter > 0.0 {
            let deviation = random.clamp(0.0, 1.0) * self.jitter * ms;
            if random < 0.5 {
                ms -= deviation;
            } else {
                ms += deviation;
            }
        }
        let max_ms = self.max.as_secs_f64() * 1000.0;
        Duration::from_secs_f64(ms.clamp(0.0, max_ms) / 1000.0)
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

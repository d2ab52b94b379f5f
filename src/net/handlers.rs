//! Inbound event callbacks registered by the view.

#[cfg(test)]
#[path = "handlers_test.rs"]
mod handlers_test;

use std::rc::Rc;

use packets::{ChatPayload, RelayEvent};

/// Callbacks for the three inbound relay events.
///
/// Every registration is kept; a handler registered twice runs twice.
#[derive(Clone, Default)]
pub struct RelayHandlers {
    message_posted: Vec<Rc<dyn Fn(ChatPayload)>>,
    participant_joined: Vec<Rc<dyn Fn(&str)>>,
    participant_left: Vec<Rc<dyn Fn(&str)>>,
}

impl RelayHandlers {
    pub fn on_message_posted(&mut self, handler: impl Fn(ChatPayload) + 'static) -> &mut Self {
        self.message_posted.push(Rc::new(handler));
        self
    }

    pub fn on_participant_joined(&mut self, handler: impl Fn(&str) + 'static) -> &mut Self {
        self.participant_joined.push(Rc::new(handler));
        self
    }

    pub fn on_participant_left(&mut self, handler: impl Fn(&str) + 'static) -> &mut Self {
        self.participant_left.push(Rc::new(handler));
        self
    }

    /// Run every handler registered for `event`, in registration order.
    ///
    /// Returns how many handlers ran. `UserConnected` is outbound-only and
    /// never has handlers.
    pub fn dispatch(&self, event: RelayEvent) -> usize {
        match event {
            RelayEvent::ChatMessage(payload) => {
                for handler in &self.message_posted {
                    handler(payload.clone());
                }
                self.message_posted.len()
            }
            RelayEvent::UserJoined(name) => {
                for handler in &self.participant_joined {
                    handler(&name);
                }
                self.participant_joined.len()
            }
            RelayEvent::UserLeft(name) => {
                for handler in &self.participant_left {
                    handler(&name);
                }
                self.participant_left.len()
            }
            RelayEvent::UserConnected(name) => {
                log::debug!("ignoring inbound presence announcement for {name}");
                0
            }
        }
    }
}

impl std::fmt::Debug for RelayHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayHandlers")
            .field("message_posted", &self.message_posted.len())
            .field("participant_joined", &self.participant_joined.len())
            .field("participant_left", &self.participant_left.len())
            .finish()
    }
}

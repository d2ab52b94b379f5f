//! Chat view state: message log, draft input and session identity.
//!
//! DESIGN
//! ======
//! The log is append-only. Entries arrive in three ways: relay broadcasts
//! (including the echo of our own sends), synthesized presence notices, and
//! the local welcome entry written once onboarding completes. A local send
//! never appends directly; the relay echo is what shows up in the log.

#[cfg(test)]
#[path = "chat_test.rs"]
mod chat_test;

use packets::ChatPayload;

use crate::config::{DEFAULT_IDENTITY, PRESENCE_AUTHOR, WELCOME_AUTHOR};
use crate::net::RelaySink;
use crate::validation::{ValidationError, validate_display_name, validate_message};

/// Who produced an entry. Affects styling only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Participant,
    System,
}

/// A single log entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub author: String,
    pub text: String,
    pub kind: MessageKind,
}

impl ChatMessage {
    #[must_use]
    pub fn participant(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self { author: author.into(), text: text.into(), kind: MessageKind::Participant }
    }

    #[must_use]
    pub fn system(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self { author: author.into(), text: text.into(), kind: MessageKind::System }
    }
}

/// One rendered row of the message pane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageRow {
    /// Position in the log; stable because the log never reorders.
    pub key: usize,
    pub author: String,
    pub text: String,
    pub system: bool,
}

/// Result of a send request from the Send button or the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// The key was not a send key; the input handles it as usual.
    Ignored,
    /// The draft went to the relay and was cleared.
    Sent,
    /// The draft failed validation and was kept.
    Rejected(ValidationError),
}

impl SendOutcome {
    /// Whether the triggering key event must not reach the input.
    #[must_use]
    pub fn consumes_key(&self) -> bool {
        !matches!(self, Self::Ignored)
    }

    /// Alert text for the user, if any.
    #[must_use]
    pub fn alert(&self) -> Option<String> {
        match self {
            Self::Rejected(e) => Some(e.to_string()),
            Self::Ignored | Self::Sent => None,
        }
    }
}

/// Whether the message pane should scroll to the newest entry, given the
/// log length seen on the previous run and the current one.
#[must_use]
pub fn log_changed(previous: Option<usize>, current: usize) -> bool {
    previous.map_or(current > 0, |prev| prev != current)
}

#[derive(Clone, Debug, Default)]
pub struct ChatState {
    pub messages: Vec<ChatMessage>,
    pub draft: String,
    /// Display name, `None` until onboarding completes.
    pub identity: Option<String>,
}

impl ChatState {
    #[must_use]
    pub fn is_onboarded(&self) -> bool {
        self.identity.is_some()
    }

    pub fn set_draft(&mut self, value: impl Into<String>) {
        self.draft = value.into();
    }

    pub fn clear_draft(&mut self) {
        self.draft.clear();
    }

    /// The message input gained focus. Starts a fresh draft.
    pub fn input_focused(&mut self) {
        self.clear_draft();
    }

    /// A key went down in the message input. Enter submits the draft.
    pub fn key_pressed(&mut self, key: &str, relay: &impl RelaySink) -> SendOutcome {
        if key == "Enter" {
            self.request_send(relay)
        } else {
            SendOutcome::Ignored
        }
    }

    /// The Send button was pressed, or Enter in the input.
    pub fn request_send(&mut self, relay: &impl RelaySink) -> SendOutcome {
        match self.submit(relay) {
            Ok(()) => SendOutcome::Sent,
            Err(e) => SendOutcome::Rejected(e),
        }
    }

    /// Finalize the session identity, announce it, and append the welcome entry.
    ///
    /// `None` means the user skipped onboarding and takes the default name.
    /// Once an identity is set, further calls return it unchanged without
    /// announcing again.
    ///
    /// # Errors
    ///
    /// Returns the name validation failure; state is left untouched.
    pub fn complete_onboarding(
        &mut self,
        input: Option<&str>,
        relay: &impl RelaySink,
    ) -> Result<String, ValidationError> {
        if let Some(existing) = &self.identity {
            return Ok(existing.clone());
        }

        let name = match input {
            Some(raw) => validate_display_name(raw)?.to_owned(),
            None => DEFAULT_IDENTITY.to_owned(),
        };

        relay.announce_presence(&name);
        self.messages
            .push(ChatMessage::system(WELCOME_AUTHOR, format!("Welcome, {name}!")));
        self.identity = Some(name.clone());
        Ok(name)
    }

    /// Validate the draft and hand it to the relay.
    ///
    /// On success exactly one `"chat message"` is emitted with the trimmed
    /// identity and draft, and the draft is cleared.
    ///
    /// # Errors
    ///
    /// Returns the draft validation failure; nothing is emitted and the draft
    /// is kept.
    pub fn submit(&mut self, relay: &impl RelaySink) -> Result<(), ValidationError> {
        let text = validate_message(&self.draft)?;
        let author = self.identity.as_deref().unwrap_or_default().trim();

        relay.send(author, text);
        self.clear_draft();
        Ok(())
    }

    /// Append a relay broadcast as-is.
    pub fn receive_message(&mut self, payload: ChatPayload) {
        self.messages
            .push(ChatMessage::participant(payload.user, payload.message));
    }

    pub fn participant_joined(&mut self, name: &str) {
        self.messages
            .push(ChatMessage::system(PRESENCE_AUTHOR, format!("{name} joined the chat!")));
    }

    pub fn participant_left(&mut self, name: &str) {
        self.messages
            .push(ChatMessage::system(PRESENCE_AUTHOR, format!("{name} left the chat.")));
    }

    /// Derive the rows the message pane displays, oldest first.
    #[must_use]
    pub fn rows(&self) -> Vec<MessageRow> {
        self.messages
            .iter()
            .enumerate()
            .map(|(key, msg)| MessageRow {
                key,
                author: msg.author.clone(),
                text: msg.text.clone(),
                system: msg.kind == MessageKind::System,
            })
            .collect()
    }
}

use super::*;
use packets::RelayEvent;
use std::cell::RefCell;

#[derive(Default)]
struct RecordingRelay {
    emitted: RefCell<Vec<RelayEvent>>,
}

impl RelaySink for RecordingRelay {
    fn emit(&self, event: RelayEvent) -> bool {
        self.emitted.borrow_mut().push(event);
        true
    }
}

impl RecordingRelay {
    fn emitted(&self) -> Vec<RelayEvent> {
        self.emitted.borrow().clone()
    }
}

fn onboarded(name: &str) -> ChatState {
    ChatState { identity: Some(name.to_owned()), ..ChatState::default() }
}

fn payload(user: &str, message: &str) -> ChatPayload {
    ChatPayload { user: user.to_owned(), message: message.to_owned() }
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn chat_state_default_is_empty_and_not_onboarded() {
    let state = ChatState::default();
    assert!(state.messages.is_empty());
    assert!(state.draft.is_empty());
    assert!(!state.is_onboarded());
}

// =============================================================
// Onboarding
// =============================================================

#[test]
fn onboarding_announces_and_welcomes() {
    let relay = RecordingRelay::default();
    let mut state = ChatState::default();

    let name = state.complete_onboarding(Some("  Alice "), &relay).expect("valid name");

    assert_eq!(name, "Alice");
    assert_eq!(state.identity.as_deref(), Some("Alice"));
    assert_eq!(relay.emitted(), vec![RelayEvent::UserConnected("Alice".to_owned())]);
    assert_eq!(state.messages, vec![ChatMessage::system("bot", "Welcome, Alice!")]);
}

#[test]
fn onboarding_skip_uses_default_identity() {
    let relay = RecordingRelay::default();
    let mut state = ChatState::default();

    assert_eq!(state.complete_onboarding(None, &relay), Ok("user".to_owned()));
    assert_eq!(relay.emitted(), vec![RelayEvent::UserConnected("user".to_owned())]);
    assert_eq!(state.messages[0].text, "Welcome, user!");
}

#[test]
fn onboarding_rejects_blank_and_markup_names_without_side_effects() {
    let relay = RecordingRelay::default();
    let mut state = ChatState::default();

    assert_eq!(state.complete_onboarding(Some("   "), &relay), Err(ValidationError::EmptyName));
    assert_eq!(
        state.complete_onboarding(Some("<b>x</b>"), &relay),
        Err(ValidationError::MarkupInName)
    );
    assert!(relay.emitted().is_empty());
    assert!(state.messages.is_empty());
    assert!(!state.is_onboarded());
}

#[test]
fn onboarding_runs_once() {
    let relay = RecordingRelay::default();
    let mut state = ChatState::default();
    state.complete_onboarding(Some("Alice"), &relay).expect("first");

    assert_eq!(state.complete_onboarding(Some("Mallory"), &relay), Ok("Alice".to_owned()));
    assert_eq!(relay.emitted().len(), 1);
    assert_eq!(state.messages.len(), 1);
}

// =============================================================
// Submit
// =============================================================

#[test]
fn submit_valid_draft_emits_once_and_clears_draft() {
    let relay = RecordingRelay::default();
    let mut state = onboarded("Alice");
    state.set_draft("Hello world");

    state.submit(&relay).expect("valid draft");

    assert_eq!(relay.emitted(), vec![RelayEvent::ChatMessage(payload("Alice", "Hello world"))]);
    assert_eq!(state.draft, "");
}

#[test]
fn submit_trims_draft_and_identity() {
    let relay = RecordingRelay::default();
    let mut state = onboarded(" Alice ");
    state.set_draft("   spaced out  ");

    state.submit(&relay).expect("valid draft");

    assert_eq!(relay.emitted(), vec![RelayEvent::ChatMessage(payload("Alice", "spaced out"))]);
}

#[test]
fn submit_does_not_append_locally() {
    let relay = RecordingRelay::default();
    let mut state = onboarded("Alice");
    state.set_draft("hi");
    state.submit(&relay).expect("valid draft");
    assert!(state.messages.is_empty());
}

#[test]
fn submit_empty_or_whitespace_never_emits() {
    for draft in ["", "   ", "\t\n"] {
        let relay = RecordingRelay::default();
        let mut state = onboarded("Alice");
        state.set_draft(draft);

        assert_eq!(state.submit(&relay), Err(ValidationError::EmptyMessage));
        assert!(relay.emitted().is_empty());
        assert!(state.messages.is_empty());
    }
}

#[test]
fn submit_markup_never_emits_and_keeps_draft() {
    let relay = RecordingRelay::default();
    let mut state = onboarded("Alice");
    state.set_draft("<script>x</script>");

    assert_eq!(state.submit(&relay), Err(ValidationError::MarkupInMessage));
    assert!(relay.emitted().is_empty());
    assert_eq!(state.draft, "<script>x</script>");
}

// =============================================================
// Input
// =============================================================

#[test]
fn enter_sends_and_consumes_the_key() {
    let relay = RecordingRelay::default();
    let mut state = onboarded("Alice");
    state.set_draft("hello");

    let outcome = state.key_pressed("Enter", &relay);

    assert_eq!(outcome, SendOutcome::Sent);
    assert!(outcome.consumes_key());
    assert_eq!(outcome.alert(), None);
    assert_eq!(relay.emitted(), vec![RelayEvent::ChatMessage(payload("Alice", "hello"))]);
    assert_eq!(state.draft, "");
}

#[test]
fn other_keys_pass_through_untouched() {
    let relay = RecordingRelay::default();
    let mut state = onboarded("Alice");
    state.set_draft("hello");

    for key in ["a", "Shift", "Tab", "enter", "NumpadEnter"] {
        let outcome = state.key_pressed(key, &relay);
        assert_eq!(outcome, SendOutcome::Ignored, "{key}");
        assert!(!outcome.consumes_key());
    }
    assert!(relay.emitted().is_empty());
    assert_eq!(state.draft, "hello");
}

#[test]
fn enter_on_invalid_draft_consumes_key_and_alerts() {
    let relay = RecordingRelay::default();
    let mut state = onboarded("Alice");
    state.set_draft("<b>hi</b>");

    let outcome = state.key_pressed("Enter", &relay);

    assert_eq!(outcome, SendOutcome::Rejected(ValidationError::MarkupInMessage));
    assert!(outcome.consumes_key());
    assert_eq!(outcome.alert().as_deref(), Some("Chat cannot contain HTML or script tags"));
    assert!(relay.emitted().is_empty());
    assert_eq!(state.draft, "<b>hi</b>");
}

#[test]
fn send_button_on_empty_draft_alerts() {
    let relay = RecordingRelay::default();
    let mut state = onboarded("Alice");

    let outcome = state.request_send(&relay);

    assert_eq!(outcome.alert().as_deref(), Some("Message cannot be empty"));
    assert!(relay.emitted().is_empty());
}

#[test]
fn focusing_the_input_clears_the_draft() {
    let mut state = onboarded("Alice");
    state.set_draft("half typed");
    state.input_focused();
    assert_eq!(state.draft, "");
}

#[test]
fn pane_follows_every_log_change() {
    assert!(!log_changed(None, 0));
    assert!(log_changed(None, 1));
    assert!(log_changed(Some(1), 2));
    assert!(!log_changed(Some(2), 2));
}

// =============================================================
// Inbound
// =============================================================

#[test]
fn inbound_message_appends_in_arrival_order() {
    let mut state = onboarded("Alice");
    state.receive_message(payload("Bob", "Hi"));
    state.receive_message(payload("Cy", "<b>raw</b>"));

    assert_eq!(state.messages.len(), 2);
    assert_eq!(state.messages[0], ChatMessage::participant("Bob", "Hi"));
    assert_eq!(state.messages[1], ChatMessage::participant("Cy", "<b>raw</b>"));
}

#[test]
fn presence_notices_are_system_entries() {
    let mut state = ChatState::default();
    state.participant_joined("Pat");
    state.participant_left("Pat");

    assert_eq!(
        state.messages,
        vec![
            ChatMessage::system("Awesome bot", "Pat joined the chat!"),
            ChatMessage::system("Awesome bot", "Pat left the chat."),
        ]
    );
}

// =============================================================
// Rendering
// =============================================================

#[test]
fn rows_are_keyed_by_position_and_flag_system_entries() {
    let mut state = ChatState::default();
    state.participant_joined("Pat");
    state.receive_message(payload("Pat", "yo"));

    let rows = state.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].key, 0);
    assert!(rows[0].system);
    assert_eq!(rows[1].key, 1);
    assert_eq!(rows[1].author, "Pat");
    assert!(!rows[1].system);
}

#[test]
fn rows_derivation_is_idempotent() {
    let mut state = ChatState::default();
    state.receive_message(payload("A", "1"));
    state.receive_message(payload("B", "2"));

    assert_eq!(state.rows(), state.rows());
    assert_eq!(state.rows().len(), state.messages.len());
}

//! Real-time chat panel displaying the log and sending messages.

use leptos::prelude::*;

use crate::net::RelaySender;
use crate::state::chat::{ChatState, MessageRow, SendOutcome, log_changed};
use crate::state::connection::ConnectionStatus;
use crate::util::alert;

/// Chat panel showing the message log and an input for sending new messages.
///
/// Author and text are inserted as text nodes, so markup in relayed messages
/// is displayed literally.
#[component]
pub fn ChatPanel() -> impl IntoView {
    let chat = expect_context::<RwSignal<ChatState>>();
    let status = expect_context::<RwSignal<ConnectionStatus>>();
    let sender = expect_context::<RwSignal<RelaySender>>();

    let messages_ref = NodeRef::<leptos::html::Div>::new();
    let rows = Memo::new(move |_| chat.with(ChatState::rows));
    let message_count = Memo::new(move |_| chat.with(|c| c.messages.len()));

    // Keep the newest entry in view after every log change.
    Effect::new(move |previous: Option<usize>| {
        let count = message_count.get();
        if log_changed(previous, count) {
            scroll_to_bottom(messages_ref);
        }
        count
    });

    let do_send = move || {
        let relay = sender.get_untracked();
        if let Some(outcome) = chat.try_update(|c| c.request_send(&relay)) {
            report(&outcome);
        }
    };

    let on_keydown = move |ev: leptos::ev::KeyboardEvent| {
        let relay = sender.get_untracked();
        let Some(outcome) = chat.try_update(|c| c.key_pressed(&ev.key(), &relay)) else {
            return;
        };
        if outcome.consumes_key() {
            ev.prevent_default();
        }
        report(&outcome);
    };

    let placeholder = move || {
        let name = chat.with(|c| c.identity.clone().unwrap_or_default());
        format!("Message as {name}...")
    };

    view! {
        <div class="chat-panel">
            <div class="chat-panel__header">
                <span class="chat-panel__identity">
                    {move || chat.with(|c| c.identity.clone().unwrap_or_default())}
                </span>
                <span
                    class="chat-panel__status"
                    class:chat-panel__status--online=move || status.get() == ConnectionStatus::Connected
                >
                    {move || status.get().label()}
                </span>
            </div>

            <div id="chat-messages" class="chat-panel__messages" node_ref=messages_ref>
                <For
                    each=move || rows.get()
                    key=|row| row.key
                    children=move |row: MessageRow| {
                        view! {
                            <div class="chat-panel__message" class:chat-panel__message--system=row.system>
                                <span class="chat-panel__author">{row.author}</span>
                                <span class="chat-panel__text">{row.text}</span>
                            </div>
                        }
                    }
                />
            </div>

            <div class="chat-panel__input-row">
                <input
                    class="chat-panel__input"
                    type="text"
                    autocomplete="off"
                    placeholder=placeholder
                    prop:value=move || chat.with(|c| c.draft.clone())
                    on:input=move |ev| chat.update(|c| c.set_draft(event_target_value(&ev)))
                    on:focus=move |_| chat.update(ChatState::input_focused)
                    on:keydown=on_keydown
                />
                <button class="btn btn--primary chat-panel__send" on:click=move |_| do_send()>
                    "Send"
                </button>
            </div>
        </div>
    }
}

fn report(outcome: &SendOutcome) {
    if let Some(message) = outcome.alert() {
        alert::show(&message);
    }
}

fn scroll_to_bottom(messages_ref: NodeRef<leptos::html::Div>) {
    #[cfg(feature = "csr")]
    {
        if let Some(el) = messages_ref.get() {
            let scroll_height = el.scroll_height();
            el.set_scroll_top(scroll_height);
        }
    }
    #[cfg(not(feature = "csr"))]
    let _ = messages_ref;
}

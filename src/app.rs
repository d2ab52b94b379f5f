//! Root application component and context providers.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};

use crate::components::{chat_panel::ChatPanel, onboarding::Onboarding};
use crate::net::{RelayHandlers, RelaySender};
use crate::state::chat::ChatState;
use crate::state::connection::ConnectionStatus;

/// Root application component.
///
/// Owns the relay connection for the page session: it is opened once here,
/// its handlers append to the shared `ChatState`, the sender is provided to
/// the components through context, and the connection stops when the
/// component is torn down.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let chat = RwSignal::new(ChatState::default());
    let status = RwSignal::new(ConnectionStatus::default());

    let mut handlers = RelayHandlers::default();
    handlers
        .on_message_posted(move |payload| chat.update(|c| c.receive_message(payload)))
        .on_participant_joined(move |name| chat.update(|c| c.participant_joined(name)))
        .on_participant_left(move |name| chat.update(|c| c.participant_left(name)));

    #[cfg(feature = "csr")]
    let sender = {
        let (sender, shutdown) =
            crate::net::relay_client::connect(crate::config::RelayConfig::default(), handlers, status);
        on_cleanup(move || shutdown.close());
        sender
    };
    #[cfg(not(feature = "csr"))]
    let sender = {
        let _ = handlers;
        RelaySender::default()
    };

    provide_context(chat);
    provide_context(status);
    provide_context(RwSignal::<RelaySender>::new(sender));

    view! {
        <Title text="Chat"/>

        <div id="chat-container">
            <Show
                when=move || chat.with(ChatState::is_onboarded)
                fallback=|| view! { <Onboarding/> }
            >
                <ChatPanel/>
            </Show>
        </div>
    }
}

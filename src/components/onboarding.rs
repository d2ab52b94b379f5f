//! Display-name form shown before the chat opens.

use leptos::prelude::*;

use crate::net::RelaySender;
use crate::state::chat::ChatState;
use crate::util::alert;

/// Collects the session identity. The chat panel replaces this view once
/// `ChatState::complete_onboarding` succeeds; invalid names raise an alert and
/// keep the form open.
#[component]
pub fn Onboarding() -> impl IntoView {
    let chat = expect_context::<RwSignal<ChatState>>();
    let sender = expect_context::<RwSignal<RelaySender>>();
    let name = RwSignal::new(String::new());

    let finish = move |input: Option<String>| {
        let relay = sender.get_untracked();
        if let Some(Err(e)) = chat.try_update(|c| c.complete_onboarding(input.as_deref(), &relay)) {
            alert::show(&e.to_string());
        }
    };

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        finish(Some(name.get_untracked()));
    };

    view! {
        <form class="onboarding" on:submit=on_submit>
            <label class="onboarding__label" for="onboarding-name">
                "Enter your name:"
            </label>
            <input
                id="onboarding-name"
                class="onboarding__input"
                type="text"
                autocomplete="off"
                autofocus
                prop:value=move || name.get()
                on:input=move |ev| name.set(event_target_value(&ev))
            />
            <div class="onboarding__actions">
                <button class="btn btn--primary" type="submit">
                    "Join"
                </button>
                <button class="btn" type="button" on:click=move |_| finish(None)>
                    "Skip"
                </button>
            </div>
        </form>
    }
}

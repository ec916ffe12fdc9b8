use dioxus::prelude::*;

use crate::app::{use_api, use_navigator};
use crate::ui::{ButtonVariant, ErrorBanner, UiButton, UiInput};

#[component]
pub fn LoginView() -> Element {
    let api = use_api();
    let mut navigator = use_navigator();
    let mut username = use_signal(String::new);
    let mut password = use_signal(String::new);
    let mut busy = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);

    let on_submit = move |_| {
        let api = api.clone();
        let (user, secret) = (username(), password());
        spawn(async move {
            busy.set(true);
            error.set(None);
            match api.login(&user, &secret).await {
                Ok(session) => {
                    tracing::info!("Signed in as {}", session.display_name());
                    password.set(String::new());
                    navigator.write().on_login();
                }
                Err(failure) => error.set(Some(failure.user_message())),
            }
            busy.set(false);
        });
    };

    rsx! {
        div {
            class: "ui-card",
            ErrorBanner { message: error() }
            label { r#for: "login-username", class: "ui-muted", "Username" }
            UiInput {
                id: "login-username",
                autocomplete: "username",
                value: "{username}",
                oninput: move |event: FormEvent| username.set(event.value()),
            }
            label { r#for: "login-password", class: "ui-muted", "Password" }
            UiInput {
                id: "login-password",
                r#type: "password",
                autocomplete: "current-password",
                value: "{password}",
                oninput: move |event: FormEvent| password.set(event.value()),
            }
            UiButton {
                variant: ButtonVariant::Primary,
                block: true,
                disabled: busy(),
                onclick: on_submit,
                if busy() { "Signing in..." } else { "Sign In" }
            }
        }
    }
}

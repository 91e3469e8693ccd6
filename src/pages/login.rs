//! Login page: username + password form.
//!
//! SYSTEM CONTEXT
//! ==============
//! Guest-only. A successful login settles the session cache, after which the
//! route guard would move the visitor home anyway; the page navigates
//! explicitly so the transition does not wait on a re-render.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::components::navigation_bar::NavigationBar;
use crate::config::ClientConfig;
use crate::net::types::Credentials;
use crate::util::auth::use_session_mutations;

/// Trim the username and require both fields.
pub(crate) fn validate_login_input(username: &str, password: &str) -> Result<Credentials, &'static str> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err("Enter both username and password.");
    }
    Ok(Credentials { username: username.to_owned(), password: password.to_owned() })
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let config = expect_context::<ClientConfig>();
    let mutations = use_session_mutations();
    let navigate = use_navigate();

    let username = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let message = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let credentials = match validate_login_input(&username.get(), &password.get()) {
            Ok(credentials) => credentials,
            Err(text) => {
                message.set(Some(text.to_owned()));
                return;
            }
        };
        busy.set(true);
        message.set(None);

        let navigate = navigate.clone();
        let home = config.home_path.clone();
        leptos::task::spawn_local(async move {
            match mutations.get().login(&credentials).await {
                Ok(_) => navigate(&home, NavigateOptions::default()),
                Err(e) => {
                    message.set(Some(e.to_string()));
                    password.set(String::new());
                    busy.set(false);
                }
            }
        });
    };

    view! {
        <NavigationBar/>
        <main class="login-page">
            <form id="login-form" class="login-form" on:submit=on_submit>
                <h1>"Log in"</h1>
                <input
                    class="login-input"
                    type="text"
                    placeholder="Username"
                    autocomplete="username"
                    prop:value=move || username.get()
                    on:input=move |ev| username.set(event_target_value(&ev))
                />
                <input
                    class="login-input"
                    type="password"
                    placeholder="Password"
                    autocomplete="current-password"
                    prop:value=move || password.get()
                    on:input=move |ev| password.set(event_target_value(&ev))
                />
                <button class="login-button" type="submit" disabled=move || busy.get()>
                    "Log in"
                </button>
                <Show when=move || message.get().is_some()>
                    <p class="login-message">{move || message.get().unwrap_or_default()}</p>
                </Show>
            </form>
        </main>
    }
}

//! Signup page: creates an account, then sends the visitor to log in.

#[cfg(test)]
#[path = "signup_test.rs"]
mod signup_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::components::navigation_bar::NavigationBar;
use crate::config::ClientConfig;
use crate::net::types::{NewAccount, ValidationErrors};
use crate::state::mutations::MutationError;
use crate::util::auth::use_session_mutations;

pub(crate) fn validate_sign_up_input(
    username: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<NewAccount, &'static str> {
    let username = username.trim();
    let email = email.trim();
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err("Username, email and password are required.");
    }
    if password != confirm_password {
        return Err("Passwords must match.");
    }
    Ok(NewAccount { username: username.to_owned(), email: email.to_owned(), password: password.to_owned() })
}

#[component]
pub fn SignUpPage() -> impl IntoView {
    let config = expect_context::<ClientConfig>();
    let mutations = use_session_mutations();
    let navigate = use_navigate();

    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm_password = RwSignal::new(String::new());
    let field_errors = RwSignal::new(ValidationErrors::default());
    let message = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let validated = validate_sign_up_input(&username.get(), &email.get(), &password.get(), &confirm_password.get());
        let account = match validated {
            Ok(account) => account,
            Err(text) => {
                message.set(Some(text.to_owned()));
                return;
            }
        };
        busy.set(true);
        message.set(None);
        field_errors.set(ValidationErrors::default());

        let navigate = navigate.clone();
        let login = config.login_path.clone();
        leptos::task::spawn_local(async move {
            match mutations.get().sign_up(&account).await {
                Ok(_) => navigate(&login, NavigateOptions::default()),
                Err(MutationError::Validation(errors)) => {
                    field_errors.set(errors);
                    busy.set(false);
                }
                Err(e) => {
                    message.set(Some(e.to_string()));
                    busy.set(false);
                }
            }
        });
    };

    let field_error = move |field: &'static str| move || field_errors.with(|errors| errors.message_for(field));

    view! {
        <NavigationBar/>
        <main id="signup">
            <h1>"Let's get started!"</h1>
            <form id="sign-up-form" on:submit=on_submit>
                <input
                    type="text"
                    placeholder="Username"
                    prop:value=move || username.get()
                    on:input=move |ev| username.set(event_target_value(&ev))
                />
                <p class="field-error">{field_error("username")}</p>
                <input
                    type="email"
                    placeholder="Email"
                    prop:value=move || email.get()
                    on:input=move |ev| email.set(event_target_value(&ev))
                />
                <p class="field-error">{field_error("email")}</p>
                <input
                    type="password"
                    placeholder="Password"
                    prop:value=move || password.get()
                    on:input=move |ev| password.set(event_target_value(&ev))
                />
                <p class="field-error">{field_error("password")}</p>
                <input
                    type="password"
                    placeholder="Confirm password"
                    prop:value=move || confirm_password.get()
                    on:input=move |ev| confirm_password.set(event_target_value(&ev))
                />
                <button type="submit" disabled=move || busy.get()>"Sign up"</button>
                <Show when=move || message.get().is_some()>
                    <p class="form-message">{move || message.get().unwrap_or_default()}</p>
                </Show>
            </form>
        </main>
    }
}

//! User settings page: edit username, email, profile picture and password.
//!
//! SYSTEM CONTEXT
//! ==============
//! Authenticated-only. It reads the principal through the cache and writes
//! through `SessionMutations::update_profile`, which invalidates the session
//! so the navigation bar and this page pick up the new identity together.
//!
//! A picture is uploaded as soon as it is chosen, through
//! `SessionMutations::change_profile_picture`, independently of the form.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use leptos::prelude::*;

use crate::components::navigation_bar::NavigationBar;
use crate::config::ClientConfig;
use crate::net::types::{NewFile, Principal, ProfileChanges, ValidationErrors};
use crate::state::mutations::MutationError;
use crate::util::auth::{use_authenticated_user, use_session_mutations};

/// Raw form input. Blank fields mean "leave unchanged".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct SettingsForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Only fields that were filled in and differ from the current record.
pub(crate) fn profile_changes(current: &Principal, form: &SettingsForm) -> ProfileChanges {
    let changed = |input: &str, existing: &str| {
        let input = input.trim();
        (!input.is_empty() && input != existing).then(|| input.to_owned())
    };
    ProfileChanges {
        username: changed(&form.username, &current.username),
        email: changed(&form.email, &current.email),
        profile_picture_url: None,
        password: (!form.password.is_empty()).then(|| form.password.clone()),
    }
}

/// Accept a chosen file as a profile picture: it must be a non-empty image.
#[cfg_attr(not(feature = "hydrate"), allow(dead_code))]
pub(crate) fn picture_upload(mime_type: &str, data: Vec<u8>) -> Result<NewFile, &'static str> {
    if !mime_type.starts_with("image/") {
        return Err("Choose an image file.");
    }
    if data.is_empty() {
        return Err("The selected image is empty.");
    }
    Ok(NewFile::picture(mime_type, data))
}

/// Read the first file selected in a file input.
#[cfg(feature = "hydrate")]
async fn read_selected_file(ev: &leptos::ev::Event) -> Option<(String, Vec<u8>)> {
    use wasm_bindgen::JsCast;

    let input = ev.target()?.dyn_into::<web_sys::HtmlInputElement>().ok()?;
    let file = input.files()?.get(0)?;
    let buffer = wasm_bindgen_futures::JsFuture::from(file.array_buffer())
        .await
        .inspect_err(|e| log::warn!("could not read selected file: {e:?}"))
        .ok()?;
    Some((file.type_(), js_sys::Uint8Array::new(&buffer).to_vec()))
}

#[component]
pub fn UserSettingsPage() -> impl IntoView {
    let config = expect_context::<ClientConfig>();
    let user = use_authenticated_user();
    let mutations = use_session_mutations();

    let form = RwSignal::new(SettingsForm::default());
    let field_errors = RwSignal::new(ValidationErrors::default());
    let message = RwSignal::new(None::<String>);
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let session = user.get();
        let Ok(current) = session.require_principal() else {
            message.set(Some(MutationError::Unauthenticated.to_string()));
            return;
        };
        let changes = profile_changes(current, &form.get());
        if changes.is_empty() {
            message.set(Some("Nothing to update.".to_owned()));
            return;
        }
        busy.set(true);
        message.set(None);
        field_errors.set(ValidationErrors::default());

        leptos::task::spawn_local(async move {
            match mutations.get().update_profile(&changes).await {
                Ok(_) => {
                    form.set(SettingsForm::default());
                    message.set(Some("Profile updated.".to_owned()));
                }
                Err(MutationError::Validation(errors)) => field_errors.set(errors),
                Err(e) => message.set(Some(e.to_string())),
            }
            busy.set(false);
        });
    };

    let on_picture = {
        #[cfg(feature = "hydrate")]
        {
            move |ev: leptos::ev::Event| {
                if busy.get() {
                    return;
                }
                busy.set(true);
                message.set(None);
                field_errors.set(ValidationErrors::default());
                let api_base_url = config.api_base_url.clone();
                leptos::task::spawn_local(async move {
                    let Some((mime_type, data)) = read_selected_file(&ev).await else {
                        busy.set(false);
                        return;
                    };
                    let file = match picture_upload(&mime_type, data) {
                        Ok(file) => file,
                        Err(text) => {
                            message.set(Some(text.to_owned()));
                            busy.set(false);
                            return;
                        }
                    };
                    match mutations.get().change_profile_picture(&file, &api_base_url).await {
                        Ok(_) => message.set(Some("Profile picture updated.".to_owned())),
                        Err(MutationError::Validation(errors)) => {
                            // Upload failures are keyed by the file's fields, not the form's.
                            message.set(errors.message_for("data").or_else(|| errors.message_for("mimeType")));
                            field_errors.set(errors);
                        }
                        Err(e) => message.set(Some(e.to_string())),
                    }
                    busy.set(false);
                });
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = &config;
            move |_ev: leptos::ev::Event| {}
        }
    };

    let field_error = move |field: &'static str| move || field_errors.with(|errors| errors.message_for(field));
    let current = move |pick: fn(&Principal) -> String| move || user.get().principal().map(pick).unwrap_or_default();

    view! {
        <NavigationBar/>
        <main class="settings-page">
            <h1>"Settings"</h1>
            <img
                class="settings-page__avatar"
                alt=""
                src=current(|p| p.profile_picture_url.clone())
            />
            <label class="settings-page__picture">
                "Change picture"
                <input type="file" accept="image/*" disabled=move || busy.get() on:change=on_picture/>
            </label>
            <p class="field-error">{field_error("profilePictureUrl")}</p>
            <form id="user-settings-form" on:submit=on_submit>
                <input
                    type="text"
                    placeholder=current(|p| p.username.clone())
                    prop:value=move || form.with(|f| f.username.clone())
                    on:input=move |ev| form.update(|f| f.username = event_target_value(&ev))
                />
                <p class="field-error">{field_error("username")}</p>
                <input
                    type="email"
                    placeholder=current(|p| p.email.clone())
                    prop:value=move || form.with(|f| f.email.clone())
                    on:input=move |ev| form.update(|f| f.email = event_target_value(&ev))
                />
                <p class="field-error">{field_error("email")}</p>
                <input
                    type="password"
                    placeholder="New password"
                    prop:value=move || form.with(|f| f.password.clone())
                    on:input=move |ev| form.update(|f| f.password = event_target_value(&ev))
                />
                <p class="field-error">{field_error("password")}</p>
                <button type="submit" disabled=move || busy.get()>"Save"</button>
                <Show when=move || message.get().is_some()>
                    <p class="form-message">{move || message.get().unwrap_or_default()}</p>
                </Show>
            </form>
        </main>
    }
}

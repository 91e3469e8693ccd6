//! Logout page: ends the session on mount, then leaves.
//!
//! Success resets the session cache and goes home; any failure goes to the
//! error route with the session left as it was.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::components::loading_overlay::LoadingOverlay;
use crate::config::ClientConfig;
use crate::util::auth::use_session_mutations;

#[component]
pub fn LogoutPage() -> impl IntoView {
    let config = expect_context::<ClientConfig>();
    let mutations = use_session_mutations();
    let navigate = use_navigate();
    let started = StoredValue::new(false);

    Effect::new(move || {
        if started.get_value() {
            return;
        }
        started.set_value(true);

        let navigate = navigate.clone();
        let ClientConfig { home_path, error_path, .. } = config.clone();
        leptos::task::spawn_local(async move {
            let target = match mutations.get().logout().await {
                Ok(()) => home_path,
                Err(e) => {
                    log::warn!("logout failed: {e:?}");
                    error_path
                }
            };
            navigate(&target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        });
    });

    view! { <LoadingOverlay/> }
}

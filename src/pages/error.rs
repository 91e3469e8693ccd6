//! Where guards send visitors when the session could not be determined.
//!
//! "Try again" resets the whole session so both cache keys are fetched fresh,
//! then returns home where the guards decide again.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::components::navigation_bar::BRAND;
use crate::config::ClientConfig;
use crate::util::auth::CacheContext;

#[component]
pub fn ErrorPage() -> impl IntoView {
    let config = expect_context::<ClientConfig>();
    let cache = expect_context::<CacheContext>();
    let navigate = use_navigate();

    let on_retry = move |_| {
        cache.with_value(|cache| cache.reset_session());
        navigate(&config.home_path, NavigateOptions::default());
    };

    view! {
        <main class="error-page">
            <h1>{BRAND}</h1>
            <p>"An unexpected error has occurred."</p>
            <button type="button" on:click=on_retry>"Try again"</button>
        </main>
    }
}

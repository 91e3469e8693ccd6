//! Full-page placeholder shown while the session is first being resolved.

use leptos::prelude::*;

#[component]
pub fn LoadingOverlay() -> impl IntoView {
    view! {
        <div class="loading-overlay" role="status" aria-live="polite">
            <span class="loading-overlay__spinner"></span>
            <span class="loading-overlay__label">"Loading..."</span>
        </div>
    }
}

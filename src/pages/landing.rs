//! `/` for guests.

use leptos::prelude::*;

use crate::components::navigation_bar::{BRAND, NavigationBar};

#[component]
pub fn LandingPage() -> impl IntoView {
    view! {
        <NavigationBar/>
        <main class="landing-page">
            <h1>{BRAND}</h1>
            <p>"Keep an eye on the services you depend on."</p>
            <a class="landing-page__cta" href="/signup">"Get started"</a>
        </main>
    }
}

use leptos::prelude::*;

use crate::components::navigation_bar::NavigationBar;

#[component]
pub fn NotFoundPage() -> impl IntoView {
    view! {
        <NavigationBar/>
        <main class="not-found-page">
            <h1>"Page not found."</h1>
            <a href="/">"Back to start"</a>
        </main>
    }
}

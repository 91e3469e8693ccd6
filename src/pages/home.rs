//! `/` for signed-in users.

use leptos::prelude::*;

use crate::components::navigation_bar::NavigationBar;
use crate::util::auth::use_authenticated_user;

#[component]
pub fn HomePage() -> impl IntoView {
    let user = use_authenticated_user();
    let greeting = move || {
        user.get()
            .principal()
            .map_or_else(|| "Welcome back.".to_owned(), |p| format!("Welcome back, {}.", p.username))
    };

    view! {
        <NavigationBar/>
        <main class="home-page">
            <h1>{greeting}</h1>
        </main>
    }
}

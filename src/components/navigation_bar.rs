//! Top navigation bar with session-aware links.
//!
//! SYSTEM CONTEXT
//! ==============
//! Rendered on every page. The links read the same status verdict as the
//! route guards, so the bar never shows "Logout" while a guard treats the
//! visitor as a guest. The user menu subscribes to the principal key itself,
//! since the status endpoint never carries the user record.

#[cfg(test)]
#[path = "navigation_bar_test.rs"]
mod navigation_bar_test;

use leptos::prelude::*;

use crate::state::session::SessionState;
use crate::util::auth::{use_authenticated_user, use_authentication_status};

pub const BRAND: &str = "Status Tracker";

/// A navigation link: `(href, label)`.
pub type NavLink = (&'static str, &'static str);

/// Links for the right-hand group. Empty until the first verdict arrives so
/// the bar does not flash guest links at a signed-in user.
pub fn nav_links(state: &SessionState) -> Vec<NavLink> {
    if state.is_initial_loading && state.verdict.is_undecided() {
        return Vec::new();
    }
    if state.is_authenticated() {
        vec![("/settings", "Settings"), ("/logout", "Logout")]
    } else {
        vec![("/login", "Login"), ("/signup", "Sign Up")]
    }
}

/// Who the user menu shows: `(username, profile picture URL)`.
pub fn user_badge(state: &SessionState) -> Option<(String, String)> {
    state
        .principal()
        .map(|p| (p.username.clone(), p.profile_picture_url.clone()))
}

#[component]
fn UserMenu() -> impl IntoView {
    let user = use_authenticated_user();

    move || {
        user_badge(&user.get()).map(|(username, picture)| {
            view! {
                <span class="navigation-bar__user">
                    <img class="navigation-bar__avatar" src=picture alt=""/>
                    <span class="navigation-bar__username">{username}</span>
                </span>
            }
        })
    }
}

#[component]
pub fn NavigationBar() -> impl IntoView {
    let session = use_authentication_status();

    let links = move || {
        nav_links(&session.get())
            .into_iter()
            .map(|(href, label)| view! { <a class="navigation-bar__link" href=href>{label}</a> })
            .collect_view()
    };

    view! {
        <nav class="navigation-bar">
            <div class="navigation-bar__group">
                <a class="navigation-bar__brand" href="/">{BRAND}</a>
            </div>
            <div class="navigation-bar__group">
                <UserMenu/>
                {links}
            </div>
        </nav>
    }
}

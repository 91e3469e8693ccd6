//! Route that shows one of two views depending on whether anyone is signed in.
//!
//! Used for `/`, which is the landing page for guests and the home page for
//! signed-in users. A session fault still goes to the error route.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::loading_overlay::LoadingOverlay;
use crate::config::ClientConfig;
use crate::util::auth::{install_guard_redirect, use_authentication_status};
use crate::util::guard::{GuardDecision, GuardState, Resolution, RouteGuard};

#[component]
pub fn ConditionalRoute(#[prop(into)] authenticated: ViewFn, #[prop(into)] guest: ViewFn) -> impl IntoView {
    let config = expect_context::<ClientConfig>();
    let session = use_authentication_status();
    let guard = RouteGuard::authenticated_only(config.login_path).with_error_redirect(config.error_path.clone());
    let state = Memo::new(move |_| guard.resolve(&session.get()));

    let error_path = config.error_path;
    let decision = Memo::new(move |_| match state.get() {
        GuardState::Resolved(Resolution::Errored) => GuardDecision::Redirect(error_path.clone()),
        GuardState::Pending => GuardDecision::Pending,
        GuardState::Resolved(_) => GuardDecision::Render,
    });
    install_guard_redirect(decision, use_navigate());

    move || match state.get() {
        GuardState::Resolved(Resolution::Permitted) => authenticated.run(),
        GuardState::Resolved(Resolution::Denied) => guest.run(),
        GuardState::Pending | GuardState::Resolved(Resolution::Errored) => view! { <LoadingOverlay/> }.into_any(),
    }
}

//! Route wrapper that renders its children only when a guard permits.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` wraps every access-controlled route in this component. The redirect
//! rules live in `util::guard`; this file only renders the decision and
//! performs the navigation.

use leptos::prelude::*;
use leptos_router::hooks::use_navigate;

use crate::components::loading_overlay::LoadingOverlay;
use crate::util::auth::{install_guard_redirect, use_authentication_status};
use crate::util::guard::{GuardDecision, RouteGuard};

/// Children are never rendered unless the decision is `Render`; while a
/// redirect is pending the loading overlay stays up.
#[component]
pub fn RestrictedRoute(guard: RouteGuard, children: ChildrenFn) -> impl IntoView {
    let session = use_authentication_status();
    let decision = Memo::new(move |_| guard.decide(&session.get()));
    install_guard_redirect(decision, use_navigate());

    move || match decision.get() {
        GuardDecision::Render => children().into_any(),
        GuardDecision::Pending | GuardDecision::Redirect(_) => view! { <LoadingOverlay/> }.into_any(),
    }
}

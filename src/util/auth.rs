//! Leptos bindings for the session cache.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` provides one `AuthCache` through context. Components never touch it
//! directly; they call `use_authentication_status` / `use_authenticated_user`
//! and render from the returned signal, or build `SessionMutations` with
//! `use_session_mutations`.
//!
//! DESIGN
//! ======
//! Subscribing happens inside an `Effect`, so it runs in the browser only.
//! Server rendering and the first hydrated render both see the default
//! "initial loading" state, which keeps the two in agreement. The
//! subscription lives in a `StoredValue` owned by the calling component and
//! is dropped with it.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;

use crate::state::auth::{AuthCache, Subscription};
use crate::state::mutations::SessionMutations;
use crate::state::session::{CacheKey, SessionState};
use crate::util::guard::GuardDecision;

/// The context value holding the shared cache.
pub type CacheContext = StoredValue<AuthCache, LocalStorage>;

/// Make `cache` available to every component below the current owner.
pub fn provide_auth_cache(cache: AuthCache) -> CacheContext {
    let stored = StoredValue::new_local(cache);
    provide_context(stored);
    stored
}

/// A component's live view of one cache key.
#[derive(Clone, Copy)]
pub struct SessionHandle {
    state: RwSignal<SessionState>,
    key: CacheKey,
    cache: CacheContext,
}

impl SessionHandle {
    /// Tracked read of the current session.
    pub fn get(&self) -> SessionState {
        self.state.get()
    }

    pub fn signal(&self) -> ReadSignal<SessionState> {
        self.state.read_only()
    }

    /// Force a fresh fetch for this handle's key.
    pub fn refetch(&self) {
        let key = self.key;
        self.cache.with_value(|cache| cache.refetch(key));
    }
}

/// Session as seen through the boolean status endpoint.
pub fn use_authentication_status() -> SessionHandle {
    use_session(CacheKey::Status)
}

/// Session as seen through the principal endpoint, for views that show who
/// is signed in.
pub fn use_authenticated_user() -> SessionHandle {
    use_session(CacheKey::Principal)
}

/// Copyable handle for starting session mutations from event handlers.
#[derive(Clone, Copy)]
pub struct MutationsHandle {
    cache: CacheContext,
}

impl MutationsHandle {
    pub fn get(&self) -> SessionMutations {
        SessionMutations::new(self.cache.get_value())
    }
}

pub fn use_session_mutations() -> MutationsHandle {
    MutationsHandle { cache: expect_context::<CacheContext>() }
}

fn use_session(key: CacheKey) -> SessionHandle {
    let cache = expect_context::<CacheContext>();
    let state = RwSignal::new(SessionState::default());
    let subscription = StoredValue::new_local(None::<Subscription>);

    Effect::new(move || {
        if subscription.with_value(Option::is_some) {
            return;
        }
        let subscribed = cache.with_value(|cache| {
            state.set(cache.session(key));
            // The component may already be disposed when a late fetch lands.
            cache.subscribe(key, move |cache| {
                let _ = state.try_set(cache.session(key));
            })
        });
        subscription.set_value(Some(subscribed));
    });

    SessionHandle { state, key, cache }
}

/// Where a guard decision wants to go, if anywhere.
pub fn redirect_target(decision: &GuardDecision) -> Option<&str> {
    match decision {
        GuardDecision::Redirect(target) => Some(target.as_str()),
        GuardDecision::Pending | GuardDecision::Render => None,
    }
}

/// Navigate whenever `decision` turns into a redirect. History is replaced so
/// the back button does not bounce through the guarded route.
pub fn install_guard_redirect<F>(decision: Memo<GuardDecision>, navigate: F)
where
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        let decision = decision.get();
        if let Some(target) = redirect_target(&decision) {
            navigate(target, NavigateOptions { replace: true, ..NavigateOptions::default() });
        }
    });
}

use super::*;
use crate::net::gateway::{PRINCIPAL_PATH, STATUS_PATH};
use crate::state::session::{AuthVerdict, CacheKey};
use crate::test_support::{Harness, principal, principal_json};

fn state(verdict: AuthVerdict, is_initial_loading: bool) -> SessionState {
    SessionState { verdict, is_loading: false, is_initial_loading }
}

#[test]
fn no_links_before_first_verdict() {
    assert!(nav_links(&SessionState::default()).is_empty());
    assert!(nav_links(&state(AuthVerdict::loading(), true)).is_empty());
}

#[test]
fn guest_links() {
    let links = nav_links(&state(AuthVerdict::unauthenticated(), false));
    assert_eq!(links, vec![("/login", "Login"), ("/signup", "Sign Up")]);
}

#[test]
fn signed_in_links() {
    let links = nav_links(&state(AuthVerdict::authenticated(None), false));
    assert_eq!(links, vec![("/settings", "Settings"), ("/logout", "Logout")]);
}

#[test]
fn errored_session_shows_guest_links() {
    let links = nav_links(&state(AuthVerdict::errored(), false));
    assert!(links.contains(&("/login", "Login")));
}

#[test]
fn user_badge_shows_name_and_picture() {
    let alice = principal(1, "alice");
    let badge = user_badge(&state(AuthVerdict::authenticated(Some(alice.clone())), false));
    assert_eq!(badge, Some((alice.username, alice.profile_picture_url)));
    assert_eq!(user_badge(&state(AuthVerdict::unauthenticated(), false)), None);
}

#[test]
fn bar_subscriptions_load_the_signed_in_user() {
    let mut h = Harness::new();
    // The links and the user menu each hold one subscription.
    let _links = h.cache.subscribe(CacheKey::Status, |_| {});
    let _menu = h.cache.subscribe(CacheKey::Principal, |_| {});
    h.settle();

    let alice = principal(1, "alice");
    h.transport.take(STATUS_PATH).unwrap().respond(200, "true");
    h.transport.take(PRINCIPAL_PATH).unwrap().respond(200, &principal_json(&alice));
    h.settle();

    assert_eq!(h.transport.requests_to(PRINCIPAL_PATH), 1);
    let links = h.cache.session(CacheKey::Status);
    assert!(links.is_authenticated());
    assert_eq!(user_badge(&links).map(|(name, _)| name), Some("alice".to_owned()));
    assert_eq!(
        user_badge(&h.cache.session(CacheKey::Principal)),
        Some((alice.username, alice.profile_picture_url))
    );
}

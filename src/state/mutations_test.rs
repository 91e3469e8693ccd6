use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::net::gateway::{FILES_PATH, LOGIN_PATH, LOGOUT_PATH, PRINCIPAL_PATH, STATUS_PATH, USERS_PATH};
use crate::state::session::{CacheKey, VerdictStatus};
use crate::test_support::{Harness, principal, principal_json};

fn credentials() -> Credentials {
    Credentials { username: "alice".to_owned(), password: "hunter22".to_owned() }
}

/// A harness whose cache has both keys subscribed and resolved.
fn signed_in_as(username: &str) -> (Harness, Vec<crate::state::auth::Subscription>) {
    let mut h = Harness::new();
    let subs = vec![
        h.cache.subscribe(CacheKey::Status, |_| {}),
        h.cache.subscribe(CacheKey::Principal, |_| {}),
    ];
    h.settle();
    h.transport.take(STATUS_PATH).unwrap().respond(200, "true");
    h.transport.take(PRINCIPAL_PATH).unwrap().respond(200, &principal_json(&principal(1, username)));
    h.settle();
    (h, subs)
}

fn signed_out() -> (Harness, Vec<crate::state::auth::Subscription>) {
    let mut h = Harness::new();
    let subs = vec![
        h.cache.subscribe(CacheKey::Status, |_| {}),
        h.cache.subscribe(CacheKey::Principal, |_| {}),
    ];
    h.settle();
    h.transport.take(STATUS_PATH).unwrap().respond(200, "false");
    h.transport.take(PRINCIPAL_PATH).unwrap().respond(401, "");
    h.settle();
    (h, subs)
}

// =============================================================
// Messages
// =============================================================

#[test]
fn user_facing_messages() {
    assert_eq!(MutationError::InvalidCredentials.to_string(), "Invalid username or password.");
    assert_eq!(
        MutationError::Unexpected(GatewayError::Server { status: 500 }).to_string(),
        "An unexpected error has occurred."
    );
}

#[test]
fn rejections_map_to_mutation_errors() {
    assert_eq!(MutationError::from(Rejection::InvalidCredentials), MutationError::InvalidCredentials);
    assert_eq!(MutationError::from(Rejection::Unauthenticated), MutationError::Unauthenticated);
    let errors = MutationError::from(Rejection::Validation(ValidationErrors::default()));
    assert!(errors.field_errors().is_some());
    assert!(MutationError::Unauthenticated.field_errors().is_none());
}

// =============================================================
// login
// =============================================================

#[test]
fn login_publishes_principal_to_subscribers() {
    let (mut h, _subs) = signed_out();
    let seen = Rc::new(RefCell::new(None));
    let sink = seen.clone();
    let _nav = h.cache.subscribe(CacheKey::Status, move |cache| {
        *sink.borrow_mut() = Some(cache.session(CacheKey::Status));
    });

    let alice = principal(1, "alice");
    h.transport.reply(LOGIN_PATH, 200, &principal_json(&alice));
    let mutations = SessionMutations::new(h.cache.clone());
    let result = h.run(async { mutations.login(&credentials()).await });
    assert_eq!(result, Ok(alice.clone()));

    let state = seen.borrow().clone().unwrap();
    assert!(state.is_authenticated());
    assert_eq!(state.principal(), Some(&alice));
}

#[test]
fn rejected_login_leaves_cache_untouched() {
    let (mut h, _subs) = signed_out();
    let before = h.cache.session(CacheKey::Principal);
    h.transport.reply(LOGIN_PATH, 401, "");

    let mutations = SessionMutations::new(h.cache.clone());
    let result = h.run(async { mutations.login(&credentials()).await });
    assert_eq!(result, Err(MutationError::InvalidCredentials));
    h.settle();

    assert_eq!(h.cache.session(CacheKey::Principal), before);
    assert_eq!(h.transport.requests_to(STATUS_PATH), 1);
    assert_eq!(h.transport.requests_to(PRINCIPAL_PATH), 1);
}

#[test]
fn login_server_error_is_unexpected() {
    let (mut h, _subs) = signed_out();
    h.transport.reply(LOGIN_PATH, 500, "");
    let mutations = SessionMutations::new(h.cache.clone());
    let result = h.run(async { mutations.login(&credentials()).await });
    assert_eq!(result, Err(MutationError::Unexpected(GatewayError::Server { status: 500 })));
    assert_eq!(h.cache.verdict().status(), VerdictStatus::Unauthenticated);
}

// =============================================================
// logout
// =============================================================

#[test]
fn logout_resets_and_refetches_session() {
    let (mut h, _subs) = signed_in_as("alice");
    h.transport.reply(LOGOUT_PATH, 200, "");

    let mutations = SessionMutations::new(h.cache.clone());
    assert_eq!(h.run(async { mutations.logout().await }), Ok(()));
    assert!(!h.cache.verdict().is_authenticated());
    assert!(h.cache.verdict().principal().is_none());

    h.settle();
    h.transport.take(STATUS_PATH).unwrap().respond(200, "false");
    h.transport.take(PRINCIPAL_PATH).unwrap().respond(401, "");
    h.settle();
    assert_eq!(h.cache.verdict().status(), VerdictStatus::Unauthenticated);
}

#[test]
fn failed_logout_keeps_session() {
    let (mut h, _subs) = signed_in_as("alice");
    h.transport.reply(LOGOUT_PATH, 503, "");

    let mutations = SessionMutations::new(h.cache.clone());
    assert!(h.run(async { mutations.logout().await }).is_err());
    assert!(h.cache.verdict().is_authenticated());
}

// =============================================================
// update_profile / sign_up
// =============================================================

#[test]
fn profile_update_refetches_new_identity() {
    let (mut h, _subs) = signed_in_as("alice");
    let renamed = Principal {
        profile_picture_url: "https://cdn.example.com/new.png".to_owned(),
        ..principal(1, "alicia")
    };
    h.transport.reply(USERS_PATH, 200, &principal_json(&renamed));

    let changes = ProfileChanges {
        username: Some("alicia".to_owned()),
        profile_picture_url: Some("https://cdn.example.com/new.png".to_owned()),
        ..ProfileChanges::default()
    };
    let mutations = SessionMutations::new(h.cache.clone());
    assert_eq!(h.run(async { mutations.update_profile(&changes).await }), Ok(renamed.clone()));

    // The old identity stays visible until the refetch lands.
    assert_eq!(h.cache.verdict().principal().map(|p| p.username.as_str()), Some("alice"));

    h.settle();
    h.transport.take(STATUS_PATH).unwrap().respond(200, "true");
    h.transport.take(PRINCIPAL_PATH).unwrap().respond(200, &principal_json(&renamed));
    h.settle();
    let verdict = h.cache.verdict();
    assert_eq!(verdict.principal().map(|p| p.username.as_str()), Some("alicia"));
    assert_eq!(
        verdict.principal().map(|p| p.profile_picture_url.as_str()),
        Some("https://cdn.example.com/new.png")
    );
}

#[test]
fn profile_validation_errors_are_keyed_by_field() {
    let (mut h, _subs) = signed_in_as("alice");
    h.transport.reply(USERS_PATH, 400, r#"{"email":[{"code":"email","message":"not an email"}]}"#);

    let changes = ProfileChanges { email: Some("nope".to_owned()), ..ProfileChanges::default() };
    let mutations = SessionMutations::new(h.cache.clone());
    let error = h.run(async { mutations.update_profile(&changes).await }).unwrap_err();
    let first = error.field_errors().and_then(|e| e.first("email")).unwrap();
    assert_eq!(first.message.as_deref(), Some("not an email"));
    assert!(!h.cache.read_principal().is_stale);
}

#[test]
fn new_picture_is_uploaded_then_set_on_profile() {
    let (mut h, _subs) = signed_in_as("alice");
    h.transport.reply(
        FILES_PATH,
        200,
        r#"{"id":42,"userId":1,"fileCreatedAt":"2024-03-01T12:00:00Z","mimeType":"image/png","name":"picture.png"}"#,
    );
    let updated = Principal {
        profile_picture_url: "https://api.example.com/files/42?raw=true".to_owned(),
        ..principal(1, "alice")
    };
    h.transport.reply(USERS_PATH, 200, &principal_json(&updated));

    let file = NewFile::picture("image/png", vec![137, 80, 78, 71]);
    let mutations = SessionMutations::new(h.cache.clone());
    let result = h.run(async { mutations.change_profile_picture(&file, "https://api.example.com").await });
    assert_eq!(result, Ok(updated));

    let patch = h.transport.last_request_to(USERS_PATH).unwrap();
    assert_eq!(
        patch.body,
        Some(serde_json::json!({ "profilePictureUrl": "https://api.example.com/files/42?raw=true" }))
    );
    assert!(h.cache.read_principal().is_stale);
}

#[test]
fn rejected_upload_skips_profile_write() {
    let (mut h, _subs) = signed_in_as("alice");
    h.transport.reply(FILES_PATH, 400, r#"{"data":[{"code":"length","params":{"max":1048576}}]}"#);

    let file = NewFile::picture("image/png", vec![0; 4]);
    let mutations = SessionMutations::new(h.cache.clone());
    let error = h.run(async { mutations.change_profile_picture(&file, "").await }).unwrap_err();
    assert!(error.field_errors().is_some_and(|e| e.first("data").is_some()));
    assert_eq!(h.transport.requests_to(USERS_PATH), 0);
    assert!(!h.cache.read_principal().is_stale);
}

#[test]
fn sign_up_does_not_touch_session() {
    let (mut h, _subs) = signed_out();
    h.transport.reply(USERS_PATH, 200, &principal_json(&principal(9, "dave")));

    let account = NewAccount {
        username: "dave".to_owned(),
        email: "dave@example.com".to_owned(),
        password: "correct horse".to_owned(),
    };
    let mutations = SessionMutations::new(h.cache.clone());
    assert_eq!(h.run(async { mutations.sign_up(&account).await }).map(|p| p.id), Ok(9));
    h.settle();
    assert_eq!(h.cache.verdict().status(), VerdictStatus::Unauthenticated);
    assert_eq!(h.transport.requests_to(STATUS_PATH), 1);
}

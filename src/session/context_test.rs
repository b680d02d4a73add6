use serde_json::json;

use super::*;
use crate::net::transport::Method;
use crate::session::NoticeLevel;
use crate::test_support::{MockTransport, RecordingNavigator, RecordingNotifier, client_config};
use crate::token::{MemoryTokenStore, StoredToken, TokenStore};

struct Fixture {
    session: Arc<SessionContext>,
    store: Arc<MemoryTokenStore>,
    navigator: Arc<RecordingNavigator>,
    notifier: Arc<RecordingNotifier>,
    transport: Arc<MockTransport>,
}

fn fixture(token: Option<&str>) -> Fixture {
    let store = Arc::new(token.map_or_else(MemoryTokenStore::new, MemoryTokenStore::with_token));
    let navigator = RecordingNavigator::new();
    let notifier = RecordingNotifier::new();
    let transport = MockTransport::new();
    let lifecycle = SessionLifecycle::new(store.clone(), navigator.clone());
    let session = Arc::new(SessionContext::new(&client_config(), lifecycle, notifier.clone(), transport.clone()));
    Fixture { session, store, navigator, notifier, transport }
}

fn ana() -> User {
    User { id: "1".into(), name: "Ana".into(), email: "ana@x.com".into() }
}

async fn wait_for_request(transport: &MockTransport, path: &str) {
    for _ in 0..1000 {
        if transport.request_count(path) > 0 {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("request to {path} was never sent");
}

fn assert_consistent(session: &SessionContext) {
    assert_eq!(session.is_authenticated(), session.user().is_some());
    assert_eq!(session.phase() == SessionPhase::Authenticated, session.user().is_some());
}

// =============================================================================
// MOUNT
// =============================================================================

#[test]
fn new_context_is_anonymous() {
    let fx = fixture(Some("T0"));
    assert_eq!(fx.session.phase(), SessionPhase::Anonymous);
    assert!(!fx.session.is_authenticated());
    assert_eq!(fx.session.user(), None);
}

#[tokio::test]
async fn mount_without_token_issues_no_request() {
    let fx = fixture(None);
    fx.session.mount().await;
    assert!(fx.transport.requests().is_empty());
    assert_eq!(fx.session.phase(), SessionPhase::Anonymous);
    assert!(fx.navigator.visits().is_empty());
}

#[tokio::test]
async fn mount_with_valid_token_restores_user() {
    let fx = fixture(Some("T0"));
    fx.transport.respond(Method::Get, "/userinfo", 200, json!({"id": "1", "name": "Ana", "email": "ana@x.com"}));

    fx.session.mount().await;

    assert_eq!(fx.session.phase(), SessionPhase::Authenticated);
    assert_eq!(fx.session.user(), Some(ana()));
    assert_eq!(fx.transport.requests()[0].authorization.as_deref(), Some("Bearer T0"));
    assert!(fx.navigator.visits().is_empty());
    assert_consistent(&fx.session);
}

#[tokio::test]
async fn mount_unauthorized_signs_out_once() {
    let fx = fixture(Some("T0"));
    fx.transport.respond(Method::Get, "/userinfo", 401, json!({}));

    fx.session.mount().await;

    assert_eq!(fx.store.read(), None);
    assert_eq!(fx.navigator.visits(), vec!["/"]);
    assert_eq!(fx.session.phase(), SessionPhase::Anonymous);
    assert_eq!(fx.session.api().authorization(), None);
}

#[tokio::test]
async fn mount_transport_failure_signs_out() {
    let fx = fixture(Some("T0"));
    fx.transport.fail(Method::Get, "/userinfo", "connection refused");

    fx.session.mount().await;

    assert_eq!(fx.store.read(), None);
    assert_eq!(fx.navigator.visits(), vec!["/"]);
    assert_eq!(fx.session.phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn mount_is_authenticating_while_check_is_pending() {
    let fx = fixture(Some("T0"));
    let gate = fx
        .transport
        .respond_gated(Method::Get, "/userinfo", 200, json!({"id": "1", "name": "Ana", "email": "ana@x.com"}));

    let session = fx.session.clone();
    let mount = tokio::spawn(async move { session.mount().await });
    wait_for_request(&fx.transport, "/userinfo").await;

    assert_eq!(fx.session.phase(), SessionPhase::Authenticating);
    assert!(!fx.session.is_authenticated());

    gate.notify_one();
    mount.await.unwrap();
    assert_eq!(fx.session.phase(), SessionPhase::Authenticated);
}

#[tokio::test]
async fn stale_mount_rejection_does_not_drop_newer_sign_in() {
    let fx = fixture(Some("T0"));
    let gate = fx.transport.respond_gated(Method::Get, "/userinfo", 401, json!({}));
    fx.transport
        .respond(Method::Post, "/session", 200, json!({"id": "7", "name": "Bob", "token": "T1"}));

    let session = fx.session.clone();
    let mount = tokio::spawn(async move { session.mount().await });
    wait_for_request(&fx.transport, "/userinfo").await;

    let user = fx.session.sign_in("a@a.com", "x").await;
    assert!(user.is_some());

    gate.notify_one();
    mount.await.unwrap();

    assert_eq!(fx.store.read().as_deref(), Some("T1"));
    assert_eq!(fx.session.user().map(|u| u.name), Some("Bob".to_owned()));
    assert_eq!(fx.navigator.visits(), vec!["/dashboard"]);
    assert_consistent(&fx.session);
}

#[tokio::test]
async fn stale_mount_success_does_not_revive_signed_out_session() {
    let fx = fixture(Some("T0"));
    let gate = fx
        .transport
        .respond_gated(Method::Get, "/userinfo", 200, json!({"id": "1", "name": "Ana", "email": "ana@x.com"}));

    let session = fx.session.clone();
    let mount = tokio::spawn(async move { session.mount().await });
    wait_for_request(&fx.transport, "/userinfo").await;

    fx.session.sign_out();
    gate.notify_one();
    mount.await.unwrap();

    assert_eq!(fx.session.phase(), SessionPhase::Anonymous);
    assert_eq!(fx.store.read(), None);
}

// =============================================================================
// SIGN IN
// =============================================================================

#[tokio::test]
async fn sign_in_persists_token_and_authenticates() {
    let fx = fixture(None);
    fx.transport
        .respond(Method::Post, "/session", 200, json!({"id": "7", "name": "Bob", "token": "T1"}));

    let user = fx.session.sign_in("a@a.com", "x").await;

    let expected = User { id: "7".into(), name: "Bob".into(), email: "a@a.com".into() };
    assert_eq!(user, Some(expected.clone()));
    assert_eq!(fx.session.user(), Some(expected));
    assert_eq!(fx.session.phase(), SessionPhase::Authenticated);
    assert_eq!(
        fx.store.stored(),
        Some(StoredToken { value: "T1".into(), options: CookieOptions { max_age_secs: 2_592_000, path: "/" } })
    );
    assert_eq!(fx.session.api().authorization().as_deref(), Some("Bearer T1"));
    assert_eq!(fx.navigator.visits(), vec!["/dashboard"]);
    assert_eq!(fx.notifier.notices(), vec![Notice::success(MSG_SIGN_IN_OK)]);
    assert_eq!(fx.transport.requests()[0].body, Some(json!({"email": "a@a.com", "password": "x"})));
}

#[tokio::test]
async fn sign_in_rejected_stays_anonymous_and_notifies() {
    let fx = fixture(None);
    fx.transport.respond(Method::Post, "/session", 400, json!({"error": "wrong password"}));

    let user = fx.session.sign_in("a@a.com", "bad").await;

    assert_eq!(user, None);
    assert_eq!(fx.session.phase(), SessionPhase::Anonymous);
    assert_eq!(fx.store.read(), None);
    assert_eq!(fx.notifier.notices(), vec![Notice::error(MSG_SIGN_IN_FAILED)]);
    assert!(fx.navigator.visits().is_empty());
}

#[tokio::test]
async fn sign_in_with_blank_field_skips_network() {
    let fx = fixture(None);

    assert_eq!(fx.session.sign_in("", "x").await, None);
    assert_eq!(fx.session.sign_in("a@a.com", "  ").await, None);

    assert!(fx.transport.requests().is_empty());
    let notices = fx.notifier.notices();
    assert_eq!(notices.len(), 2);
    assert!(notices.iter().all(|n| n.level == NoticeLevel::Warning));
}

// =============================================================================
// SIGN UP
// =============================================================================

#[tokio::test]
async fn sign_up_navigates_to_sign_in_without_authenticating() {
    let fx = fixture(None);
    fx.transport.respond(Method::Post, "/users", 201, json!({"id": "9"}));

    assert!(fx.session.sign_up("Carla", "c@c.com", "pw").await);

    assert!(!fx.session.is_authenticated());
    assert_eq!(fx.store.read(), None);
    assert_eq!(fx.navigator.visits(), vec!["/"]);
    assert_eq!(fx.notifier.notices(), vec![Notice::success(MSG_SIGN_UP_OK)]);
    assert_eq!(
        fx.transport.requests()[0].body,
        Some(json!({"name": "Carla", "email": "c@c.com", "password": "pw"}))
    );
}

#[tokio::test]
async fn sign_up_rejected_notifies_and_stays_put() {
    let fx = fixture(None);
    fx.transport.respond(Method::Post, "/users", 409, json!({"error": "exists"}));

    assert!(!fx.session.sign_up("Carla", "c@c.com", "pw").await);

    assert_eq!(fx.notifier.notices(), vec![Notice::error(MSG_SIGN_UP_FAILED)]);
    assert!(fx.navigator.visits().is_empty());
}

#[tokio::test]
async fn sign_up_with_blank_field_skips_network() {
    let fx = fixture(None);
    assert!(!fx.session.sign_up("Carla", "", "pw").await);
    assert!(fx.transport.requests().is_empty());
    assert_eq!(fx.notifier.notices(), vec![Notice::warning(MSG_MISSING_FIELDS)]);
}

// =============================================================================
// SIGN OUT
// =============================================================================

#[tokio::test]
async fn sign_out_is_idempotent() {
    let fx = fixture(None);
    fx.transport
        .respond(Method::Post, "/session", 200, json!({"id": "7", "name": "Bob", "token": "T1"}));
    fx.session.sign_in("a@a.com", "x").await;

    fx.session.sign_out();
    fx.session.sign_out();

    assert_eq!(fx.store.read(), None);
    assert_eq!(fx.session.phase(), SessionPhase::Anonymous);
    assert_eq!(fx.session.api().authorization(), None);
    assert_eq!(fx.navigator.visits(), vec!["/dashboard", "/", "/"]);
}

#[tokio::test]
async fn rejected_request_after_sign_in_drops_user() {
    let fx = fixture(None);
    fx.transport
        .respond(Method::Post, "/session", 200, json!({"id": "7", "name": "Bob", "token": "T1"}));
    fx.transport.respond(Method::Get, "/category", 401, json!({}));
    fx.session.sign_in("a@a.com", "x").await;

    let err = fx.session.api().get::<serde_json::Value>("/category").await.unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert_eq!(fx.store.read(), None);
    assert_eq!(fx.navigator.visits(), vec!["/dashboard", "/"]);
    assert!(!fx.session.is_authenticated());
    assert_consistent(&fx.session);
}

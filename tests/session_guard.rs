//! Session guard behaviour against a scripted identity provider.

use liff_editor::session::{
    InMemoryHost, InMemoryProvider, ProviderCall, SessionContext, UserIdResolution,
};
use liff_editor::{ErrorKind, HostPage, IdentityProvider};
use std::sync::Arc;

const APP_ID: &str = "app-1";
const PAGE_URL: &str = "https://liff.example.com/";

struct Fixture {
    session: SessionContext,
    provider: Arc<InMemoryProvider>,
    host: Arc<InMemoryHost>,
}

fn fixture(provider: InMemoryProvider) -> Fixture {
    let provider = Arc::new(provider);
    let host = Arc::new(InMemoryHost::new(PAGE_URL));
    let session = SessionContext::new(
        Some(provider.clone() as Arc<dyn IdentityProvider>),
        host.clone() as Arc<dyn HostPage>,
        APP_ID,
    );
    Fixture {
        session,
        provider,
        host,
    }
}

fn init_call() -> ProviderCall {
    ProviderCall::Init(APP_ID.into())
}

#[tokio::test]
async fn valid_session_passes() {
    let f = fixture(InMemoryProvider::logged_in("tok", "U1"));
    assert!(f.session.ensure_session().await);
    assert_eq!(f.session.current_token().as_deref(), Some("tok"));
    assert_eq!(f.provider.login_count(), 0);
}

#[tokio::test]
async fn init_runs_once_under_concurrency() {
    let f = fixture(InMemoryProvider::logged_in("tok", "U1"));
    let (a, b, c) = futures::join!(
        f.session.ensure_session(),
        f.session.ensure_session(),
        f.session.ensure_initialized()
    );
    assert!(a && b);
    c.unwrap();
    assert!(f.session.is_initialized());
    assert_eq!(f.provider.count(&init_call()), 1);
}

#[tokio::test]
async fn failed_init_declines_without_login() {
    let f = fixture(InMemoryProvider::logged_in("tok", "U1").failing_init());
    assert!(!f.session.ensure_session().await);
    assert!(!f.session.is_initialized());
    assert_eq!(f.provider.login_count(), 0);

    // Not marked initialized, so the next check tries again.
    assert!(!f.session.ensure_session().await);
    assert_eq!(f.provider.count(&init_call()), 2);
}

#[tokio::test]
async fn logged_out_outside_client_logs_in_without_redirect() {
    let f = fixture(InMemoryProvider::logged_out());
    assert!(!f.session.ensure_session().await);
    assert_eq!(f.provider.calls(), vec![init_call(), ProviderCall::Login(None)]);
}

#[tokio::test]
async fn logged_out_inside_client_redirects_back() {
    let f = fixture(InMemoryProvider::logged_out().in_client(true));
    assert!(!f.session.ensure_session().await);
    assert_eq!(
        f.provider.calls(),
        vec![init_call(), ProviderCall::Login(Some(PAGE_URL.into()))]
    );
}

#[tokio::test]
async fn missing_token_declines_without_login() {
    let f = fixture(InMemoryProvider::logged_in("tok", "U1").without_token());
    assert!(!f.session.ensure_session().await);
    assert_eq!(f.provider.login_count(), 0);
    assert_eq!(f.session.current_token(), None);
}

#[tokio::test]
async fn token_read_failure_is_contained() {
    let f = fixture(InMemoryProvider::logged_in("tok", "U1").failing_token());
    assert!(!f.session.ensure_session().await);
    assert_eq!(f.session.current_token(), None);
}

#[tokio::test]
async fn missing_provider_declines() {
    let host = Arc::new(InMemoryHost::new(PAGE_URL));
    let session = SessionContext::new(None, host.clone() as Arc<dyn HostPage>, APP_ID);
    assert!(!session.ensure_session().await);
    assert_eq!(session.current_token(), None);

    session.refresh_session().await;
    assert_eq!(host.reloads(), 1);

    session.close_window().await;
    assert_eq!(host.closes(), 1);
}

#[tokio::test]
async fn refresh_logs_out_then_in() {
    let f = fixture(InMemoryProvider::logged_in("tok", "U1"));
    f.session.refresh_session().await;
    assert_eq!(
        f.provider.calls(),
        vec![ProviderCall::Logout, ProviderCall::Login(None)]
    );
    assert_eq!(f.host.reloads(), 0);
}

#[tokio::test]
async fn refresh_when_logged_out_only_logs_in() {
    let f = fixture(InMemoryProvider::logged_out());
    f.session.refresh_session().await;
    assert_eq!(f.provider.calls(), vec![ProviderCall::Login(None)]);
}

#[tokio::test]
async fn cached_user_id_is_required_for_edits() {
    let f = fixture(InMemoryProvider::logged_in("tok", "U1"));
    let err = f
        .session
        .resolve_user_id(UserIdResolution::Cached)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UserUnresolved);
    assert!(!err.is_session_error());
    assert!(err.user_message().contains("login"));
    assert_eq!(f.provider.count(&ProviderCall::Profile), 0);

    f.session.set_current_user_id(Some("U7".into()));
    assert_eq!(
        f.session
            .resolve_user_id(UserIdResolution::Cached)
            .await
            .unwrap(),
        "U7"
    );
}

#[tokio::test]
async fn profile_lookup_caches_the_user_id() {
    let f = fixture(InMemoryProvider::logged_in("tok", "U3"));
    let id = f
        .session
        .resolve_user_id(UserIdResolution::ProfileLookup)
        .await
        .unwrap();
    assert_eq!(id, "U3");
    f.session
        .resolve_user_id(UserIdResolution::ProfileLookup)
        .await
        .unwrap();
    assert_eq!(f.provider.count(&ProviderCall::Profile), 1);
}

#[tokio::test]
async fn profile_lookup_failure_leaves_user_unresolved() {
    let f = fixture(InMemoryProvider::logged_in("tok", "U3").without_profile());
    let err = f
        .session
        .resolve_user_id(UserIdResolution::ProfileLookup)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UserUnresolved);
    assert!(!err.is_session_error());
}

#[tokio::test]
async fn empty_user_id_is_not_cached() {
    let f = fixture(InMemoryProvider::logged_in("tok", "U1"));
    f.session.set_current_user_id(Some(String::new()));
    assert_eq!(f.session.current_user_id(), None);
}

#[tokio::test]
async fn close_window_goes_through_provider() {
    let f = fixture(InMemoryProvider::logged_in("tok", "U1"));
    f.session.close_window().await;
    assert_eq!(f.provider.calls(), vec![ProviderCall::CloseWindow]);
    assert_eq!(f.host.closes(), 0);
}

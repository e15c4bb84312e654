use std::sync::Arc;
use std::time::Duration as StdDuration;
use reqwest::StatusCode;
use time::{Duration, OffsetDateTime};
use tokio::time::sleep;

use crate::auth_api::AuthApiError;
use crate::data::{Role, TokenPair};
use crate::session::{AccessTokenSource, SessionError};
use crate::session::internal::{SessionManagerImpl, SessionPhase};
use crate::session::internal::tests::mocks::{
    driver_identity,
    grant,
    MemoryTokenStore,
    ScriptedAuthApi,
    TestSessionIo,
};


type TestManager = SessionManagerImpl<
    Arc<ScriptedAuthApi>,
    MemoryTokenStore,
    TestSessionIo,
>;

fn t0() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("valid epoch")
}

fn manager_at(
    base: OffsetDateTime,
    api: &Arc<ScriptedAuthApi>,
    store: &MemoryTokenStore,
) -> TestManager {
    SessionManagerImpl::new_with(
        api.clone(),
        store.clone(),
        TestSessionIo::at(base),
    )
}

async fn signed_in_manager(
    api: &Arc<ScriptedAuthApi>,
    store: &MemoryTokenStore,
    ttl: Duration,
) -> TestManager {
    let manager = manager_at(t0(), api, store);
    manager.restore().await;
    api.push_login(Ok(grant("a1", ttl)));
    api.push_identity(Ok(driver_identity()));
    manager.sign_in("driver@example.org", "hunter2").await.unwrap();
    manager
}

#[tokio::test(start_paused = true)]
async fn loading_until_restoration_resolves() {
    let api = ScriptedAuthApi::new();
    let store = MemoryTokenStore::empty();
    let manager = manager_at(t0(), &api, &store);
    assert!(manager.is_loading());
    assert_eq!(manager.phase(), SessionPhase::Restoring);

    manager.restore().await;
    assert!(!manager.is_loading());
    assert_eq!(manager.phase(), SessionPhase::Unauthenticated);
    assert!(api.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn sign_in_derives_expiry_from_the_server_ttl() {
    let api = ScriptedAuthApi::new();
    let store = MemoryTokenStore::empty();
    let manager =
        signed_in_manager(&api, &store, Duration::milliseconds(900_000))
            .await;

    let stored = store.contents().expect("tokens persisted");
    assert_eq!(stored.expires_at, t0() + Duration::minutes(15));
    assert_eq!(stored.access_token, "access-a1");
    assert_eq!(
        manager.access_token().as_deref(),
        Some("access-a1"),
    );
    assert_eq!(manager.phase(), SessionPhase::Authenticated);
    assert_eq!(manager.role(), Some(Role::Driver));
}

#[tokio::test(start_paused = true)]
async fn renewal_fires_at_the_margin_before_expiry() {
    let api = ScriptedAuthApi::new();
    let store = MemoryTokenStore::empty();
    let manager =
        signed_in_manager(&api, &store, Duration::minutes(30)).await;
    api.push_refresh(Ok(grant("r1", Duration::minutes(30))));

    // the timer is due 5 minutes before the 30 minute expiry
    sleep(StdDuration::from_secs(25 * 60 - 1)).await;
    assert_eq!(api.count("refresh"), 0);

    sleep(StdDuration::from_secs(2)).await;
    assert_eq!(api.count("refresh"), 1);

    // the renewed pair carries a fresh derived expiry
    let stored = store.contents().expect("tokens persisted");
    assert_eq!(stored.access_token, "access-r1");
    assert_eq!(
        stored.expires_at,
        t0() + Duration::minutes(25) + Duration::minutes(30),
    );
    assert_eq!(manager.phase(), SessionPhase::Authenticated);
}

#[tokio::test(start_paused = true)]
async fn rescheduling_keeps_only_the_newest_timer() {
    let api = ScriptedAuthApi::new();
    let store = MemoryTokenStore::empty();
    let manager =
        signed_in_manager(&api, &store, Duration::minutes(10)).await;

    // second sign-in replaces the pending 5 minute timer with a 25 minute one
    api.push_login(Ok(grant("a2", Duration::minutes(30))));
    api.push_identity(Ok(driver_identity()));
    manager.sign_in("driver@example.org", "hunter2").await.unwrap();
    api.push_refresh(Ok(grant("r1", Duration::minutes(30))));

    sleep(StdDuration::from_secs(6 * 60)).await;
    assert_eq!(api.count("refresh"), 0);

    sleep(StdDuration::from_secs(20 * 60)).await;
    assert_eq!(api.count("refresh"), 1);
}

#[tokio::test(start_paused = true)]
async fn sign_out_when_unauthenticated_is_a_no_op() {
    let api = ScriptedAuthApi::new();
    let store = MemoryTokenStore::empty();
    let manager = manager_at(t0(), &api, &store);
    manager.restore().await;

    manager.sign_out().await;
    manager.sign_out().await;

    assert_eq!(api.count("logout"), 0);
    assert_eq!(manager.phase(), SessionPhase::Unauthenticated);
    assert_eq!(manager.identity(), None);
    assert!(!manager.is_loading());
}

#[tokio::test(start_paused = true)]
async fn fatal_refresh_clears_the_whole_session() {
    let api = ScriptedAuthApi::new();
    let store = MemoryTokenStore::empty();
    let manager =
        signed_in_manager(&api, &store, Duration::minutes(10)).await;
    let mut phases = manager.subscribe();
    api.push_refresh(Err(AuthApiError::Status {
        status: StatusCode::UNAUTHORIZED,
    }));

    sleep(StdDuration::from_secs(6 * 60)).await;

    assert_eq!(api.count("refresh"), 1);
    assert_eq!(manager.access_token(), None);
    assert_eq!(manager.identity(), None);
    assert_eq!(store.contents(), None);
    assert_eq!(manager.phase(), SessionPhase::Unauthenticated);
    // observers see the forced return to the sign-in surface
    assert_eq!(
        *phases.borrow_and_update(),
        SessionPhase::Unauthenticated,
    );
}

#[tokio::test(start_paused = true)]
async fn restore_with_no_stored_session_asks_nothing_of_the_backend() {
    let api = ScriptedAuthApi::new();
    let store = MemoryTokenStore::empty();
    let manager = manager_at(t0(), &api, &store);
    manager.restore().await;

    assert!(api.calls().is_empty());
    assert_eq!(manager.phase(), SessionPhase::Unauthenticated);
    assert!(!manager.is_loading());
}

#[tokio::test(start_paused = true)]
async fn restore_shortly_after_sign_in_needs_no_refresh() {
    let api = ScriptedAuthApi::new();
    let store = MemoryTokenStore::empty();
    let manager =
        signed_in_manager(&api, &store, Duration::minutes(15)).await;
    drop(manager);

    // same persisted state, one minute later
    let restarted_api = ScriptedAuthApi::new();
    restarted_api.push_identity(Ok(driver_identity()));
    let manager = manager_at(
        t0() + Duration::minutes(1),
        &restarted_api,
        &store,
    );
    manager.restore().await;

    assert_eq!(manager.phase(), SessionPhase::Authenticated);
    assert_eq!(restarted_api.count("refresh"), 0);
    assert_eq!(restarted_api.count("identity"), 1);
    assert_eq!(manager.role(), Some(Role::Driver));
    assert!(!manager.is_loading());
}

#[tokio::test(start_paused = true)]
async fn expired_on_load_refreshes_once_before_the_identity_fetch() {
    let api = ScriptedAuthApi::new();
    let store = MemoryTokenStore::seeded(TokenPair {
        access_token: "access-stale".to_string(),
        refresh_token: "refresh-stale".to_string(),
        expires_at: t0() - Duration::minutes(1),
    });
    api.push_refresh(Ok(grant("r1", Duration::minutes(15))));
    api.push_identity(Ok(driver_identity()));
    let manager = manager_at(t0(), &api, &store);
    manager.restore().await;

    assert_eq!(api.calls(), ["refresh", "identity"]);
    assert_eq!(manager.phase(), SessionPhase::Authenticated);
    let stored = store.contents().expect("tokens persisted");
    assert_eq!(stored.access_token, "access-r1");
    assert_eq!(stored.expires_at, t0() + Duration::minutes(15));
}

#[tokio::test(start_paused = true)]
async fn restore_inside_the_margin_renews_right_after_the_identity_fetch() {
    let api = ScriptedAuthApi::new();
    let store = MemoryTokenStore::seeded(TokenPair {
        access_token: "access-old".to_string(),
        refresh_token: "refresh-old".to_string(),
        expires_at: t0() + Duration::minutes(3),
    });
    api.push_identity(Ok(driver_identity()));
    api.push_refresh(Ok(grant("r1", Duration::minutes(15))));
    let manager = manager_at(t0(), &api, &store);
    manager.restore().await;

    // still valid, so the user comes first; the margin has already passed,
    // so the renewal runs at once and keeps the identity it just fetched
    assert_eq!(api.calls(), ["identity", "refresh"]);
    assert_eq!(manager.phase(), SessionPhase::Authenticated);
}

#[tokio::test(start_paused = true)]
async fn failed_sign_in_mutates_nothing() {
    let api = ScriptedAuthApi::new();
    let store = MemoryTokenStore::empty();
    let manager = manager_at(t0(), &api, &store);
    manager.restore().await;
    api.push_login(Err(AuthApiError::InvalidCredentials));

    let result = manager.sign_in("driver@example.org", "wrong").await;

    assert!(matches!(result, Err(SessionError::InvalidCredentials)));
    assert_eq!(manager.access_token(), None);
    assert_eq!(store.contents(), None);
    assert_eq!(manager.phase(), SessionPhase::Unauthenticated);
}

#[tokio::test(start_paused = true)]
async fn identity_failure_after_login_tears_the_session_down() {
    let api = ScriptedAuthApi::new();
    let store = MemoryTokenStore::empty();
    let manager = manager_at(t0(), &api, &store);
    manager.restore().await;
    api.push_login(Ok(grant("a1", Duration::minutes(15))));
    api.push_identity(Err(AuthApiError::Status {
        status: StatusCode::INTERNAL_SERVER_ERROR,
    }));

    let result = manager.sign_in("driver@example.org", "hunter2").await;

    assert!(matches!(result, Err(SessionError::IdentityFetch(_))));
    assert_eq!(manager.access_token(), None);
    assert_eq!(manager.identity(), None);
    assert_eq!(store.contents(), None);
    assert_eq!(manager.phase(), SessionPhase::Unauthenticated);
}

#[tokio::test(start_paused = true)]
async fn timer_renewal_keeps_the_existing_identity() {
    let api = ScriptedAuthApi::new();
    let store = MemoryTokenStore::empty();
    let manager =
        signed_in_manager(&api, &store, Duration::minutes(10)).await;
    api.push_refresh(Ok(grant("r1", Duration::minutes(10))));

    sleep(StdDuration::from_secs(6 * 60)).await;

    assert_eq!(api.count("refresh"), 1);
    // the live identity is kept; only restoration refetches it
    assert_eq!(api.count("identity"), 1);
    assert!(manager.identity().is_some());
    assert_eq!(manager.access_token().as_deref(), Some("access-r1"));
}

#[tokio::test(start_paused = true)]
async fn sign_out_clears_locally_even_when_the_backend_is_down() {
    let api = ScriptedAuthApi::new();
    let store = MemoryTokenStore::empty();
    let manager =
        signed_in_manager(&api, &store, Duration::minutes(15)).await;
    api.push_logout(Err(AuthApiError::Status {
        status: StatusCode::SERVICE_UNAVAILABLE,
    }));

    manager.sign_out().await;

    assert_eq!(api.count("logout"), 1);
    assert_eq!(manager.access_token(), None);
    assert_eq!(manager.identity(), None);
    assert_eq!(store.contents(), None);
    assert_eq!(manager.phase(), SessionPhase::Unauthenticated);
}

#[tokio::test(start_paused = true)]
async fn sign_out_revokes_the_refresh_token_best_effort() {
    let api = ScriptedAuthApi::new();
    let store = MemoryTokenStore::empty();
    let manager =
        signed_in_manager(&api, &store, Duration::minutes(15)).await;
    api.push_logout(Ok(()));

    manager.sign_out().await;

    assert_eq!(api.count("logout"), 1);
    assert_eq!(store.contents(), None);
    assert_eq!(manager.phase(), SessionPhase::Unauthenticated);

    // no timer survives the sign-out
    sleep(StdDuration::from_secs(60 * 60)).await;
    assert_eq!(api.count("refresh"), 0);
}

//! Coordinator, guard, and persistence scenarios against the fake provider.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use kifayati_integration_tests::{FakeProvider, identity};
use kifayati_session::store::{CredentialStore, MemoryCredentialStore, WAS_AUTHENTICATED_KEY};
use kifayati_session::{GuardDecision, NavigationGuard, SessionCoordinator};

async fn recv_timeout(
    subscription: &mut kifayati_session::Subscription,
) -> kifayati_session::SessionSnapshot {
    tokio::time::timeout(Duration::from_secs(1), subscription.recv())
        .await
        .expect("subscription delivered nothing within 1s")
        .expect("subscription closed")
}

#[tokio::test]
async fn test_cold_start_resolves_to_signed_in() {
    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator = SessionCoordinator::start(Arc::clone(&provider), Arc::clone(&store));

    let mut subscription = coordinator.subscribe();

    // Before the provider reports, the snapshot is unresolved.
    let first = recv_timeout(&mut subscription).await;
    assert!(!first.resolved);
    assert!(!first.is_authenticated());

    provider.emit(Some(identity("sub-1")));

    let second = recv_timeout(&mut subscription).await;
    assert!(second.resolved);
    assert_eq!(
        second.identity.as_ref().unwrap().subject_id.as_str(),
        "sub-1"
    );

    // The "was logged in" hint is persisted for the next launch.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(coordinator.was_previously_authenticated().await);
}

#[tokio::test]
async fn test_guard_waits_then_allows() {
    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator = SessionCoordinator::start(Arc::clone(&provider), store);
    let guard = NavigationGuard::new("/login");

    assert_eq!(guard.evaluate(&coordinator.snapshot()), GuardDecision::Wait);

    let mut subscription = coordinator.subscribe();
    recv_timeout(&mut subscription).await;
    provider.emit(Some(identity("sub-1")));
    recv_timeout(&mut subscription).await;

    assert_eq!(guard.evaluate(&coordinator.snapshot()), GuardDecision::Allow);
}

#[tokio::test]
async fn test_logout_redirects_via_snapshot_once() {
    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator = SessionCoordinator::start(Arc::clone(&provider), Arc::clone(&store));
    let guard = NavigationGuard::new("/login");

    let mut subscription = coordinator.subscribe();
    recv_timeout(&mut subscription).await;
    provider.emit(Some(identity("sub-1")));
    recv_timeout(&mut subscription).await;
    assert_eq!(guard.evaluate(&coordinator.snapshot()), GuardDecision::Allow);

    coordinator.logout().await.unwrap();

    let after = coordinator.snapshot();
    assert!(after.resolved);
    assert!(!after.is_authenticated());

    // The redirect is a consequence of the snapshot, and fires exactly once.
    assert_eq!(
        guard.evaluate(&after),
        GuardDecision::Redirect("/login".to_owned())
    );
    assert_eq!(guard.evaluate(&after), GuardDecision::Hold);

    assert!(!coordinator.was_previously_authenticated().await);
}

#[tokio::test]
async fn test_failed_logout_keeps_session() {
    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator = SessionCoordinator::start(Arc::clone(&provider), store);

    let mut subscription = coordinator.subscribe();
    recv_timeout(&mut subscription).await;
    provider.emit(Some(identity("sub-1")));
    recv_timeout(&mut subscription).await;

    provider.fail_sign_outs(true);
    assert!(coordinator.logout().await.is_err());

    // Snapshot unchanged on provider rejection.
    assert!(coordinator.snapshot().is_authenticated());
}

#[tokio::test]
async fn test_updates_arrive_in_emission_order() {
    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator = SessionCoordinator::start(Arc::clone(&provider), store);

    let mut subscription = coordinator.subscribe();
    assert!(!recv_timeout(&mut subscription).await.resolved);

    provider.emit(Some(identity("sub-1")));
    provider.emit(None);
    provider.emit(Some(identity("sub-2")));

    let subjects: Vec<Option<String>> = [
        recv_timeout(&mut subscription).await,
        recv_timeout(&mut subscription).await,
        recv_timeout(&mut subscription).await,
    ]
    .into_iter()
    .map(|s| s.identity.map(|i| i.subject_id.as_str().to_owned()))
    .collect();

    assert_eq!(
        subjects,
        vec![Some("sub-1".to_owned()), None, Some("sub-2".to_owned())]
    );
}

#[tokio::test]
async fn test_duplicate_emissions_are_deduplicated() {
    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator = SessionCoordinator::start(Arc::clone(&provider), store);

    let mut subscription = coordinator.subscribe();
    recv_timeout(&mut subscription).await;

    provider.emit(Some(identity("sub-1")));
    let signed_in = recv_timeout(&mut subscription).await;
    assert!(signed_in.is_authenticated());

    // Re-emitting the unchanged identity must not notify anyone: the next
    // delivered snapshot is the later, distinct one.
    provider.emit(Some(identity("sub-1")));
    provider.emit(Some(identity("sub-2")));
    let next = recv_timeout(&mut subscription).await;
    assert_eq!(next.identity.unwrap().subject_id.as_str(), "sub-2");
}

#[tokio::test]
async fn test_logout_echo_is_a_no_op() {
    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator = SessionCoordinator::start(Arc::clone(&provider), store);

    let mut subscription = coordinator.subscribe();
    recv_timeout(&mut subscription).await;
    provider.emit(Some(identity("sub-1")));
    recv_timeout(&mut subscription).await;

    // logout() publishes the signed-out snapshot synchronously; the
    // provider's own signed-out event arrives through the pump afterwards
    // and must collapse into that single transition.
    coordinator.logout().await.unwrap();
    let signed_out = recv_timeout(&mut subscription).await;
    assert!(signed_out.resolved);
    assert!(!signed_out.is_authenticated());

    provider.emit(Some(identity("sub-2")));
    let next = recv_timeout(&mut subscription).await;
    assert_eq!(next.identity.unwrap().subject_id.as_str(), "sub-2");
}

#[tokio::test]
async fn test_late_subscriber_sees_current_value() {
    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator = SessionCoordinator::start(Arc::clone(&provider), store);

    let mut early = coordinator.subscribe();
    recv_timeout(&mut early).await;
    provider.emit(Some(identity("sub-1")));
    recv_timeout(&mut early).await;

    // A subscriber arriving after the sign-in starts from the signed-in
    // snapshot; it never sees the unresolved state.
    let mut late = coordinator.subscribe();
    let snapshot = recv_timeout(&mut late).await;
    assert!(snapshot.is_authenticated());
}

#[tokio::test]
async fn test_stream_error_resolves_to_signed_out() {
    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator = SessionCoordinator::start(Arc::clone(&provider), store);

    let mut subscription = coordinator.subscribe();
    recv_timeout(&mut subscription).await;

    provider.emit_stream_error("stream disconnected");

    let snapshot = recv_timeout(&mut subscription).await;
    assert!(snapshot.resolved);
    assert!(!snapshot.is_authenticated());
}

#[tokio::test]
async fn test_hint_survives_coordinator_restart() {
    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());

    {
        let coordinator = SessionCoordinator::start(Arc::clone(&provider), Arc::clone(&store));
        let mut subscription = coordinator.subscribe();
        recv_timeout(&mut subscription).await;
        provider.emit(Some(identity("sub-1")));
        recv_timeout(&mut subscription).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        coordinator.shutdown();
    }

    // Next launch: the hint is available before the provider resolves, but
    // only as a hint; the fresh snapshot still starts unresolved.
    assert_eq!(
        store.get(WAS_AUTHENTICATED_KEY).await.unwrap().as_deref(),
        Some("1")
    );

    let provider2 = Arc::new(FakeProvider::new());
    let coordinator2 = SessionCoordinator::start(provider2, Arc::clone(&store));
    assert!(coordinator2.was_previously_authenticated().await);
    assert!(!coordinator2.snapshot().resolved);
}

#[tokio::test]
async fn test_password_sign_in_flows_through_events() {
    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator = SessionCoordinator::start(Arc::clone(&provider), store);

    let mut subscription = coordinator.subscribe();
    recv_timeout(&mut subscription).await;

    let identity = coordinator
        .sign_in("ayesha@example.com", "password-1")
        .await
        .unwrap();

    let snapshot = recv_timeout(&mut subscription).await;
    assert_eq!(snapshot.identity.unwrap().subject_id, identity.subject_id);
}

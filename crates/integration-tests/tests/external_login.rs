//! Redirect-based federated login handshakes.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use kifayati_integration_tests::FakeProvider;
use kifayati_session::store::MemoryCredentialStore;
use kifayati_session::{
    CallbackPayload, ExternalLoginFlow, FlowError, FlowOutcome, SessionCoordinator,
};

const TIMEOUT: Duration = Duration::from_secs(300);

fn success(token: &str) -> CallbackPayload {
    CallbackPayload::Success {
        token_primary: Some(token.to_owned()),
        token_secondary: None,
    }
}

async fn recv_timeout(
    subscription: &mut kifayati_session::Subscription,
) -> kifayati_session::SessionSnapshot {
    tokio::time::timeout(Duration::from_secs(1), subscription.recv())
        .await
        .expect("subscription delivered nothing within 1s")
        .expect("subscription closed")
}

#[tokio::test]
async fn test_successful_handshake_signs_in() {
    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator = SessionCoordinator::start(Arc::clone(&provider), store);
    let flow = ExternalLoginFlow::new(Arc::clone(&provider), TIMEOUT);

    let mut subscription = coordinator.subscribe();
    recv_timeout(&mut subscription).await;

    let request = flow.begin("/cart").unwrap();
    let outcome = flow
        .complete(request.request_id, success("tok-1"))
        .await
        .unwrap();

    match outcome {
        FlowOutcome::SignedIn {
            identity,
            redirect_target,
        } => {
            assert_eq!(identity.subject_id.as_str(), "ext-tok-1");
            assert_eq!(redirect_target, "/cart");
        }
        FlowOutcome::Dismissed => panic!("expected sign-in"),
    }

    // The coordinator observes the sign-in through the provider channel.
    let snapshot = recv_timeout(&mut subscription).await;
    assert_eq!(snapshot.identity.unwrap().subject_id.as_str(), "ext-tok-1");

    // The slot is free again.
    assert!(flow.pending().is_none());
    assert!(flow.begin("/again").is_ok());
}

#[tokio::test]
async fn test_secondary_token_alone_suffices() {
    let provider = Arc::new(FakeProvider::new());
    let flow = ExternalLoginFlow::new(provider, TIMEOUT);

    let request = flow.begin("/").unwrap();
    let outcome = flow
        .complete(
            request.request_id,
            CallbackPayload::Success {
                token_primary: None,
                token_secondary: Some("tok-2".to_owned()),
            },
        )
        .await
        .unwrap();

    assert!(matches!(outcome, FlowOutcome::SignedIn { identity, .. }
        if identity.subject_id.as_str() == "ext-tok-2"));
}

#[tokio::test]
async fn test_callback_without_tokens_is_fatal_to_attempt() {
    let provider = Arc::new(FakeProvider::new());
    let flow = ExternalLoginFlow::new(provider, TIMEOUT);

    let request = flow.begin("/").unwrap();
    let err = flow
        .complete(
            request.request_id,
            CallbackPayload::Success {
                token_primary: None,
                token_secondary: None,
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::MissingToken));
    // Recoverable: the flow is idle again.
    assert!(flow.begin("/retry").is_ok());
}

#[tokio::test]
async fn test_dismissal_is_silent() {
    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator = SessionCoordinator::start(Arc::clone(&provider), store);
    let flow = ExternalLoginFlow::new(Arc::clone(&provider), TIMEOUT);

    let mut subscription = coordinator.subscribe();
    recv_timeout(&mut subscription).await;

    let request = flow.begin("/").unwrap();
    let outcome = flow
        .complete(request.request_id, CallbackPayload::Dismissed)
        .await
        .unwrap();
    assert!(matches!(outcome, FlowOutcome::Dismissed));

    // Session untouched, flow reusable.
    assert!(!coordinator.snapshot().is_authenticated());
    assert!(flow.begin("/").is_ok());
}

#[tokio::test]
async fn test_error_callback_leaves_session_unchanged() {
    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator = SessionCoordinator::start(Arc::clone(&provider), store);
    let flow = ExternalLoginFlow::new(Arc::clone(&provider), TIMEOUT);

    let request = flow.begin("/").unwrap();
    let err = flow
        .complete(
            request.request_id,
            CallbackPayload::Error {
                code: "access_denied".to_owned(),
                message: "user denied".to_owned(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, FlowError::Provider { code, .. } if code == "access_denied"));
    assert!(!coordinator.snapshot().is_authenticated());
}

#[tokio::test]
async fn test_rejected_exchange_is_recoverable() {
    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator = SessionCoordinator::start(Arc::clone(&provider), store);
    let flow = ExternalLoginFlow::new(Arc::clone(&provider), TIMEOUT);

    provider.fail_exchanges(true);
    let request = flow.begin("/").unwrap();
    let err = flow
        .complete(request.request_id, success("bad-token"))
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::Exchange(_)));
    assert!(!coordinator.snapshot().is_authenticated());

    // The same flow can immediately try again and succeed.
    provider.fail_exchanges(false);
    let request = flow.begin("/").unwrap();
    assert!(flow
        .complete(request.request_id, success("good-token"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_superseded_request_callback_is_stale() {
    let provider = Arc::new(FakeProvider::new());
    let flow = ExternalLoginFlow::new(provider, TIMEOUT);

    let first = flow.begin("/").unwrap();
    let second = flow.begin("/").unwrap();
    assert_ne!(first.request_id, second.request_id);

    // The first handshake's callback arrives after being superseded.
    let err = flow
        .complete(first.request_id, success("tok-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::StaleCallback));

    // The live request still completes.
    assert!(flow
        .complete(second.request_id, success("tok-2"))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_unknown_callback_is_stale() {
    let provider = Arc::new(FakeProvider::new());
    let flow = ExternalLoginFlow::new(provider, TIMEOUT);

    let err = flow
        .complete(Uuid::new_v4(), success("tok"))
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::StaleCallback));
}

#[tokio::test]
async fn test_duplicate_callback_is_stale() {
    let provider = Arc::new(FakeProvider::new());
    let flow = ExternalLoginFlow::new(provider, TIMEOUT);

    let request = flow.begin("/").unwrap();
    flow.complete(request.request_id, success("tok")).await.unwrap();

    let err = flow
        .complete(request.request_id, success("tok"))
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::StaleCallback));
}

#[tokio::test]
async fn test_expired_request_times_out() {
    let provider = Arc::new(FakeProvider::new());
    let flow = ExternalLoginFlow::new(provider, Duration::ZERO);

    let request = flow.begin("/").unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;

    let err = flow
        .complete(request.request_id, success("tok"))
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::TimedOut));

    // Expiry is flow-local and recoverable.
    assert!(flow.begin("/").is_ok());
}

#[tokio::test]
async fn test_dismiss_clears_only_matching_request() {
    let provider = Arc::new(FakeProvider::new());
    let flow = ExternalLoginFlow::new(provider, TIMEOUT);

    let request = flow.begin("/").unwrap();
    flow.dismiss(Uuid::new_v4());
    assert!(flow.pending().is_some());

    flow.dismiss(request.request_id);
    assert!(flow.pending().is_none());
}

#[tokio::test]
async fn test_guard_redirects_after_external_login_then_logout() {
    use kifayati_session::{GuardDecision, NavigationGuard};

    let provider = Arc::new(FakeProvider::new());
    let store = Arc::new(MemoryCredentialStore::new());
    let coordinator = SessionCoordinator::start(Arc::clone(&provider), store);
    let flow = ExternalLoginFlow::new(Arc::clone(&provider), TIMEOUT);
    let guard = NavigationGuard::new("/login");

    let mut subscription = coordinator.subscribe();
    recv_timeout(&mut subscription).await;

    let request = flow.begin("/account").unwrap();
    flow.complete(request.request_id, success("tok")).await.unwrap();
    recv_timeout(&mut subscription).await;
    assert_eq!(guard.evaluate(&coordinator.snapshot()), GuardDecision::Allow);

    coordinator.logout().await.unwrap();
    assert!(matches!(
        guard.evaluate(&coordinator.snapshot()),
        GuardDecision::Redirect(_)
    ));
    // Second initiation after logout starts a fresh handshake.
    assert!(flow.begin("/account").is_ok());
}

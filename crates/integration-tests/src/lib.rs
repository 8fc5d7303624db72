//! Integration test support for Kifayati.
//!
//! # Test Categories
//!
//! - `session_core` - coordinator, guard, and persistence scenarios
//! - `external_login` - redirect-based federated login handshakes
//! - `backend_api` - backend routes over the in-memory document store
//!
//! The session tests run against [`FakeProvider`], an in-process
//! [`IdentityProvider`] whose event stream and failure modes the tests
//! control directly. The backend tests drive the real router with
//! `tower::ServiceExt::oneshot`, no network involved.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use chrono::Utc;
use http_body_util::BodyExt;
use secrecy::SecretString;
use tokio::sync::mpsc;
use tower::ServiceExt;

use kifayati_backend::config::BackendConfig;
use kifayati_backend::db::{MemoryStore, Store};
use kifayati_backend::models::User;
use kifayati_backend::models::user::{ROLE_ADMIN, ROLE_CUSTOMER};
use kifayati_backend::services::auth::AuthService;
use kifayati_backend::state::AppState;
use kifayati_core::Email;
use kifayati_session::{Identity, IdentityProvider, ProviderError, ProviderEvent};

/// Scriptable in-process identity provider.
///
/// Sign-ins always succeed (with a subject derived from the input) unless a
/// failure flag is set; every success is mirrored onto the event channel the
/// way a real adapter would.
pub struct FakeProvider {
    events_tx: mpsc::UnboundedSender<ProviderEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<ProviderEvent>>>,
    fail_exchange: AtomicBool,
    fail_sign_out: AtomicBool,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeProvider {
    /// Create a provider with an empty event stream. Unlike a real adapter
    /// it emits no initial event, so tests control when the session
    /// resolves.
    #[must_use]
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            events_tx,
            events_rx: Mutex::new(Some(events_rx)),
            fail_exchange: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
        }
    }

    /// Push a provider-side identity change.
    pub fn emit(&self, identity: Option<Identity>) {
        let _ = self.events_tx.send(ProviderEvent::Identity(identity));
    }

    /// Push a stream failure.
    pub fn emit_stream_error(&self, message: &str) {
        let _ = self
            .events_tx
            .send(ProviderEvent::StreamError(message.to_owned()));
    }

    /// Make subsequent token exchanges fail.
    pub fn fail_exchanges(&self, fail: bool) {
        self.fail_exchange.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent sign-outs fail.
    pub fn fail_sign_outs(&self, fail: bool) {
        self.fail_sign_out.store(fail, Ordering::SeqCst);
    }
}

impl IdentityProvider for FakeProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<Identity, ProviderError> {
        let identity = identity(&format!("pw-{email}"));
        self.emit(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up_with_password(
        &self,
        email: &str,
        _password: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, ProviderError> {
        let mut identity = identity(&format!("new-{email}"));
        identity.display_name = display_name.map(ToOwned::to_owned);
        self.emit(Some(identity.clone()));
        Ok(identity)
    }

    async fn send_password_reset(&self, _email: &str) -> Result<(), ProviderError> {
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(ProviderError::Provider {
                code: "UNAVAILABLE".to_owned(),
                message: "sign-out rejected".to_owned(),
            });
        }
        self.emit(None);
        Ok(())
    }

    async fn sign_in_with_external_token(
        &self,
        token_primary: Option<&str>,
        token_secondary: Option<&str>,
    ) -> Result<Identity, ProviderError> {
        if self.fail_exchange.load(Ordering::SeqCst) {
            return Err(ProviderError::CredentialRejected("token rejected".to_owned()));
        }
        let token = token_primary
            .or(token_secondary)
            .ok_or_else(|| ProviderError::CredentialRejected("no token".to_owned()))?;

        let identity = identity(&format!("ext-{token}"));
        self.emit(Some(identity.clone()));
        Ok(identity)
    }

    fn observe_identity(&self) -> mpsc::UnboundedReceiver<ProviderEvent> {
        let mut slot = self.events_rx.lock().unwrap_or_else(|e| e.into_inner());
        slot.take().unwrap_or_else(|| {
            let (_, receiver) = mpsc::unbounded_channel();
            receiver
        })
    }
}

/// An identity carrying only the given subject.
#[must_use]
pub fn identity(subject: &str) -> Identity {
    Identity::new(subject.into())
}

/// Backend configuration for in-process tests.
#[must_use]
pub fn test_backend_config() -> BackendConfig {
    BackendConfig {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
        port: 0,
        jwt_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6!"),
        token_ttl: Duration::from_secs(3600),
        document_store: None,
        sentry_dsn: None,
        sentry_environment: None,
    }
}

/// Backend state and router over a fresh in-memory store.
#[must_use]
pub fn test_app() -> (AppState, Router) {
    let state = AppState::with_store(test_backend_config(), Store::Memory(MemoryStore::new()));
    let router = kifayati_backend::app(state.clone());
    (state, router)
}

/// Insert a user directly into the store and return a bearer token for it.
pub async fn seed_user(state: &AppState, email: &str, role: u8) -> String {
    let now = Utc::now();
    let user = User {
        id: uuid::Uuid::new_v4().to_string().into(),
        name: "Seeded".to_owned(),
        email: Email::parse(email).expect("valid test email"),
        phone: String::new(),
        address: String::new(),
        role,
        password_hash: "seeded".to_owned(),
        answer_hash: "seeded".to_owned(),
        created_at: now,
        updated_at: now,
    };
    state.users().create(&user).await.expect("seed user");

    AuthService::new(state.store(), state.config())
        .issue_token(&user)
        .expect("issue token")
}

/// Insert an admin account and return its bearer token.
pub async fn seed_admin(state: &AppState) -> String {
    seed_user(state, "admin@kifayati.test", ROLE_ADMIN).await
}

/// Insert a customer account and return its bearer token.
pub async fn seed_customer(state: &AppState) -> String {
    seed_user(state, "customer@kifayati.test", ROLE_CUSTOMER).await
}

/// Send one request through the router.
pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.expect("infallible")
}

/// Build a JSON request, optionally with a bearer token.
#[must_use]
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// Build a bodyless request, optionally with a bearer token.
#[must_use]
pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("valid request")
}

/// Read a response body as JSON.
pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("JSON body")
}

//! REST identity provider adapter.
//!
//! Talks to an identity-toolkit style auth backend over HTTPS:
//!
//! - `accounts:signInWithPassword` - email/password sign-in
//! - `accounts:signUp` - account creation
//! - `accounts:sendOobCode` - password-reset mail
//! - `accounts:signInWithIdp` - federated credential exchange
//!
//! Every successful sign-in (and sign-out) is mirrored onto the identity
//! event channel so the session coordinator observes provider state changes
//! in emission order.

use std::sync::{Arc, Mutex, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;

use kifayati_core::Email;

use crate::config::SessionConfig;
use crate::error::ProviderError;
use crate::identity::Identity;
use crate::provider::{IdentityProvider, ProviderEvent};

/// Error payload shape returned by the auth backend.
#[derive(Debug, Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: ErrorDetail,
}

#[derive(Debug, Deserialize, Default)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}

/// Account payload returned by sign-in, sign-up, and IdP exchange.
///
/// The password and IdP endpoints disagree on the picture field name, so
/// both are accepted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: Option<String>,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    profile_picture: Option<String>,
}

impl AccountResponse {
    fn into_identity(self) -> Result<Identity, ProviderError> {
        let subject_id = self
            .local_id
            .ok_or_else(|| ProviderError::MalformedResponse("missing localId".to_owned()))?;

        // A provider-supplied email that fails structural validation is
        // dropped rather than failing the whole sign-in.
        let email = self.email.as_deref().and_then(|e| Email::parse(e).ok());

        Ok(Identity {
            subject_id: subject_id.into(),
            display_name: self.display_name.filter(|n| !n.is_empty()),
            email,
            picture_url: self.photo_url.or(self.profile_picture),
        })
    }
}

/// Reqwest-backed identity provider adapter.
///
/// Cheaply cloneable via `Arc`; all clones share one event channel.
#[derive(Clone)]
pub struct RestIdentityProvider {
    inner: Arc<ProviderInner>,
}

struct ProviderInner {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    external_provider_id: String,
    events_tx: mpsc::UnboundedSender<ProviderEvent>,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<ProviderEvent>>>,
}

impl RestIdentityProvider {
    /// Create a new adapter from session configuration.
    ///
    /// The identity event channel starts with a confirmed signed-out event,
    /// so observers resolve no later than adapter initialization.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        // First invocation of the identity stream: process starts signed out
        // until a provider session is established.
        let _ = events_tx.send(ProviderEvent::Identity(None));

        Self {
            inner: Arc::new(ProviderInner {
                http: reqwest::Client::new(),
                base_url: config
                    .provider_base_url
                    .as_str()
                    .trim_end_matches('/')
                    .to_owned(),
                api_key: config.provider_api_key.clone(),
                external_provider_id: config.external_provider_id.clone(),
                events_tx,
                events_rx: Mutex::new(Some(events_rx)),
            }),
        }
    }

    fn endpoint(&self, operation: &str) -> String {
        format!(
            "{}/accounts:{}?key={}",
            self.inner.base_url,
            operation,
            urlencoding::encode(self.inner.api_key.expose_secret())
        )
    }

    fn emit(&self, identity: Option<Identity>) {
        // Receiver gone means the coordinator has shut down; nothing to sync.
        let _ = self
            .inner
            .events_tx
            .send(ProviderEvent::Identity(identity));
    }

    async fn post(
        &self,
        operation: &str,
        body: serde_json::Value,
    ) -> Result<AccountResponse, ProviderError> {
        let response = self
            .inner
            .http
            .post(self.endpoint(operation))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: ErrorBody = response.json().await.unwrap_or_default();
            return Err(map_provider_error(status, &body.error.message));
        }

        Ok(response.json().await?)
    }
}

/// Map a provider error code to a typed error.
fn map_provider_error(status: reqwest::StatusCode, code: &str) -> ProviderError {
    match code {
        "EMAIL_NOT_FOUND" => ProviderError::UserNotFound,
        "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => ProviderError::InvalidCredentials,
        "EMAIL_EXISTS" => ProviderError::AccountExists,
        "INVALID_IDP_RESPONSE" | "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" => {
            ProviderError::CredentialRejected(code.to_owned())
        }
        "" => ProviderError::Provider {
            code: status.to_string(),
            message: "no error detail in provider response".to_owned(),
        },
        other => ProviderError::Provider {
            code: other.to_owned(),
            message: status.to_string(),
        },
    }
}

impl IdentityProvider for RestIdentityProvider {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, ProviderError> {
        let response = self
            .post(
                "signInWithPassword",
                json!({
                    "email": email,
                    "password": password,
                    "returnSecureToken": true,
                }),
            )
            .await?;

        let identity = response.into_identity()?;
        tracing::info!(subject = %identity.subject_id, "password sign-in succeeded");
        self.emit(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up_with_password(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, ProviderError> {
        let mut body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        if let (Some(name), Some(object)) = (display_name, body.as_object_mut()) {
            object.insert("displayName".to_owned(), json!(name));
        }

        let response = self.post("signUp", body).await?;

        let mut identity = response.into_identity()?;
        // The sign-up response may omit the display name it was given.
        if identity.display_name.is_none() {
            identity.display_name = display_name.map(ToOwned::to_owned);
        }

        tracing::info!(subject = %identity.subject_id, "account created");
        self.emit(Some(identity.clone()));
        Ok(identity)
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        let response = self
            .inner
            .http
            .post(self.endpoint("sendOobCode"))
            .json(&json!({
                "requestType": "PASSWORD_RESET",
                "email": email,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body: ErrorBody = response.json().await.unwrap_or_default();
            return Err(map_provider_error(status, &body.error.message));
        }

        Ok(())
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        // Provider sessions are token-based; terminating one is local to the
        // client. The signed-out event is what the coordinator keys off.
        self.emit(None);
        Ok(())
    }

    async fn sign_in_with_external_token(
        &self,
        token_primary: Option<&str>,
        token_secondary: Option<&str>,
    ) -> Result<Identity, ProviderError> {
        let mut post_body = Vec::new();
        if let Some(token) = token_primary {
            post_body.push(format!("id_token={}", urlencoding::encode(token)));
        }
        if let Some(token) = token_secondary {
            post_body.push(format!("access_token={}", urlencoding::encode(token)));
        }
        if post_body.is_empty() {
            return Err(ProviderError::CredentialRejected(
                "no token material supplied".to_owned(),
            ));
        }
        post_body.push(format!(
            "providerId={}",
            urlencoding::encode(&self.inner.external_provider_id)
        ));

        let response = self
            .post(
                "signInWithIdp",
                json!({
                    "postBody": post_body.join("&"),
                    "requestUri": "http://localhost",
                    "returnSecureToken": true,
                }),
            )
            .await?;

        let identity = response.into_identity()?;
        tracing::info!(subject = %identity.subject_id, "federated sign-in succeeded");
        self.emit(Some(identity.clone()));
        Ok(identity)
    }

    fn observe_identity(&self) -> mpsc::UnboundedReceiver<ProviderEvent> {
        let mut slot = self
            .inner
            .events_rx
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(receiver) = slot.take() {
            receiver
        } else {
            // The channel is single-consumer; hand a closed receiver to any
            // late claimant instead of splitting the stream.
            tracing::warn!("identity event channel already claimed");
            let (_, receiver) = mpsc::unbounded_channel();
            receiver
        }
    }
}

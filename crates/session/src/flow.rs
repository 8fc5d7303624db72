//! External-login flow handler.
//!
//! Reconciles the redirect-based federated login handshake with the session
//! coordinator. The app hands control to an external agent (system browser
//! or provider UI) and later receives a callback that may be a success, an
//! error, a dismissal, or may never arrive.
//!
//! One pending request at a time. State machine:
//!
//! ```text
//! Idle --begin--> Pending --callback--> Exchanging --done--> Idle
//!        ^          |  ^                                       |
//!        +-dismiss--+  +--begin (supersedes the old request)---+
//! ```
//!
//! The slot lock is never held across an await: the credential exchange runs
//! with the slot marked `Exchanging`, and any callback or initiation arriving
//! meanwhile is rejected without blocking.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use url::Url;
use uuid::Uuid;

use crate::error::FlowError;
use crate::identity::Identity;
use crate::provider::IdentityProvider;

/// An in-flight external-login request.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    /// Correlates the eventual callback with this request.
    pub request_id: Uuid,
    /// Route to land on after a successful login.
    pub redirect_target: String,
    /// When the handshake left the app.
    pub issued_at: Instant,
}

impl PendingRequest {
    fn new(redirect_target: String) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            redirect_target,
            issued_at: Instant::now(),
        }
    }

    fn expired(&self, timeout: Duration) -> bool {
        self.issued_at.elapsed() > timeout
    }
}

/// What the external agent reported back.
#[derive(Debug, Clone)]
pub enum CallbackPayload {
    /// The agent obtained token material. Either token alone suffices.
    Success {
        /// Identity token (JWT-shaped), if issued.
        token_primary: Option<String>,
        /// Access token, if issued.
        token_secondary: Option<String>,
    },
    /// The agent reported an error (e.g. `access_denied`).
    Error {
        /// Error code from the callback.
        code: String,
        /// Human-readable description, possibly empty.
        message: String,
    },
    /// The user closed the agent without finishing.
    Dismissed,
}

impl CallbackPayload {
    /// Parse a redirect callback URL into a request ID and payload.
    ///
    /// Parameters are read from the query, falling back to the fragment
    /// (implicit-grant agents return tokens there). Returns `None` when no
    /// `state` parameter correlates the callback to a request.
    #[must_use]
    pub fn parse_redirect(url: &Url) -> Option<(Uuid, Self)> {
        let query_pairs = |raw: &str| {
            url::form_urlencoded::parse(raw.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect::<Vec<_>>()
        };

        let mut pairs = query_pairs(url.query().unwrap_or_default());
        if !pairs.iter().any(|(k, _)| k == "state") {
            pairs = query_pairs(url.fragment().unwrap_or_default());
        }

        let find = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
        };

        let request_id = Uuid::parse_str(&find("state")?).ok()?;

        let payload = if let Some(code) = find("error") {
            Self::Error {
                code,
                message: find("error_description").unwrap_or_default(),
            }
        } else {
            Self::Success {
                token_primary: find("id_token"),
                token_secondary: find("access_token"),
            }
        };

        Some((request_id, payload))
    }
}

/// How a completed handshake resolved.
#[derive(Debug, Clone)]
pub enum FlowOutcome {
    /// Credential exchange succeeded; the coordinator snapshot will reflect
    /// the identity. Carries the route the pending request asked for.
    SignedIn {
        /// The newly signed-in identity.
        identity: Identity,
        /// Route to land on, from the originating [`PendingRequest`].
        redirect_target: String,
    },
    /// The user backed out; nothing changed.
    Dismissed,
}

enum FlowState {
    Idle,
    Pending(PendingRequest),
    Exchanging { request_id: Uuid },
}

/// Single-slot external-login flow handler.
pub struct ExternalLoginFlow<P> {
    provider: Arc<P>,
    state: Mutex<FlowState>,
    timeout: Duration,
}

impl<P: IdentityProvider> ExternalLoginFlow<P> {
    /// Create a flow handler with the given handshake timeout.
    #[must_use]
    pub fn new(provider: Arc<P>, timeout: Duration) -> Self {
        Self {
            provider,
            state: Mutex::new(FlowState::Idle),
            timeout,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FlowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin a handshake, returning the request the callback must match.
    ///
    /// A live pending request is superseded: its callback, if it ever
    /// arrives, will be stale.
    ///
    /// # Errors
    ///
    /// [`FlowError::ExchangeInProgress`] if a callback is currently being
    /// exchanged for a credential.
    pub fn begin(&self, redirect_target: impl Into<String>) -> Result<PendingRequest, FlowError> {
        let mut state = self.lock();
        match &*state {
            FlowState::Exchanging { .. } => return Err(FlowError::ExchangeInProgress),
            FlowState::Pending(old) => {
                if old.expired(self.timeout) {
                    tracing::debug!(request_id = %old.request_id, "pending login expired");
                } else {
                    tracing::warn!(request_id = %old.request_id, "pending login superseded");
                }
            }
            FlowState::Idle => {}
        }

        let request = PendingRequest::new(redirect_target.into());
        tracing::info!(request_id = %request.request_id, "external login initiated");
        *state = FlowState::Pending(request.clone());
        Ok(request)
    }

    /// The currently pending request, if any.
    #[must_use]
    pub fn pending(&self) -> Option<PendingRequest> {
        match &*self.lock() {
            FlowState::Pending(request) => Some(request.clone()),
            _ => None,
        }
    }

    /// Handle the external agent's callback.
    ///
    /// Only a callback matching the live pending request does anything;
    /// everything else is answered with [`FlowError::StaleCallback`] and no
    /// state changes. On any outcome other than a stale callback the flow
    /// returns to idle.
    ///
    /// # Errors
    ///
    /// All variants of [`FlowError`] are recoverable; none of them change
    /// the session snapshot.
    pub async fn complete(
        &self,
        request_id: Uuid,
        payload: CallbackPayload,
    ) -> Result<FlowOutcome, FlowError> {
        // Phase 1: claim the slot under the lock.
        let (token_primary, token_secondary, redirect_target) = {
            let mut state = self.lock();

            let request = match &*state {
                FlowState::Pending(request) if request.request_id == request_id => {
                    request.clone()
                }
                _ => return Err(FlowError::StaleCallback),
            };
            *state = FlowState::Idle;

            if request.expired(self.timeout) {
                tracing::warn!(%request_id, "callback arrived after timeout");
                return Err(FlowError::TimedOut);
            }

            match payload {
                CallbackPayload::Dismissed => {
                    tracing::info!(%request_id, "external login dismissed");
                    return Ok(FlowOutcome::Dismissed);
                }
                CallbackPayload::Error { code, message } => {
                    tracing::warn!(%request_id, %code, "external login failed");
                    return Err(FlowError::Provider { code, message });
                }
                CallbackPayload::Success {
                    token_primary: None,
                    token_secondary: None,
                } => return Err(FlowError::MissingToken),
                CallbackPayload::Success {
                    token_primary,
                    token_secondary,
                } => {
                    *state = FlowState::Exchanging { request_id };
                    (token_primary, token_secondary, request.redirect_target)
                }
            }
        };

        // Phase 2: exchange outside the lock.
        let exchanged = self
            .provider
            .sign_in_with_external_token(token_primary.as_deref(), token_secondary.as_deref())
            .await;

        // Phase 3: release the slot.
        *self.lock() = FlowState::Idle;

        match exchanged {
            Ok(identity) => {
                tracing::info!(%request_id, subject = %identity.subject_id, "external login completed");
                Ok(FlowOutcome::SignedIn {
                    identity,
                    redirect_target,
                })
            }
            Err(e) => Err(FlowError::Exchange(e)),
        }
    }

    /// Cancel the pending request with the given ID, if it is still live.
    /// Cancelling anything else is a silent no-op.
    pub fn dismiss(&self, request_id: Uuid) {
        let mut state = self.lock();
        if let FlowState::Pending(request) = &*state {
            if request.request_id == request_id {
                tracing::info!(%request_id, "external login cancelled");
                *state = FlowState::Idle;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_redirect_success_query() {
        let id = Uuid::new_v4();
        let url = Url::parse(&format!(
            "app://callback?state={id}&id_token=abc&access_token=def"
        ))
        .unwrap();

        let (parsed_id, payload) = CallbackPayload::parse_redirect(&url).unwrap();
        assert_eq!(parsed_id, id);
        match payload {
            CallbackPayload::Success {
                token_primary,
                token_secondary,
            } => {
                assert_eq!(token_primary.as_deref(), Some("abc"));
                assert_eq!(token_secondary.as_deref(), Some("def"));
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_parse_redirect_fragment_fallback() {
        let id = Uuid::new_v4();
        let url = Url::parse(&format!("app://callback#state={id}&id_token=abc")).unwrap();

        let (parsed_id, payload) = CallbackPayload::parse_redirect(&url).unwrap();
        assert_eq!(parsed_id, id);
        assert!(matches!(payload, CallbackPayload::Success { .. }));
    }

    #[test]
    fn test_parse_redirect_error() {
        let id = Uuid::new_v4();
        let url = Url::parse(&format!(
            "app://callback?state={id}&error=access_denied&error_description=user%20denied"
        ))
        .unwrap();

        let (_, payload) = CallbackPayload::parse_redirect(&url).unwrap();
        match payload {
            CallbackPayload::Error { code, message } => {
                assert_eq!(code, "access_denied");
                assert_eq!(message, "user denied");
            }
            other => panic!("unexpected payload: {other:?}"),
        }
    }

    #[test]
    fn test_parse_redirect_without_state() {
        let url = Url::parse("app://callback?id_token=abc").unwrap();
        assert!(CallbackPayload::parse_redirect(&url).is_none());
    }
}

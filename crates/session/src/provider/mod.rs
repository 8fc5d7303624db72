//! Identity provider adapter boundary.
//!
//! Wraps the third-party auth backend behind a trait the session coordinator
//! and external-login flow depend on. The adapter owns a single-consumer
//! event channel carrying every provider-side identity change; the
//! coordinator is the only consumer of that channel.

mod rest;

pub use rest::RestIdentityProvider;

use std::future::Future;

use tokio::sync::mpsc;

use crate::error::ProviderError;
use crate::identity::Identity;

/// An inbound message on the identity event channel.
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    /// The provider-side session changed: signed in as the identity, or
    /// signed out (`None`).
    Identity(Option<Identity>),
    /// The provider stream itself failed (network/config). The coordinator
    /// resolves this to a definite logged-out snapshot rather than hanging.
    StreamError(String),
}

/// Adapter over the third-party identity backend.
///
/// Implementations emit a [`ProviderEvent`] on the channel returned by
/// [`observe_identity`](Self::observe_identity) for every provider-side
/// session change, with the first event no later than adapter
/// initialization.
pub trait IdentityProvider: Send + Sync + 'static {
    /// Sign in with email and password.
    fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, ProviderError>> + Send;

    /// Create an account with email and password.
    fn sign_up_with_password(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> impl Future<Output = Result<Identity, ProviderError>> + Send;

    /// Ask the provider to send a password-reset message.
    fn send_password_reset(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Terminate the current provider session.
    fn sign_out(&self) -> impl Future<Output = Result<(), ProviderError>> + Send;

    /// Exchange external-agent token material for a provider credential and
    /// sign in with it. Either token alone suffices.
    fn sign_in_with_external_token(
        &self,
        token_primary: Option<&str>,
        token_secondary: Option<&str>,
    ) -> impl Future<Output = Result<Identity, ProviderError>> + Send;

    /// Claim the identity event channel.
    ///
    /// The channel is single-consumer; a second claim yields a closed
    /// receiver. The first event arrives no later than adapter
    /// initialization.
    fn observe_identity(&self) -> mpsc::UnboundedReceiver<ProviderEvent>;
}

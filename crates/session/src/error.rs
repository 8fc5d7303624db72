//! Session core error types.

use thiserror::Error;

/// Errors surfaced by the identity provider adapter.
///
/// None of these are fatal to the process; session state only changes on
/// explicit success.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Wrong email/password combination.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An account with this email already exists.
    #[error("account already exists")]
    AccountExists,

    /// No account exists for this email.
    #[error("user not found")]
    UserNotFound,

    /// The provider rejected an external credential (malformed or expired
    /// token material).
    #[error("credential rejected: {0}")]
    CredentialRejected(String),

    /// Any other provider-side error, carrying the provider's error code.
    #[error("provider error {code}: {message}")]
    Provider {
        /// Provider-assigned error code.
        code: String,
        /// Provider-supplied description.
        message: String,
    },

    /// Transport-level failure reaching the provider.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider responded with something we could not interpret.
    #[error("malformed provider response: {0}")]
    MalformedResponse(String),
}

/// Errors surfaced by the external-login flow handler.
///
/// All recoverable: every variant returns the flow to `Idle` and leaves the
/// session snapshot unchanged.
#[derive(Debug, Error)]
pub enum FlowError {
    /// A callback arrived for a request that is no longer pending (already
    /// resolved, superseded, or never issued). Ignored per the single-slot
    /// contract; the snapshot is not touched.
    #[error("no pending external login matches this callback")]
    StaleCallback,

    /// A new initiation arrived while a callback is being exchanged for a
    /// provider credential.
    #[error("an external login is already being finalized")]
    ExchangeInProgress,

    /// A success callback carried no token material at all.
    #[error("external login callback carried no token material")]
    MissingToken,

    /// The pending request outlived the configured handshake timeout.
    #[error("external login timed out")]
    TimedOut,

    /// The external agent reported an error (e.g. `access_denied`).
    #[error("external provider returned {code}: {message}")]
    Provider {
        /// Error code from the callback payload.
        code: String,
        /// Description from the callback payload.
        message: String,
    },

    /// The provider adapter rejected the token exchange.
    #[error("credential exchange failed: {0}")]
    Exchange(#[source] ProviderError),
}

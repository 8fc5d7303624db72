//! Kifayati session/identity synchronization core.
//!
//! Keeps client-side authentication state, navigation guarding, and
//! provider-issued credentials consistent across app restarts, provider
//! callbacks, and concurrent screens.
//!
//! # Architecture
//!
//! - [`provider::IdentityProvider`] - adapter boundary over the third-party
//!   identity backend (password sign-in/sign-up, password reset, sign-out,
//!   external-token exchange, and the identity event channel)
//! - [`SessionCoordinator`] - single source of truth for "who is logged in";
//!   sole consumer of the provider event channel and sole writer of the
//!   process-wide [`SessionSnapshot`]
//! - [`NavigationGuard`] - gates protected screens off the snapshot; redirects
//!   exactly once per transition into confirmed-unauthenticated
//! - [`ExternalLoginFlow`] - single-slot state machine reconciling the
//!   redirect-based federated login handshake with the coordinator
//! - [`store::CredentialStore`] - persists a lightweight "was logged in" hint
//!   across process restarts (never the identity itself)
//!
//! # Concurrency
//!
//! Cooperative async throughout. The snapshot has exactly one writer (the
//! coordinator); subscribers only read. External-login transitions are
//! serialized by the flow's single pending slot, whose lock is never held
//! across an await.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod flow;
pub mod guard;
pub mod identity;
pub mod provider;
pub mod store;

pub use config::SessionConfig;
pub use coordinator::{SessionCoordinator, Subscription};
pub use error::{FlowError, ProviderError};
pub use flow::{CallbackPayload, ExternalLoginFlow, FlowOutcome, PendingRequest};
pub use guard::{GuardDecision, NavigationGuard};
pub use identity::{Identity, SessionSnapshot};
pub use provider::{IdentityProvider, ProviderEvent, RestIdentityProvider};

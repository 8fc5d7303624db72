//! Identity and session snapshot types.

use serde::{Deserialize, Serialize};

use kifayati_core::{Email, SubjectId};

/// The authenticated user's provider-issued profile projection.
///
/// Created and refreshed by the identity provider adapter whenever the
/// underlying provider session changes. It has no independent persistence -
/// it is always re-derived from provider state, never authored locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Opaque, unique subject identifier issued by the provider.
    pub subject_id: SubjectId,
    /// Display name, if the provider has one.
    pub display_name: Option<String>,
    /// Email address, if the provider has one.
    pub email: Option<Email>,
    /// Profile picture URL, if the provider has one.
    pub picture_url: Option<String>,
}

impl Identity {
    /// Create an identity carrying only a subject ID.
    #[must_use]
    pub fn new(subject_id: SubjectId) -> Self {
        Self {
            subject_id,
            display_name: None,
            email: None,
            picture_url: None,
        }
    }
}

/// The single process-wide view of current authentication state.
///
/// `resolved == false` means provider state has not been determined since
/// process start; `resolved == true` with `identity == None` means confirmed
/// logged out. Exactly one snapshot exists process-wide at any instant and
/// all readers observe the same value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The current identity, if any.
    pub identity: Option<Identity>,
    /// Whether provider state has been determined since process start.
    pub resolved: bool,
}

impl SessionSnapshot {
    /// The initial state before the first provider callback.
    #[must_use]
    pub const fn unresolved() -> Self {
        Self {
            identity: None,
            resolved: false,
        }
    }

    /// Confirmed logged out.
    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            identity: None,
            resolved: true,
        }
    }

    /// Signed in as the given identity.
    #[must_use]
    pub const fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
            resolved: true,
        }
    }

    /// Whether a user is currently authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.resolved && self.identity.is_some()
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::unresolved()
    }
}

//! Navigation guard for authentication-protected screens.
//!
//! Pure function of the session snapshot plus one bit of memory: whether a
//! redirect was already issued for the current unauthenticated episode. A
//! guard never navigates by itself; it hands the caller a
//! [`GuardDecision`] to act on.

use std::sync::{Mutex, PoisonError};

use crate::identity::SessionSnapshot;

/// What the caller should do with the current navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session state is unresolved: render a loading state, navigate nowhere.
    Wait,
    /// Authenticated: render the protected content.
    Allow,
    /// Confirmed unauthenticated: navigate to the given route.
    Redirect(String),
    /// Confirmed unauthenticated, but a redirect for this episode was
    /// already issued: render nothing and stay put.
    Hold,
}

/// Gates protected content off the session snapshot.
///
/// Redirects exactly once per transition into confirmed-unauthenticated;
/// repeated evaluations of the same state (re-renders, sibling screens
/// sharing a guard) yield [`GuardDecision::Hold`] instead of stacking
/// navigations. Signing back in re-arms the guard.
#[derive(Debug)]
pub struct NavigationGuard {
    login_route: String,
    redirected: Mutex<bool>,
}

impl NavigationGuard {
    /// Create a guard that redirects to the given route.
    #[must_use]
    pub fn new(login_route: impl Into<String>) -> Self {
        Self {
            login_route: login_route.into(),
            redirected: Mutex::new(false),
        }
    }

    /// Evaluate the snapshot for one render of a protected screen.
    ///
    /// Never redirects while the snapshot is unresolved: a signed-in user
    /// must not be bounced to the login screen during startup.
    pub fn evaluate(&self, snapshot: &SessionSnapshot) -> GuardDecision {
        let mut redirected = self
            .redirected
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if !snapshot.resolved {
            return GuardDecision::Wait;
        }

        if snapshot.is_authenticated() {
            // Re-arm: the next unauthenticated episode redirects again.
            *redirected = false;
            return GuardDecision::Allow;
        }

        if *redirected {
            GuardDecision::Hold
        } else {
            *redirected = true;
            GuardDecision::Redirect(self.login_route.clone())
        }
    }

    /// The route unauthenticated users are sent to.
    #[must_use]
    pub fn login_route(&self) -> &str {
        &self.login_route
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;

    #[test]
    fn test_unresolved_waits() {
        let guard = NavigationGuard::new("/login");
        assert_eq!(
            guard.evaluate(&SessionSnapshot::unresolved()),
            GuardDecision::Wait
        );
        // Waiting consumes nothing: a later sign-out still redirects.
        assert_eq!(
            guard.evaluate(&SessionSnapshot::signed_out()),
            GuardDecision::Redirect("/login".to_owned())
        );
    }

    #[test]
    fn test_authenticated_allows() {
        let guard = NavigationGuard::new("/login");
        let snapshot = SessionSnapshot::signed_in(Identity::new("sub-1".into()));
        assert_eq!(guard.evaluate(&snapshot), GuardDecision::Allow);
    }

    #[test]
    fn test_redirects_once_per_episode() {
        let guard = NavigationGuard::new("/login");
        let out = SessionSnapshot::signed_out();

        assert_eq!(
            guard.evaluate(&out),
            GuardDecision::Redirect("/login".to_owned())
        );
        assert_eq!(guard.evaluate(&out), GuardDecision::Hold);
        assert_eq!(guard.evaluate(&out), GuardDecision::Hold);
    }

    #[test]
    fn test_sign_in_rearms_redirect() {
        let guard = NavigationGuard::new("/login");
        let out = SessionSnapshot::signed_out();
        let r#in = SessionSnapshot::signed_in(Identity::new("sub-1".into()));

        assert!(matches!(guard.evaluate(&out), GuardDecision::Redirect(_)));
        assert_eq!(guard.evaluate(&r#in), GuardDecision::Allow);
        // A second logout is a new episode.
        assert!(matches!(guard.evaluate(&out), GuardDecision::Redirect(_)));
    }
}

//! Session coordinator: the single source of truth for "who is logged in".
//!
//! The coordinator owns the process-wide [`SessionSnapshot`] and is its only
//! writer. It is the sole consumer of the provider's identity event channel;
//! everything else (navigation guards, screens, the external-login flow)
//! reads the snapshot or subscribes to its updates.
//!
//! Update ordering: snapshot writes and broadcast sends happen under one
//! lock, and subscriber registration takes the same lock, so a subscriber
//! never misses an update published after its initial snapshot and every
//! subscriber observes updates in publication order.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::error::ProviderError;
use crate::identity::{Identity, SessionSnapshot};
use crate::provider::{IdentityProvider, ProviderEvent};
use crate::store::{CredentialStore, WAS_AUTHENTICATED_KEY};

/// Broadcast depth per subscriber. A slow subscriber past this lags and is
/// caught up from the live stream rather than dropped.
const UPDATE_CHANNEL_CAPACITY: usize = 64;

struct Shared {
    snapshot: Mutex<SessionSnapshot>,
    updates: broadcast::Sender<SessionSnapshot>,
}

impl Shared {
    fn lock(&self) -> std::sync::MutexGuard<'_, SessionSnapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the snapshot and notify subscribers. No-op if unchanged, so
    /// provider echo events after an explicit logout do not double-notify.
    fn publish(&self, next: SessionSnapshot) {
        let mut current = self.lock();
        if *current == next {
            return;
        }
        *current = next.clone();
        // Send while still holding the lock: registration in subscribe()
        // takes the same lock, so no update can slip between a subscriber's
        // initial snapshot and its receiver.
        let _ = self.updates.send(next);
    }
}

/// Live subscription to session snapshot updates.
///
/// The first [`recv`](Self::recv) returns the snapshot current at
/// subscription time; later calls return each subsequent update in order.
pub struct Subscription {
    initial: Option<SessionSnapshot>,
    updates: broadcast::Receiver<SessionSnapshot>,
}

impl Subscription {
    /// Receive the next snapshot, or `None` once the coordinator is gone.
    pub async fn recv(&mut self) -> Option<SessionSnapshot> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        loop {
            match self.updates.recv().await {
                Ok(snapshot) => return Some(snapshot),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "session subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Coordinates provider identity events, the credential hint, and the
/// process-wide session snapshot.
///
/// Cheaply cloneable; all clones share one snapshot and one pump task.
pub struct SessionCoordinator<P, S> {
    provider: Arc<P>,
    store: Arc<S>,
    shared: Arc<Shared>,
    pump: Arc<PumpGuard>,
}

impl<P, S> Clone for SessionCoordinator<P, S> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            store: Arc::clone(&self.store),
            shared: Arc::clone(&self.shared),
            pump: Arc::clone(&self.pump),
        }
    }
}

struct PumpGuard(JoinHandle<()>);

impl Drop for PumpGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

impl<P, S> SessionCoordinator<P, S>
where
    P: IdentityProvider,
    S: CredentialStore,
{
    /// Start the coordinator.
    ///
    /// Claims the provider's identity event channel and spawns the pump task
    /// that folds provider events into the snapshot. The snapshot starts
    /// [`unresolved`](SessionSnapshot::unresolved) and resolves on the first
    /// provider event.
    #[must_use]
    pub fn start(provider: Arc<P>, store: Arc<S>) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        let shared = Arc::new(Shared {
            snapshot: Mutex::new(SessionSnapshot::unresolved()),
            updates,
        });

        let mut events = provider.observe_identity();
        let pump_shared = Arc::clone(&shared);
        let pump_store = Arc::clone(&store);
        let pump = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    ProviderEvent::Identity(identity) => {
                        sync_hint(pump_store.as_ref(), identity.is_some()).await;
                        pump_shared.publish(match identity {
                            Some(identity) => SessionSnapshot::signed_in(identity),
                            None => SessionSnapshot::signed_out(),
                        });
                    }
                    ProviderEvent::StreamError(message) => {
                        // Resolve to a definite logged-out state instead of
                        // leaving guards waiting on an unresolved snapshot.
                        tracing::error!(%message, "identity event stream failed");
                        pump_shared.publish(SessionSnapshot::signed_out());
                    }
                }
            }
            tracing::debug!("identity event channel closed");
        });

        Self {
            provider,
            store,
            shared,
            pump: Arc::new(PumpGuard(pump)),
        }
    }

    /// The current session snapshot.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.lock().clone()
    }

    /// Subscribe to snapshot updates.
    ///
    /// The subscription's first value is the snapshot at the moment of this
    /// call; no update published after that moment is missed.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        // Lock order matters: holding the snapshot lock while subscribing
        // excludes concurrent publishes, making initial + receiver atomic.
        let guard = self.shared.lock();
        let updates = self.shared.updates.subscribe();
        Subscription {
            initial: Some(guard.clone()),
            updates,
        }
    }

    /// Whether a previous process run ended while authenticated.
    ///
    /// Purely a hint for rendering optimistic UI while the snapshot is
    /// unresolved; it never authenticates anyone by itself.
    pub async fn was_previously_authenticated(&self) -> bool {
        match self.store.get(WAS_AUTHENTICATED_KEY).await {
            Ok(value) => value.as_deref() == Some("1"),
            Err(e) => {
                tracing::warn!(error = %e, "credential hint read failed");
                false
            }
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the provider's rejection; the snapshot is unchanged on error.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ProviderError> {
        self.provider.sign_in_with_password(email, password).await
    }

    /// Create an account with email and password.
    ///
    /// # Errors
    ///
    /// Returns the provider's rejection; the snapshot is unchanged on error.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<Identity, ProviderError> {
        self.provider
            .sign_up_with_password(email, password, display_name)
            .await
    }

    /// Ask the provider to send a password-reset message.
    ///
    /// # Errors
    ///
    /// Returns the provider's rejection.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), ProviderError> {
        self.provider.send_password_reset(email).await
    }

    /// Terminate the session.
    ///
    /// On success the snapshot is confirmed logged out and the credential
    /// hint is cleared before this returns; the provider's own signed-out
    /// event is then a no-op.
    ///
    /// # Errors
    ///
    /// If the provider rejects the sign-out the snapshot is unchanged.
    pub async fn logout(&self) -> Result<(), ProviderError> {
        self.provider.sign_out().await?;
        sync_hint(self.store.as_ref(), false).await;
        self.shared.publish(SessionSnapshot::signed_out());
        Ok(())
    }

    /// The underlying provider adapter.
    #[must_use]
    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Stop consuming provider events. The snapshot freezes at its current
    /// value; subscriptions end after draining buffered updates.
    pub fn shutdown(&self) {
        self.pump.0.abort();
    }
}

/// Keep the persisted "was logged in" hint in step with the snapshot.
/// Failures are logged, never fatal: the hint is best-effort.
async fn sync_hint<S: CredentialStore>(store: &S, authenticated: bool) {
    let result = if authenticated {
        store.set(WAS_AUTHENTICATED_KEY, "1").await
    } else {
        store.remove(WAS_AUTHENTICATED_KEY).await
    };
    if let Err(e) = result {
        tracing::warn!(error = %e, "credential hint write failed");
    }
}

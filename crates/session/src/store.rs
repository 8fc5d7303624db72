//! Credential store boundary.
//!
//! Persists an opaque "was logged in" hint across process restarts. The
//! identity itself is never stored - it is always re-derived from the
//! provider on start.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use thiserror::Error;

/// Key under which the session coordinator persists its hint.
pub const WAS_AUTHENTICATED_KEY: &str = "session.was_authenticated";

/// Errors from credential store access.
#[derive(Debug, Error)]
pub enum CredentialStoreError {
    /// Underlying file I/O failed.
    #[error("credential store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The on-disk store could not be (de)serialized.
    #[error("credential store format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Key-value persistence for lightweight session hints.
pub trait CredentialStore: Send + Sync + 'static {
    /// Read a value, `None` if absent.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, CredentialStoreError>> + Send;

    /// Write a value, replacing any previous one.
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), CredentialStoreError>> + Send;

    /// Remove a value if present.
    fn remove(&self, key: &str) -> impl Future<Output = Result<(), CredentialStoreError>> + Send;
}

/// File-backed credential store.
///
/// The whole store is a small JSON object rewritten on every mutation;
/// writers are serialized by an internal lock.
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl FileCredentialStore {
    /// Create a store backed by the given file. The file is created on the
    /// first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<HashMap<String, String>, CredentialStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, entries: &HashMap<String, String>) -> Result<(), CredentialStoreError> {
        let bytes = serde_json::to_vec(entries)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_owned(), value.to_owned());
        self.save(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), CredentialStoreError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_some() {
            self.save(&entries).await?;
        }
        Ok(())
    }
}

/// In-memory credential store for tests and ephemeral environments.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CredentialStoreError> {
        Ok(self.entries().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CredentialStoreError> {
        self.entries().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CredentialStoreError> {
        self.entries().remove(key);
        Ok(())
    }
}

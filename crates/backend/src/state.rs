//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::BackendConfig;
use crate::db::categories::CategoryRepository;
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::db::{RemoteStore, Store};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds configuration and the document store
/// handle.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: BackendConfig,
    store: Store,
}

impl AppState {
    /// Create application state, selecting the document store from
    /// configuration: the hosted service when configured, the in-memory
    /// store otherwise.
    #[must_use]
    pub fn new(config: BackendConfig) -> Self {
        let store = match &config.document_store {
            Some(docstore) => Store::Remote(RemoteStore::new(docstore)),
            None => {
                tracing::warn!("no document service configured, using in-memory store");
                Store::Memory(crate::db::MemoryStore::new())
            }
        };
        Self::with_store(config, store)
    }

    /// Create application state over an explicit store. Used by tests.
    #[must_use]
    pub fn with_store(config: BackendConfig, store: Store) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, store }),
        }
    }

    /// Get a reference to the backend configuration.
    #[must_use]
    pub fn config(&self) -> &BackendConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    /// User repository over the document store.
    #[must_use]
    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.inner.store)
    }

    /// Product repository over the document store.
    #[must_use]
    pub fn products(&self) -> ProductRepository<'_> {
        ProductRepository::new(&self.inner.store)
    }

    /// Category repository over the document store.
    #[must_use]
    pub fn categories(&self) -> CategoryRepository<'_> {
        CategoryRepository::new(&self.inner.store)
    }
}

//! Document store access layer.
//!
//! Data lives in a managed document service: named collections of JSON
//! documents keyed by ID. [`DocumentStore`] is the transport boundary;
//! [`MemoryStore`] backs tests and local development, [`RemoteStore`] talks
//! to the hosted service. Typed repositories (`users`, `products`,
//! `categories`) sit on top and map documents to domain models.

pub mod categories;
pub mod memory;
pub mod products;
pub mod remote;
pub mod users;

pub use memory::MemoryStore;
pub use remote::RemoteStore;

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

/// Errors from the document store transport.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure reaching the document service.
    #[error("document store network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The document service answered with an unexpected status.
    #[error("document store returned status {0}")]
    Status(u16),

    /// A document could not be (de)serialized.
    #[error("document serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the typed repositories.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A uniqueness constraint would be violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The requested document does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored document no longer matches the model shape.
    #[error("corrupt document in {collection}: {detail}")]
    DataCorruption {
        /// Collection holding the bad document.
        collection: &'static str,
        /// What failed to decode.
        detail: String,
    },
}

/// Transport boundary over a collection/document JSON store.
pub trait DocumentStore: Send + Sync + 'static {
    /// Fetch one document, `None` if absent.
    fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send;

    /// Create or replace one document.
    fn put(
        &self,
        collection: &str,
        id: &str,
        document: &Value,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Delete one document. Returns whether it existed.
    fn delete(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// All documents in a collection.
    fn list(&self, collection: &str) -> impl Future<Output = Result<Vec<Value>, StoreError>> + Send;

    /// Documents whose top-level `field` equals `value`.
    fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> impl Future<Output = Result<Vec<Value>, StoreError>> + Send;
}

/// Concrete store selected at startup.
///
/// Handlers hold this through `AppState`; the enum exists because the
/// transport trait is not object-safe.
pub enum Store {
    /// In-process store for tests and local development.
    Memory(MemoryStore),
    /// Hosted document service.
    Remote(RemoteStore),
}

impl DocumentStore for Store {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        match self {
            Self::Memory(s) => s.get(collection, id).await,
            Self::Remote(s) => s.get(collection, id).await,
        }
    }

    async fn put(&self, collection: &str, id: &str, document: &Value) -> Result<(), StoreError> {
        match self {
            Self::Memory(s) => s.put(collection, id, document).await,
            Self::Remote(s) => s.put(collection, id, document).await,
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        match self {
            Self::Memory(s) => s.delete(collection, id).await,
            Self::Remote(s) => s.delete(collection, id).await,
        }
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        match self {
            Self::Memory(s) => s.list(collection).await,
            Self::Remote(s) => s.list(collection).await,
        }
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        match self {
            Self::Memory(s) => s.find_by_field(collection, field, value).await,
            Self::Remote(s) => s.find_by_field(collection, field, value).await,
        }
    }
}

/// Decode a raw document into a typed model.
fn decode<T: serde::de::DeserializeOwned>(
    collection: &'static str,
    document: Value,
) -> Result<T, RepositoryError> {
    serde_json::from_value(document).map_err(|e| RepositoryError::DataCorruption {
        collection,
        detail: e.to_string(),
    })
}

/// Encode a typed model into a raw document.
fn encode<T: serde::Serialize>(model: &T) -> Result<Value, RepositoryError> {
    Ok(serde_json::to_value(model).map_err(StoreError::Serialization)?)
}

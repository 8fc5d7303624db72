//! In-process document store.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use serde_json::Value;

use super::{DocumentStore, StoreError};

/// In-memory document store for tests and local development.
///
/// Collections are created on first write. `BTreeMap` keeps listing order
/// deterministic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, BTreeMap<String, Value>>> {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, BTreeMap<String, Value>>> {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        Ok(self
            .read()
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn put(&self, collection: &str, id: &str, document: &Value) -> Result<(), StoreError> {
        self.write()
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), document.clone());
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        Ok(self
            .write()
            .get_mut(collection)
            .is_some_and(|docs| docs.remove(id).is_some()))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .read()
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        Ok(self
            .read()
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| doc.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get("users", "u-1").await.unwrap(), None);

        store.put("users", "u-1", &json!({"name": "a"})).await.unwrap();
        assert_eq!(
            store.get("users", "u-1").await.unwrap(),
            Some(json!({"name": "a"}))
        );

        assert!(store.delete("users", "u-1").await.unwrap());
        assert!(!store.delete("users", "u-1").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_field() {
        let store = MemoryStore::new();
        store
            .put("products", "p-1", &json!({"category_id": "c-1"}))
            .await
            .unwrap();
        store
            .put("products", "p-2", &json!({"category_id": "c-2"}))
            .await
            .unwrap();

        let matches = store
            .find_by_field("products", "category_id", &json!("c-1"))
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
    }

    #[tokio::test]
    async fn test_list_missing_collection_is_empty() {
        let store = MemoryStore::new();
        assert!(store.list("nothing").await.unwrap().is_empty());
    }
}

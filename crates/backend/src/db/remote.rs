//! Hosted document service client.

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::config::DocumentStoreConfig;

use super::{DocumentStore, StoreError};

/// Client for the managed document service.
///
/// Cheaply cloneable via `Arc`. Every request carries the service token as a
/// bearer credential.
#[derive(Clone)]
pub struct RemoteStore {
    inner: Arc<RemoteStoreInner>,
}

struct RemoteStoreInner {
    http: reqwest::Client,
    base_url: String,
    token: SecretString,
}

impl RemoteStore {
    /// Create a client from document store configuration.
    #[must_use]
    pub fn new(config: &DocumentStoreConfig) -> Self {
        Self {
            inner: Arc::new(RemoteStoreInner {
                http: reqwest::Client::new(),
                base_url: config.base_url.trim_end_matches('/').to_owned(),
                token: config.token.clone(),
            }),
        }
    }

    fn url(&self, collection: &str, id: Option<&str>) -> String {
        match id {
            Some(id) => format!("{}/v1/{collection}/{id}", self.inner.base_url),
            None => format!("{}/v1/{collection}", self.inner.base_url),
        }
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        self.inner
            .http
            .request(method, url)
            .bearer_auth(self.inner.token.expose_secret())
    }
}

impl DocumentStore for RemoteStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let response = self
            .request(reqwest::Method::GET, self.url(collection, Some(id)))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(StoreError::Status(status.as_u16())),
        }
    }

    async fn put(&self, collection: &str, id: &str, document: &Value) -> Result<(), StoreError> {
        let response = self
            .request(reqwest::Method::PUT, self.url(collection, Some(id)))
            .json(document)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(StoreError::Status(response.status().as_u16()))
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, StoreError> {
        let response = self
            .request(reqwest::Method::DELETE, self.url(collection, Some(id)))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            status => Err(StoreError::Status(status.as_u16())),
        }
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let response = self
            .request(reqwest::Method::GET, self.url(collection, None))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(StoreError::Status(response.status().as_u16()))
        }
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        // The service matches on JSON equality, so non-string values are
        // passed in their JSON encoding.
        let encoded = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        let response = self
            .request(reqwest::Method::GET, self.url(collection, None))
            .query(&[("field", field), ("value", encoded.as_str())])
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(StoreError::Status(response.status().as_u16()))
        }
    }
}

//! Category repository.

use serde_json::json;

use kifayati_core::CategoryId;

use crate::models::Category;

use super::{DocumentStore, RepositoryError, Store, decode, encode};

const COLLECTION: &str = "categories";

/// Typed access to the `categories` collection.
pub struct CategoryRepository<'a> {
    store: &'a Store,
}

impl<'a> CategoryRepository<'a> {
    /// Create a repository over the given store.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert a new category.
    ///
    /// # Errors
    ///
    /// `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, category: &Category) -> Result<(), RepositoryError> {
        if self.get_by_slug(&category.slug).await?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "category slug {} already exists",
                category.slug
            )));
        }
        self.store
            .put(COLLECTION, category.id.as_str(), &encode(category)?)
            .await?;
        Ok(())
    }

    /// Fetch a category by ID.
    ///
    /// # Errors
    ///
    /// Store or decode failures.
    pub async fn get_by_id(&self, id: &CategoryId) -> Result<Option<Category>, RepositoryError> {
        self.store
            .get(COLLECTION, id.as_str())
            .await?
            .map(|doc| decode(COLLECTION, doc))
            .transpose()
    }

    /// Fetch a category by slug.
    ///
    /// # Errors
    ///
    /// Store or decode failures.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>, RepositoryError> {
        self.store
            .find_by_field(COLLECTION, "slug", &json!(slug))
            .await?
            .into_iter()
            .next()
            .map(|doc| decode(COLLECTION, doc))
            .transpose()
    }

    /// All categories.
    ///
    /// # Errors
    ///
    /// Store or decode failures.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        self.store
            .list(COLLECTION)
            .await?
            .into_iter()
            .map(|doc| decode(COLLECTION, doc))
            .collect()
    }

    /// Replace an existing category.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if the category does not exist;
    /// `RepositoryError::Conflict` if the new slug belongs to another
    /// category.
    pub async fn update(&self, category: &Category) -> Result<(), RepositoryError> {
        if self.get_by_id(&category.id).await?.is_none() {
            return Err(RepositoryError::NotFound(format!(
                "category {}",
                category.id
            )));
        }
        if let Some(existing) = self.get_by_slug(&category.slug).await? {
            if existing.id != category.id {
                return Err(RepositoryError::Conflict(format!(
                    "category slug {} already exists",
                    category.slug
                )));
            }
        }
        self.store
            .put(COLLECTION, category.id.as_str(), &encode(category)?)
            .await?;
        Ok(())
    }

    /// Delete a category. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub async fn delete(&self, id: &CategoryId) -> Result<bool, RepositoryError> {
        Ok(self.store.delete(COLLECTION, id.as_str()).await?)
    }
}

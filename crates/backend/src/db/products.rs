//! Product repository.

use serde_json::json;

use kifayati_core::{CategoryId, ProductId};

use crate::models::Product;

use super::{DocumentStore, RepositoryError, Store, decode, encode};

const COLLECTION: &str = "products";

/// Typed access to the `products` collection.
pub struct ProductRepository<'a> {
    store: &'a Store,
}

impl<'a> ProductRepository<'a> {
    /// Create a repository over the given store.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// `RepositoryError::Conflict` if the slug is taken.
    pub async fn create(&self, product: &Product) -> Result<(), RepositoryError> {
        if self.get_by_slug(&product.slug).await?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "product slug {} already exists",
                product.slug
            )));
        }
        self.store
            .put(COLLECTION, product.id.as_str(), &encode(product)?)
            .await?;
        Ok(())
    }

    /// Fetch a product by ID.
    ///
    /// # Errors
    ///
    /// Store or decode failures.
    pub async fn get_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        self.store
            .get(COLLECTION, id.as_str())
            .await?
            .map(|doc| decode(COLLECTION, doc))
            .transpose()
    }

    /// Fetch a product by slug.
    ///
    /// # Errors
    ///
    /// Store or decode failures.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>, RepositoryError> {
        self.store
            .find_by_field(COLLECTION, "slug", &json!(slug))
            .await?
            .into_iter()
            .next()
            .map(|doc| decode(COLLECTION, doc))
            .transpose()
    }

    /// All products.
    ///
    /// # Errors
    ///
    /// Store or decode failures.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.store
            .list(COLLECTION)
            .await?
            .into_iter()
            .map(|doc| decode(COLLECTION, doc))
            .collect()
    }

    /// Products in the given category.
    ///
    /// # Errors
    ///
    /// Store or decode failures.
    pub async fn list_by_category(
        &self,
        category_id: &CategoryId,
    ) -> Result<Vec<Product>, RepositoryError> {
        self.store
            .find_by_field(COLLECTION, "category_id", &json!(category_id.as_str()))
            .await?
            .into_iter()
            .map(|doc| decode(COLLECTION, doc))
            .collect()
    }

    /// Replace an existing product.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if the product does not exist;
    /// `RepositoryError::Conflict` if the new slug belongs to another product.
    pub async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        if self.get_by_id(&product.id).await?.is_none() {
            return Err(RepositoryError::NotFound(format!("product {}", product.id)));
        }
        if let Some(existing) = self.get_by_slug(&product.slug).await? {
            if existing.id != product.id {
                return Err(RepositoryError::Conflict(format!(
                    "product slug {} already exists",
                    product.slug
                )));
            }
        }
        self.store
            .put(COLLECTION, product.id.as_str(), &encode(product)?)
            .await?;
        Ok(())
    }

    /// Delete a product. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Store failures.
    pub async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        Ok(self.store.delete(COLLECTION, id.as_str()).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use chrono::Utc;
    use kifayati_core::Price;

    fn product(id: &str, slug: &str, category: &str) -> Product {
        Product {
            id: id.into(),
            name: slug.to_owned(),
            slug: slug.to_owned(),
            description: String::new(),
            price: Price::new("100".parse().unwrap()),
            discount_percent: 0,
            category_id: category.into(),
            quantity: 1,
            photo_url: None,
            shipping: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_slug_lookup_and_conflict() {
        let store = Store::Memory(MemoryStore::new());
        let products = ProductRepository::new(&store);

        products.create(&product("p-1", "rice", "c-1")).await.unwrap();
        assert!(products.get_by_slug("rice").await.unwrap().is_some());

        let err = products
            .create(&product("p-2", "rice", "c-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let store = Store::Memory(MemoryStore::new());
        let products = ProductRepository::new(&store);

        products.create(&product("p-1", "rice", "c-1")).await.unwrap();
        products.create(&product("p-2", "flour", "c-1")).await.unwrap();
        products.create(&product("p-3", "soap", "c-2")).await.unwrap();

        let grocery = products.list_by_category(&"c-1".into()).await.unwrap();
        assert_eq!(grocery.len(), 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = Store::Memory(MemoryStore::new());
        let products = ProductRepository::new(&store);

        products.create(&product("p-1", "rice", "c-1")).await.unwrap();
        assert!(products.delete(&"p-1".into()).await.unwrap());
        assert!(!products.delete(&"p-1".into()).await.unwrap());
    }
}

//! User repository.

use serde_json::json;

use kifayati_core::{Email, UserId};

use crate::models::User;

use super::{DocumentStore, RepositoryError, Store, decode, encode};

const COLLECTION: &str = "users";

/// Typed access to the `users` collection.
pub struct UserRepository<'a> {
    store: &'a Store,
}

impl<'a> UserRepository<'a> {
    /// Create a repository over the given store.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert a new user.
    ///
    /// # Errors
    ///
    /// `RepositoryError::Conflict` if the email is already registered.
    pub async fn create(&self, user: &User) -> Result<(), RepositoryError> {
        if self.get_by_email(&user.email).await?.is_some() {
            return Err(RepositoryError::Conflict(format!(
                "email {} already registered",
                user.email
            )));
        }
        self.store
            .put(COLLECTION, user.id.as_str(), &encode(user)?)
            .await?;
        Ok(())
    }

    /// Fetch a user by ID.
    ///
    /// # Errors
    ///
    /// Store or decode failures.
    pub async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.store
            .get(COLLECTION, id.as_str())
            .await?
            .map(|doc| decode(COLLECTION, doc))
            .transpose()
    }

    /// Fetch a user by email.
    ///
    /// # Errors
    ///
    /// Store or decode failures.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let matches = self
            .store
            .find_by_field(COLLECTION, "email", &json!(email.as_str()))
            .await?;
        matches
            .into_iter()
            .next()
            .map(|doc| decode(COLLECTION, doc))
            .transpose()
    }

    /// Replace an existing user.
    ///
    /// # Errors
    ///
    /// `RepositoryError::NotFound` if the user does not exist.
    pub async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        if self.get_by_id(&user.id).await?.is_none() {
            return Err(RepositoryError::NotFound(format!("user {}", user.id)));
        }
        self.store
            .put(COLLECTION, user.id.as_str(), &encode(user)?)
            .await?;
        Ok(())
    }

    /// All users, for the admin listing.
    ///
    /// # Errors
    ///
    /// Store or decode failures.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        self.store
            .list(COLLECTION)
            .await?
            .into_iter()
            .map(|doc| decode(COLLECTION, doc))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::user::ROLE_CUSTOMER;
    use chrono::Utc;

    fn user(id: &str, email: &str) -> User {
        User {
            id: id.into(),
            name: "Test".to_owned(),
            email: Email::parse(email).unwrap(),
            phone: String::new(),
            address: String::new(),
            role: ROLE_CUSTOMER,
            password_hash: "h".to_owned(),
            answer_hash: "h".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let store = Store::Memory(MemoryStore::new());
        let users = UserRepository::new(&store);

        users.create(&user("u-1", "a@b.com")).await.unwrap();

        let by_id = users.get_by_id(&"u-1".into()).await.unwrap().unwrap();
        assert_eq!(by_id.email.as_str(), "a@b.com");

        let by_email = users
            .get_by_email(&Email::parse("a@b.com").unwrap())
            .await
            .unwrap();
        assert!(by_email.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = Store::Memory(MemoryStore::new());
        let users = UserRepository::new(&store);

        users.create(&user("u-1", "a@b.com")).await.unwrap();
        let err = users.create(&user("u-2", "a@b.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let store = Store::Memory(MemoryStore::new());
        let users = UserRepository::new(&store);

        let err = users.update(&user("u-9", "x@y.com")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
    }
}

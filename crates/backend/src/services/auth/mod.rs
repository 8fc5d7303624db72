//! Authentication service.
//!
//! Registration, login, recovery-answer password reset, profile updates,
//! and JWT issuance/verification for the API.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kifayati_core::{Email, UserId};

use crate::config::BackendConfig;
use crate::db::users::UserRepository;
use crate::db::{RepositoryError, Store};
use crate::models::User;
use crate::models::user::ROLE_CUSTOMER;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Claims carried by backend-issued tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// 0 = customer, 1 = admin.
    pub role: u8,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Fields a user may change on their own profile. `None` leaves the field
/// untouched.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// New-account registration input.
#[derive(Debug, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub address: String,
    /// Recovery answer used by forgot-password.
    pub answer: String,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    config: &'a BackendConfig,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a Store, config: &'a BackendConfig) -> Self {
        Self {
            users: UserRepository::new(store),
            config,
        }
    }

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet
    /// requirements. Returns `AuthError::UserAlreadyExists` if the email is
    /// already registered.
    pub async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let email = Email::parse(&registration.email)?;
        validate_password(&registration.password)?;
        if registration.answer.trim().is_empty() {
            return Err(AuthError::WeakPassword(
                "recovery answer must not be empty".to_owned(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: UserId::from(Uuid::new_v4().to_string()),
            name: registration.name,
            email,
            phone: registration.phone,
            address: registration.address,
            role: ROLE_CUSTOMER,
            password_hash: hash_secret(&registration.password)?,
            answer_hash: hash_secret(registration.answer.trim())?,
            created_at: now,
            updated_at: now,
        };

        self.users.create(&user).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Login with email and password, issuing a token on success.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is
    /// wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        let email = Email::parse(email)?;
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_secret(password, &user.password_hash)?;

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    /// Reset a forgotten password using the recovery answer.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account matches the email,
    /// `AuthError::WrongAnswer` if the recovery answer doesn't match, and
    /// `AuthError::WeakPassword` if the new password is too weak.
    pub async fn reset_password(
        &self,
        email: &str,
        answer: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let email = Email::parse(email)?;
        let mut user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        verify_secret(answer.trim(), &user.answer_hash).map_err(|_| AuthError::WrongAnswer)?;
        validate_password(new_password)?;

        user.password_hash = hash_secret(new_password)?;
        user.updated_at = Utc::now();
        self.users.update(&user).await?;

        tracing::info!(user_id = %user.id, "password reset");
        Ok(())
    }

    /// Apply a profile update to the given user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user no longer exists and
    /// `AuthError::WeakPassword` if a new password is too weak.
    pub async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, AuthError> {
        let mut user = self
            .users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Some(password) = update.password {
            validate_password(&password)?;
            user.password_hash = hash_secret(&password)?;
        }
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(phone) = update.phone {
            user.phone = phone;
        }
        if let Some(address) = update.address {
            user.address = address;
        }
        user.updated_at = Utc::now();

        self.users.update(&user).await?;
        Ok(user)
    }

    /// Issue a signed token for the user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if signing fails.
    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        #[allow(clippy::cast_possible_wrap)] // TTL is bounded by configuration
        let claims = Claims {
            sub: user.id.as_str().to_owned(),
            role: user.role,
            iat: now,
            exp: now + self.config.token_ttl.as_secs() as i64,
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.expose_secret().as_bytes()),
        )?;
        Ok(token)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Token` if the token is invalid or expired.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.expose_secret().as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password or recovery answer using Argon2id.
fn hash_secret(secret: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password or recovery answer against a stored hash.
fn verify_secret(secret: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(secret.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

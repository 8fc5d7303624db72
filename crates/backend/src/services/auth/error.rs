//! Authentication error types.

use thiserror::Error;

use kifayati_core::EmailError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email/password combination. Deliberately indistinguishable
    /// from a missing account at the API surface.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account exists for this email.
    #[error("user not found")]
    UserNotFound,

    /// An account with this email already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// The password does not meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// The email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The recovery answer does not match.
    #[error("wrong recovery answer")]
    WrongAnswer,

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// A token could not be issued or verified.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// The underlying repository failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

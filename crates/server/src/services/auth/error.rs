//! Authentication error type.

use thiserror::Error;

use clementine_core::EmailError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password combination is wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// No account exists for the given identifier.
    #[error("account not found")]
    AccountNotFound,

    /// An account with this email already exists.
    #[error("email already registered")]
    EmailTaken,

    /// Password doesn't meet requirements.
    #[error("weak password: {0}")]
    WeakPassword(String),

    /// Email format is invalid.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Token failed signature or claim validation.
    #[error("invalid token")]
    InvalidToken,

    /// Presented refresh token does not exactly match the stored value.
    #[error("refresh token mismatch")]
    RefreshMismatch,

    /// Password hashing failed.
    #[error("password hashing failed")]
    PasswordHash,

    /// Token encoding failed.
    #[error("token encoding failed: {0}")]
    TokenEncoding(#[from] jsonwebtoken::errors::Error),

    /// Underlying repository error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

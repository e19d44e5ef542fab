//! User repository for database operations.
//!
//! Covers buyer accounts: profile data, password hashes, and the stored
//! refresh token. All queries are parameterized.

use sqlx::PgPool;

use clementine_core::{Email, UserId};

use super::RepositoryError;
use crate::models::User;

/// Columns selected into [`User`]; the password hash is never part of it.
const USER_COLUMNS: &str = "id, email, full_name, phone, avatar_url, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Create a new user with email, password hash, and display name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        email: &Email,
        password_hash: &str,
        full_name: &str,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO app_user (email, password_hash, full_name)
             VALUES ($1, $2, $3)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "email already exists"))?;

        Ok(user)
    }

    /// Get a user's password hash by email.
    ///
    /// Returns `None` if the user doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, password_hash FROM app_user WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        let Some((id, password_hash)) = row else {
            return Ok(None);
        };

        let user = self
            .get_by_id(UserId::new(id))
            .await?
            .ok_or(RepositoryError::NotFound)?;

        Ok(Some((user, password_hash)))
    }

    /// Update profile fields. Only non-`None` fields are changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        id: UserId,
        full_name: Option<&str>,
        phone: Option<&str>,
        avatar_url: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE app_user
             SET full_name = COALESCE($2, full_name),
                 phone = COALESCE($3, phone),
                 avatar_url = COALESCE($4, avatar_url),
                 updated_at = now()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(full_name)
        .bind(phone)
        .bind(avatar_url)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(user)
    }

    /// Store the refresh token on the user's row.
    ///
    /// The row holds a single value; issuing a new refresh token replaces
    /// the previous one, invalidating it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_refresh_token(
        &self,
        id: UserId,
        refresh_token: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE app_user SET refresh_token = $2 WHERE id = $1")
            .bind(id)
            .bind(refresh_token)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Clear the stored refresh token (logout).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_refresh_token(&self, id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE app_user SET refresh_token = NULL WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Get the stored refresh token for exact-match validation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn get_refresh_token(&self, id: UserId) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query_as::<_, (Option<String>,)>(
            "SELECT refresh_token FROM app_user WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.0)
    }

    /// List users, newest first (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM app_user ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }
}

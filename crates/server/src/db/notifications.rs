//! Notification repository.

use sqlx::{PgPool, Postgres, Transaction};

use clementine_core::{NotificationId, UserId};

use super::RepositoryError;
use crate::models::Notification;

const NOTIFICATION_COLUMNS: &str = "id, user_id, title, body, read, created_at";

/// Repository for notification database operations.
pub struct NotificationRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> NotificationRepository<'a> {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a notification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        user_id: UserId,
        title: &str,
        body: &str,
    ) -> Result<Notification, RepositoryError> {
        let notification = sqlx::query_as::<_, Notification>(&format!(
            "INSERT INTO notification (user_id, title, body)
             VALUES ($1, $2, $3)
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(user_id)
        .bind(title)
        .bind(body)
        .fetch_one(self.pool)
        .await?;

        Ok(notification)
    }

    /// Insert a notification inside the caller's transaction (webhook path).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
        title: &str,
        body: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO notification (user_id, title, body) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(title)
            .bind(body)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// List a user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let notifications = sqlx::query_as::<_, Notification>(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notification
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(notifications)
    }

    /// Mark one of the user's notifications as read.
    ///
    /// The user id is part of the predicate so one user can never mark
    /// another's notification.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the notification doesn't exist
    /// or belongs to someone else.
    pub async fn mark_read(
        &self,
        id: NotificationId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE notification SET read = TRUE WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

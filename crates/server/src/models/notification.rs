//! Notification domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use clementine_core::{NotificationId, UserId};

/// A notification shown in the user's inbox.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

//! Store domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use clementine_core::{StoreId, StoreRole, UserId};

/// A seller's store.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A membership row linking a user to a store.
///
/// Exactly one `owner` row exists per store, inserted in the same
/// transaction that creates the store.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StoreMember {
    pub store_id: StoreId,
    pub user_id: UserId,
    pub role: StoreRole,
}

//! Account domain types.
//!
//! These types represent validated domain objects separate from database row
//! types. Credential material (password hashes, stored refresh tokens) is
//! deliberately absent so accounts can be serialized into responses.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use clementine_core::{Email, UserId};

/// A marketplace user (buyer, and potentially a store member).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name.
    pub full_name: String,
    /// Optional contact phone.
    pub phone: Option<String>,
    /// Optional avatar image URL.
    pub avatar_url: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A staff account (admin, shipper, or storage).
///
/// Staff accounts live in their own tables and never mix with buyers; the
/// table an account was loaded from determines its role claim.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StaffAccount {
    pub id: i64,
    pub email: Email,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

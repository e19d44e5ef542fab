//! Database operations for the marketplace `PostgreSQL`.
//!
//! # Tables
//!
//! - `app_user` - Buyer accounts (also store members via `store_user`)
//! - `admin_account`, `shipper_account`, `storage_account` - Staff accounts
//! - `store`, `store_user` - Stores and memberships
//! - `category`, `product`, `product_variant`, `product_image` - Catalog
//! - `cart`, `cart_item` - Carts
//! - `order_table`, `order_item`, `order_log`, `shipping` - Orders
//! - `payment` - One row per checkout, reconciled by webhook
//! - `discount`, `discount_user` - Vouchers and redemptions
//! - `wishlist`, `wishlist_item` - Wishlists
//! - `notification` - User notifications
//! - `conversation`, `chat_message` - Chat persistence
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p clementine-cli -- migrate
//! ```
//! They are never run automatically on server startup.

pub mod carts;
pub mod categories;
pub mod chat;
pub mod discounts;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod products;
pub mod staff;
pub mod stores;
pub mod users;
pub mod wishlists;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use chat::ChatRepository;
pub use discounts::DiscountRepository;
pub use notifications::NotificationRepository;
pub use orders::OrderRepository;
pub use payments::PaymentRepository;
pub use products::ProductRepository;
pub use staff::{StaffRepository, StaffTable};
pub use stores::StoreRepository;
pub use users::UserRepository;
pub use wishlists::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a sqlx error, turning unique violations into [`Self::Conflict`].
    pub(crate) fn from_unique(err: sqlx::Error, conflict_msg: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(conflict_msg.to_owned());
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

//! Wishlist repository. One wishlist per user; items are unique per product.

use sqlx::PgPool;

use clementine_core::{ProductId, UserId, WishlistId};

use super::RepositoryError;
use crate::models::Product;

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    /// Create a new wishlist repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's wishlist id, creating the wishlist on first use.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<WishlistId, RepositoryError> {
        let row = sqlx::query_as::<_, (i64,)>(
            "INSERT INTO wishlist (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING id",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(WishlistId::new(row.0))
    }

    /// Add a product. Adding the same product twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add(
        &self,
        wishlist_id: WishlistId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO wishlist_item (wishlist_id, product_id)
             VALUES ($1, $2)
             ON CONFLICT (wishlist_id, product_id) DO NOTHING",
        )
        .bind(wishlist_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was removed, `false` if it wasn't there.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        wishlist_id: WishlistId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM wishlist_item WHERE wishlist_id = $1 AND product_id = $2")
                .bind(wishlist_id)
                .bind(product_id)
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// The wishlisted products, most recently added first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn products(&self, wishlist_id: WishlistId) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT p.id, p.store_id, p.category_id, p.name, p.description, p.published,
                    p.created_at, p.updated_at
             FROM wishlist_item wi
             JOIN product p ON p.id = wi.product_id
             WHERE wi.wishlist_id = $1
             ORDER BY wi.added_at DESC",
        )
        .bind(wishlist_id)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }
}

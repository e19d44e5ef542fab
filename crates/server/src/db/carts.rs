//! Cart repository.
//!
//! A cart item is unique per (cart, variant); adding the same variant again
//! accumulates quantity on conflict instead of duplicating the row.

use sqlx::{PgPool, Postgres, Transaction};

use clementine_core::{CartId, UserId, VariantId};

use super::RepositoryError;
use crate::models::{Cart, CartLine};

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's cart, creating it on first use.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        // Upsert keeps this race-free when two requests arrive for a fresh user.
        let cart = sqlx::query_as::<_, Cart>(
            "INSERT INTO cart (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING id, user_id",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(cart)
    }

    /// Add a variant to the cart, accumulating quantity on conflict.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails (including a
    /// foreign-key failure for an unknown variant).
    pub async fn add_item(
        &self,
        cart_id: CartId,
        variant_id: VariantId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO cart_item (cart_id, variant_id, quantity)
             VALUES ($1, $2, $3)
             ON CONFLICT (cart_id, variant_id)
             DO UPDATE SET quantity = cart_item.quantity + EXCLUDED.quantity",
        )
        .bind(cart_id)
        .bind(variant_id)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Set an item's quantity exactly. A quantity of zero removes the row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item isn't in the cart.
    pub async fn set_quantity(
        &self,
        cart_id: CartId,
        variant_id: VariantId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = if quantity == 0 {
            sqlx::query("DELETE FROM cart_item WHERE cart_id = $1 AND variant_id = $2")
                .bind(cart_id)
                .bind(variant_id)
                .execute(self.pool)
                .await?
        } else {
            sqlx::query(
                "UPDATE cart_item SET quantity = $3 WHERE cart_id = $1 AND variant_id = $2",
            )
            .bind(cart_id)
            .bind(variant_id)
            .bind(quantity)
            .execute(self.pool)
            .await?
        };

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Remove an item from the cart.
    ///
    /// # Returns
    ///
    /// Returns `true` if the item was removed, `false` if it wasn't there.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        variant_id: VariantId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_item WHERE cart_id = $1 AND variant_id = $2")
            .bind(cart_id)
            .bind(variant_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove every item from the cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_item WHERE cart_id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Transaction-scoped clear, used by checkout after orders are written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_tx(
        tx: &mut Transaction<'_, Postgres>,
        cart_id: CartId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_item WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// The cart's lines joined with variant, product, and store data.
    ///
    /// Ordered by store then variant so checkout grouping is deterministic.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines(&self, cart_id: CartId) -> Result<Vec<CartLine>, RepositoryError> {
        let lines = sqlx::query_as::<_, CartLine>(
            "SELECT ci.variant_id, p.id AS product_id, p.store_id,
                    p.name AS product_name, v.name AS variant_name,
                    v.price AS unit_price, ci.quantity, v.stock
             FROM cart_item ci
             JOIN product_variant v ON v.id = ci.variant_id
             JOIN product p ON p.id = v.product_id
             WHERE ci.cart_id = $1
             ORDER BY p.store_id ASC, ci.variant_id ASC",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(lines)
    }
}

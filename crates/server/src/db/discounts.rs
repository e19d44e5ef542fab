//! Voucher repository: discount codes and per-user redemptions.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use clementine_core::{DiscountId, StoreId, UserId};

use super::RepositoryError;
use crate::models::Discount;

const DISCOUNT_COLUMNS: &str =
    "id, store_id, code, percent_off, max_uses, starts_at, ends_at, created_at";

/// Repository for voucher database operations.
pub struct DiscountRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DiscountRepository<'a> {
    /// Create a new discount repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a voucher. `store_id = None` makes it platform-wide.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the code already exists.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        store_id: Option<StoreId>,
        code: &str,
        percent_off: i32,
        max_uses: i32,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<Discount, RepositoryError> {
        let discount = sqlx::query_as::<_, Discount>(&format!(
            "INSERT INTO discount (store_id, code, percent_off, max_uses, starts_at, ends_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {DISCOUNT_COLUMNS}"
        ))
        .bind(store_id)
        .bind(code)
        .bind(percent_off)
        .bind(max_uses)
        .bind(starts_at)
        .bind(ends_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "voucher code already exists"))?;

        Ok(discount)
    }

    /// Look a voucher up by its code.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Discount>, RepositoryError> {
        let discount = sqlx::query_as::<_, Discount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discount WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(self.pool)
        .await?;

        Ok(discount)
    }

    /// Get a voucher by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: DiscountId) -> Result<Option<Discount>, RepositoryError> {
        let discount = sqlx::query_as::<_, Discount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discount WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(discount)
    }

    /// List a store's vouchers; `None` lists the platform-wide ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, store_id: Option<StoreId>) -> Result<Vec<Discount>, RepositoryError> {
        let discounts = sqlx::query_as::<_, Discount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discount
             WHERE store_id IS NOT DISTINCT FROM $1
             ORDER BY created_at DESC"
        ))
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(discounts)
    }

    /// Delete a voucher.
    ///
    /// # Returns
    ///
    /// Returns `true` if the voucher was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: DiscountId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM discount WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Total redemptions recorded for a voucher.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn redemption_count(&self, id: DiscountId) -> Result<i64, RepositoryError> {
        let row = sqlx::query_as::<_, (i64,)>(
            "SELECT COUNT(*) FROM discount_user WHERE discount_id = $1",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?;

        Ok(row.0)
    }

    /// Whether this user has already redeemed the voucher.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_redeemed(
        &self,
        id: DiscountId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let row = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS (
                 SELECT 1 FROM discount_user WHERE discount_id = $1 AND user_id = $2
             )",
        )
        .bind(id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        Ok(row.0)
    }

    /// Record a redemption inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already redeemed it.
    pub async fn record_redemption_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: DiscountId,
        user_id: UserId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO discount_user (discount_id, user_id) VALUES ($1, $2)")
            .bind(id)
            .bind(user_id)
            .execute(&mut **tx)
            .await
            .map_err(|e| RepositoryError::from_unique(e, "voucher already redeemed"))?;

        Ok(())
    }
}

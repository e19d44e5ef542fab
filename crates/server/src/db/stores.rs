//! Store repository.
//!
//! Store creation inserts the store row and its single `owner` membership in
//! one transaction; a store can never exist without exactly one owner.

use sqlx::PgPool;

use clementine_core::{StoreId, StoreRole, UserId};

use super::RepositoryError;
use crate::models::{Store, StoreMember};

const STORE_COLUMNS: &str = "id, name, description, logo_url, created_at, updated_at";

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a store with `owner` as its single owner member.
    ///
    /// Both inserts run inside one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the store name is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        owner: UserId,
        name: &str,
        description: Option<&str>,
        logo_url: Option<&str>,
    ) -> Result<Store, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let store = sqlx::query_as::<_, Store>(&format!(
            "INSERT INTO store (name, description, logo_url)
             VALUES ($1, $2, $3)
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(name)
        .bind(description)
        .bind(logo_url)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "store name already exists"))?;

        sqlx::query("INSERT INTO store_user (store_id, user_id, role) VALUES ($1, $2, $3)")
            .bind(store.id)
            .bind(owner)
            .bind(StoreRole::Owner)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(store)
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(&format!(
            "SELECT {STORE_COLUMNS} FROM store WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(store)
    }

    /// Update store fields. Only non-`None` fields are changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store doesn't exist.
    pub async fn update(
        &self,
        id: StoreId,
        name: Option<&str>,
        description: Option<&str>,
        logo_url: Option<&str>,
    ) -> Result<Store, RepositoryError> {
        let store = sqlx::query_as::<_, Store>(&format!(
            "UPDATE store
             SET name = COALESCE($2, name),
                 description = COALESCE($3, description),
                 logo_url = COALESCE($4, logo_url),
                 updated_at = now()
             WHERE id = $1
             RETURNING {STORE_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(logo_url)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(store)
    }

    /// Delete a store.
    ///
    /// # Returns
    ///
    /// Returns `true` if the store was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: StoreId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM store WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List the stores a user belongs to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Store>, RepositoryError> {
        let stores = sqlx::query_as::<_, Store>(
            "SELECT s.id, s.name, s.description, s.logo_url, s.created_at, s.updated_at
             FROM store s
             JOIN store_user su ON su.store_id = s.id
             WHERE su.user_id = $1
             ORDER BY s.created_at ASC",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(stores)
    }

    /// Owner check: is `user_id` the owner of `store_id`?
    ///
    /// Every mutating store/product/order endpoint calls this before
    /// proceeding.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn is_owner(
        &self,
        store_id: StoreId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let row = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS (
                 SELECT 1 FROM store_user
                 WHERE store_id = $1 AND user_id = $2 AND role = $3
             )",
        )
        .bind(store_id)
        .bind(user_id)
        .bind(StoreRole::Owner)
        .fetch_one(self.pool)
        .await?;

        Ok(row.0)
    }

    /// List the members of a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn members(&self, store_id: StoreId) -> Result<Vec<StoreMember>, RepositoryError> {
        let members = sqlx::query_as::<_, StoreMember>(
            "SELECT store_id, user_id, role FROM store_user WHERE store_id = $1 ORDER BY user_id",
        )
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(members)
    }
}

//! Category repository. Mutations are admin-gated at the route layer.

use sqlx::PgPool;

use clementine_core::CategoryId;

use super::RepositoryError;
use crate::models::Category;

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, parent_id FROM category ORDER BY name ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    pub async fn create(
        &self,
        name: &str,
        parent_id: Option<CategoryId>,
    ) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO category (name, parent_id) VALUES ($1, $2) RETURNING id, name, parent_id",
        )
        .bind(name)
        .bind(parent_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "category name already exists"))?;

        Ok(category)
    }

    /// Rename a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category doesn't exist.
    pub async fn rename(&self, id: CategoryId, name: &str) -> Result<Category, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            "UPDATE category SET name = $2 WHERE id = $1 RETURNING id, name, parent_id",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "category name already exists"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(category)
    }

    /// Delete a category.
    ///
    /// # Returns
    ///
    /// Returns `true` if the category was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

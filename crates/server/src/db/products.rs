//! Product repository: products, variants, and images.

use sqlx::PgPool;

use clementine_core::{CategoryId, ImageId, Money, ProductId, StoreId, VariantId};

use super::RepositoryError;
use crate::models::{Product, ProductImage, ProductVariant};

const PRODUCT_COLUMNS: &str =
    "id, store_id, category_id, name, description, published, created_at, updated_at";

/// Filters for the public product listing.
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub store_id: Option<StoreId>,
    /// Case-insensitive substring match on the product name.
    pub search: Option<String>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        store_id: StoreId,
        category_id: CategoryId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO product (store_id, category_id, name, description)
             VALUES ($1, $2, $3, $4)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(store_id)
        .bind(category_id)
        .bind(name)
        .bind(description)
        .fetch_one(self.pool)
        .await?;

        Ok(product)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Update product fields. Only non-`None` fields are changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(
        &self,
        id: ProductId,
        category_id: Option<CategoryId>,
        name: Option<&str>,
        description: Option<&str>,
        published: Option<bool>,
    ) -> Result<Product, RepositoryError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE product
             SET category_id = COALESCE($2, category_id),
                 name = COALESCE($3, name),
                 description = COALESCE($4, description),
                 published = COALESCE($5, published),
                 updated_at = now()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(category_id)
        .bind(name)
        .bind(description)
        .bind(published)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(product)
    }

    /// Delete a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Public listing: published products, filtered, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_public(
        &self,
        filter: &ProductFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Product>, RepositoryError> {
        let search = filter.search.as_ref().map(|s| format!("%{s}%"));

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product
             WHERE published
               AND ($1::bigint IS NULL OR category_id = $1)
               AND ($2::bigint IS NULL OR store_id = $2)
               AND ($3::text IS NULL OR name ILIKE $3)
             ORDER BY created_at DESC
             LIMIT $4 OFFSET $5"
        ))
        .bind(filter.category_id)
        .bind(filter.store_id)
        .bind(search)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// All products of a store, including unpublished (owner view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_store(&self, store_id: StoreId) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE store_id = $1 ORDER BY created_at DESC"
        ))
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    // =========================================================================
    // Variants
    // =========================================================================

    /// Add a variant to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_variant(
        &self,
        product_id: ProductId,
        name: &str,
        price: Money,
        stock: i32,
    ) -> Result<ProductVariant, RepositoryError> {
        let variant = sqlx::query_as::<_, ProductVariant>(
            "INSERT INTO product_variant (product_id, name, price, stock)
             VALUES ($1, $2, $3, $4)
             RETURNING id, product_id, name, price, stock",
        )
        .bind(product_id)
        .bind(name)
        .bind(price)
        .bind(stock)
        .fetch_one(self.pool)
        .await?;

        Ok(variant)
    }

    /// Get a variant by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_variant(
        &self,
        id: VariantId,
    ) -> Result<Option<ProductVariant>, RepositoryError> {
        let variant = sqlx::query_as::<_, ProductVariant>(
            "SELECT id, product_id, name, price, stock FROM product_variant WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(variant)
    }

    /// Update a variant. Only non-`None` fields are changed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the variant doesn't exist.
    pub async fn update_variant(
        &self,
        id: VariantId,
        name: Option<&str>,
        price: Option<Money>,
        stock: Option<i32>,
    ) -> Result<ProductVariant, RepositoryError> {
        let variant = sqlx::query_as::<_, ProductVariant>(
            "UPDATE product_variant
             SET name = COALESCE($2, name),
                 price = COALESCE($3, price),
                 stock = COALESCE($4, stock)
             WHERE id = $1
             RETURNING id, product_id, name, price, stock",
        )
        .bind(id)
        .bind(name)
        .bind(price)
        .bind(stock)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(variant)
    }

    /// Delete a variant.
    ///
    /// # Returns
    ///
    /// Returns `true` if the variant was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_variant(&self, id: VariantId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product_variant WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List a product's variants.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_variants(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductVariant>, RepositoryError> {
        let variants = sqlx::query_as::<_, ProductVariant>(
            "SELECT id, product_id, name, price, stock
             FROM product_variant WHERE product_id = $1 ORDER BY id ASC",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(variants)
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// Attach an image URL to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_image(
        &self,
        product_id: ProductId,
        url: &str,
        position: i32,
    ) -> Result<ProductImage, RepositoryError> {
        let image = sqlx::query_as::<_, ProductImage>(
            "INSERT INTO product_image (product_id, url, position)
             VALUES ($1, $2, $3)
             RETURNING id, product_id, url, position",
        )
        .bind(product_id)
        .bind(url)
        .bind(position)
        .fetch_one(self.pool)
        .await?;

        Ok(image)
    }

    /// Delete an image.
    ///
    /// # Returns
    ///
    /// Returns `true` if the image was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_image(&self, id: ImageId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product_image WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List a product's images, ordered by position.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_images(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductImage>, RepositoryError> {
        let images = sqlx::query_as::<_, ProductImage>(
            "SELECT id, product_id, url, position
             FROM product_image WHERE product_id = $1 ORDER BY position ASC, id ASC",
        )
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(images)
    }
}

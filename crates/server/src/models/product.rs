//! Catalog domain types: categories, products, variants, images.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use clementine_core::{CategoryId, ImageId, Money, ProductId, StoreId, VariantId};

/// A catalog category. Categories form a shallow tree via `parent_id`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

/// A product listed by a store.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    /// Unpublished products are hidden from public listings but still
    /// visible to the owning store.
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A purchasable variant of a product (size, color, ...).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductVariant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub name: String,
    pub price: Money,
    pub stock: i32,
}

/// An image attached to a product, ordered by `position`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductImage {
    pub id: ImageId,
    pub product_id: ProductId,
    pub url: String,
    pub position: i32,
}

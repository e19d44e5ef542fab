//! Product route handlers: catalog CRUD, variants, and images.
//!
//! Public reads show published products; every mutation re-verifies store
//! ownership through the product's store.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};

use clementine_core::{CategoryId, ImageId, Money, ProductId, StoreId, UserId, VariantId};

use crate::db::products::ProductFilter;
use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{Product, ProductImage, ProductVariant};
use crate::state::AppState;

use super::stores::require_owner;

const DEFAULT_PAGE_SIZE: i64 = 24;
const MAX_PAGE_SIZE: i64 = 100;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/{id}", get(show).patch(update).delete(remove))
        .route("/{id}/variants", post(add_variant))
        .route(
            "/{id}/variants/{variant_id}",
            delete(delete_variant).patch(update_variant),
        )
        .route("/{id}/images", post(add_image))
        .route("/{id}/images/{image_id}", delete(delete_image))
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Public listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category_id: Option<CategoryId>,
    pub store_id: Option<StoreId>,
    /// Substring search on the product name.
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Product creation body.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub store_id: StoreId,
    pub category_id: CategoryId,
    pub name: String,
    pub description: Option<String>,
}

/// Product update body. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub category_id: Option<CategoryId>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub published: Option<bool>,
}

/// Variant creation body.
#[derive(Debug, Deserialize)]
pub struct CreateVariantRequest {
    pub name: String,
    pub price: Money,
    pub stock: i32,
}

/// Variant update body.
#[derive(Debug, Deserialize)]
pub struct UpdateVariantRequest {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i32>,
}

/// Image attach body.
#[derive(Debug, Deserialize)]
pub struct AddImageRequest {
    pub url: String,
    pub position: Option<i32>,
}

/// Product detail response with variants and images.
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub variants: Vec<ProductVariant>,
    pub images: Vec<ProductImage>,
}

/// Load a product and verify the caller owns its store.
async fn owned_product(state: &AppState, id: ProductId, user_id: UserId) -> Result<Product> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    require_owner(state, product.store_id, user_id).await?;

    Ok(product)
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /products - Public listing with filters.
async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let filter = ProductFilter {
        category_id: query.category_id,
        store_id: query.store_id,
        search: query.q,
    };
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let products = ProductRepository::new(state.pool())
        .list_public(&filter, limit, offset)
        .await?;

    Ok(Json(products))
}

/// GET /products/{id} - Product detail with variants and images.
async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let repo = ProductRepository::new(state.pool());

    let product = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    let variants = repo.list_variants(id).await?;
    let images = repo.list_images(id).await?;

    Ok(Json(ProductDetail {
        product,
        variants,
        images,
    }))
}

/// POST /products - Create a product under one of the caller's stores.
async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<CreateProductRequest>,
) -> Result<impl IntoResponse> {
    require_owner(&state, body.store_id, user.id).await?;

    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("product name is required".to_owned()));
    }

    let product = ProductRepository::new(state.pool())
        .create(
            body.store_id,
            body.category_id,
            body.name.trim(),
            body.description.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// PATCH /products/{id} - Update a product (owner only).
async fn update(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    owned_product(&state, id, user.id).await?;

    let product = ProductRepository::new(state.pool())
        .update(
            id,
            body.category_id,
            body.name.as_deref(),
            body.description.as_deref(),
            body.published,
        )
        .await?;

    Ok(Json(product))
}

/// DELETE /products/{id} - Delete a product (owner only).
async fn remove(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    owned_product(&state, id, user.id).await?;

    let deleted = ProductRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("product {id}")));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /products/{id}/variants - Add a variant (owner only).
async fn add_variant(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<CreateVariantRequest>,
) -> Result<impl IntoResponse> {
    owned_product(&state, id, user.id).await?;

    if body.stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".to_owned()));
    }

    let variant = ProductRepository::new(state.pool())
        .add_variant(id, &body.name, body.price, body.stock)
        .await?;

    Ok((StatusCode::CREATED, Json(variant)))
}

/// PATCH /products/{id}/variants/{variant_id} - Update a variant (owner only).
async fn update_variant(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path((id, variant_id)): Path<(ProductId, VariantId)>,
    Json(body): Json<UpdateVariantRequest>,
) -> Result<Json<ProductVariant>> {
    owned_product(&state, id, user.id).await?;

    let repo = ProductRepository::new(state.pool());

    // The variant must belong to the product in the path.
    let variant = repo
        .get_variant(variant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("variant {variant_id}")))?;
    if variant.product_id != id {
        return Err(AppError::NotFound(format!("variant {variant_id}")));
    }

    let variant = repo
        .update_variant(variant_id, body.name.as_deref(), body.price, body.stock)
        .await?;

    Ok(Json(variant))
}

/// DELETE /products/{id}/variants/{variant_id} - Delete a variant (owner only).
async fn delete_variant(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path((id, variant_id)): Path<(ProductId, VariantId)>,
) -> Result<StatusCode> {
    owned_product(&state, id, user.id).await?;

    let repo = ProductRepository::new(state.pool());

    let variant = repo
        .get_variant(variant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("variant {variant_id}")))?;
    if variant.product_id != id {
        return Err(AppError::NotFound(format!("variant {variant_id}")));
    }

    repo.delete_variant(variant_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /products/{id}/images - Attach an image URL (owner only).
///
/// Relative paths (e.g. an object key in the media bucket) are resolved
/// against the configured media base URL.
async fn add_image(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<AddImageRequest>,
) -> Result<impl IntoResponse> {
    owned_product(&state, id, user.id).await?;

    let url = match (&state.config().media_base_url, body.url.starts_with("http")) {
        (Some(base), false) => {
            format!("{}/{}", base.trim_end_matches('/'), body.url.trim_start_matches('/'))
        }
        _ => body.url.clone(),
    };

    let image = ProductRepository::new(state.pool())
        .add_image(id, &url, body.position.unwrap_or(0))
        .await?;

    Ok((StatusCode::CREATED, Json(image)))
}

/// DELETE /products/{id}/images/{image_id} - Delete an image (owner only).
async fn delete_image(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path((id, image_id)): Path<(ProductId, ImageId)>,
) -> Result<StatusCode> {
    owned_product(&state, id, user.id).await?;

    let deleted = ProductRepository::new(state.pool())
        .delete_image(image_id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound(format!("image {image_id}")));
    }

    Ok(StatusCode::NO_CONTENT)
}

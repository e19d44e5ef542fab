//! Wishlist route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use clementine_core::ProductId;

use crate::db::{ProductRepository, WishlistRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Product;
use crate::state::AppState;

/// Build the wishlist router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(show).post(add))
        .route("/{product_id}", axum::routing::delete(remove))
}

/// Add-to-wishlist body.
#[derive(Debug, Deserialize)]
pub struct AddWishlistRequest {
    pub product_id: ProductId,
}

/// GET /wishlist - The caller's wishlisted products.
async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    let repo = WishlistRepository::new(state.pool());
    let wishlist_id = repo.get_or_create(user.id).await?;
    let products = repo.products(wishlist_id).await?;

    Ok(Json(products))
}

/// POST /wishlist - Add a product (idempotent).
async fn add(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<AddWishlistRequest>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool())
        .get(body.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", body.product_id)))?;

    let repo = WishlistRepository::new(state.pool());
    let wishlist_id = repo.get_or_create(user.id).await?;
    repo.add(wishlist_id, body.product_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /wishlist/{product_id} - Remove a product.
async fn remove(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<StatusCode> {
    let repo = WishlistRepository::new(state.pool());
    let wishlist_id = repo.get_or_create(user.id).await?;

    let removed = repo.remove(wishlist_id, product_id).await?;
    if !removed {
        return Err(AppError::NotFound(format!(
            "product {product_id} not in wishlist"
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

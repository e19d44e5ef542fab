//! Cart route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde::Deserialize;

use clementine_core::VariantId;

use crate::db::{CartRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::CartLine;
use crate::state::AppState;

/// Build the cart router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(show).delete(clear))
        .route("/items", post(add_item))
        .route("/items/{variant_id}", delete(remove_item).patch(set_quantity))
}

/// Add-to-cart body.
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub variant_id: VariantId,
    pub quantity: i32,
}

/// Quantity update body.
#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i32,
}

/// GET /cart - The caller's cart lines.
async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CartLine>>> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(user.id).await?;
    let lines = carts.lines(cart.id).await?;

    Ok(Json(lines))
}

/// POST /cart/items - Add a variant; quantity accumulates on repeat adds.
async fn add_item(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<AddItemRequest>,
) -> Result<StatusCode> {
    if body.quantity <= 0 {
        return Err(AppError::BadRequest("quantity must be positive".to_owned()));
    }

    // Reject unknown variants with a 404 instead of a foreign-key 500.
    ProductRepository::new(state.pool())
        .get_variant(body.variant_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("variant {}", body.variant_id)))?;

    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(user.id).await?;
    carts.add_item(cart.id, body.variant_id, body.quantity).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /cart/items/{variant_id} - Set a line's quantity (0 removes it).
async fn set_quantity(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(variant_id): Path<VariantId>,
    Json(body): Json<SetQuantityRequest>,
) -> Result<StatusCode> {
    if body.quantity < 0 {
        return Err(AppError::BadRequest(
            "quantity cannot be negative".to_owned(),
        ));
    }

    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(user.id).await?;
    carts.set_quantity(cart.id, variant_id, body.quantity).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /cart/items/{variant_id} - Remove a line.
async fn remove_item(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(variant_id): Path<VariantId>,
) -> Result<StatusCode> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(user.id).await?;

    let removed = carts.remove_item(cart.id, variant_id).await?;
    if !removed {
        return Err(AppError::NotFound(format!("variant {variant_id} not in cart")));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /cart - Clear the whole cart.
async fn clear(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    let carts = CartRepository::new(state.pool());
    let cart = carts.get_or_create(user.id).await?;
    carts.clear(cart.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

//! Store route handlers.
//!
//! Every mutating endpoint re-verifies the caller owns the store before
//! proceeding; non-owners receive 403.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use clementine_core::{StoreId, UserId};

use crate::db::{OrderRepository, StoreRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{Order, Store};
use crate::state::AppState;

/// Build the stores router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/mine", get(mine))
        .route("/{id}", get(show).patch(update).delete(delete))
        .route("/{id}/orders", get(orders))
}

// =============================================================================
// Request Types
// =============================================================================

/// Store creation body.
#[derive(Debug, Deserialize)]
pub struct CreateStoreRequest {
    pub name: String,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

/// Store update body. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateStoreRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

/// Owner check helper shared by the mutating handlers here and in the
/// product/voucher/chat routes.
pub(crate) async fn require_owner(
    state: &AppState,
    store_id: StoreId,
    user_id: UserId,
) -> Result<()> {
    let owns = StoreRepository::new(state.pool())
        .is_owner(store_id, user_id)
        .await?;

    if owns {
        Ok(())
    } else {
        Err(AppError::Forbidden("not the store owner".to_owned()))
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /store - Create a store; the caller becomes its single owner.
async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<CreateStoreRequest>,
) -> Result<impl IntoResponse> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("store name is required".to_owned()));
    }

    let store = StoreRepository::new(state.pool())
        .create(
            user.id,
            body.name.trim(),
            body.description.as_deref(),
            body.logo_url.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(store)))
}

/// GET /store/mine - Stores the caller belongs to.
async fn mine(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Store>>> {
    let stores = StoreRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(stores))
}

/// GET /store/{id} - Public store detail.
async fn show(State(state): State<AppState>, Path(id): Path<StoreId>) -> Result<Json<Store>> {
    let store = StoreRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("store {id}")))?;

    Ok(Json(store))
}

/// PATCH /store/{id} - Update store fields (owner only).
async fn update(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<StoreId>,
    Json(body): Json<UpdateStoreRequest>,
) -> Result<Json<Store>> {
    require_owner(&state, id, user.id).await?;

    let store = StoreRepository::new(state.pool())
        .update(
            id,
            body.name.as_deref(),
            body.description.as_deref(),
            body.logo_url.as_deref(),
        )
        .await?;

    Ok(Json(store))
}

/// DELETE /store/{id} - Delete a store (owner only).
async fn delete(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<StoreId>,
) -> Result<StatusCode> {
    require_owner(&state, id, user.id).await?;

    let deleted = StoreRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("store {id}")));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /store/{id}/orders - The store's orders (owner only).
async fn orders(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<StoreId>,
) -> Result<Json<Vec<Order>>> {
    require_owner(&state, id, user.id).await?;

    let orders = OrderRepository::new(state.pool()).list_for_store(id).await?;
    Ok(Json(orders))
}

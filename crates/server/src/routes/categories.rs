//! Category route handlers. Reads are public; mutations are admin-gated.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;

use clementine_core::CategoryId;

use crate::db::CategoryRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Category;
use crate::state::AppState;

/// Build the categories router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/{id}", get(show).patch(rename).delete(remove))
}

/// Category creation body.
#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub parent_id: Option<CategoryId>,
}

/// Category rename body.
#[derive(Debug, Deserialize)]
pub struct RenameCategoryRequest {
    pub name: String,
}

/// GET /categories - Public category list.
async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

/// GET /categories/{id} - Single category.
async fn show(State(state): State<AppState>, Path(id): Path<CategoryId>) -> Result<Json<Category>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    let category = categories
        .into_iter()
        .find(|c| c.id == id)
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;

    Ok(Json(category))
}

/// POST /categories - Create a category (admin only).
async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("category name is required".to_owned()));
    }

    let category = CategoryRepository::new(state.pool())
        .create(body.name.trim(), body.parent_id)
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// PATCH /categories/{id} - Rename a category (admin only).
async fn rename(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    Json(body): Json<RenameCategoryRequest>,
) -> Result<Json<Category>> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("category name is required".to_owned()));
    }

    let category = CategoryRepository::new(state.pool())
        .rename(id, body.name.trim())
        .await?;

    Ok(Json(category))
}

/// DELETE /categories/{id} - Delete a category (admin only).
async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    let deleted = CategoryRepository::new(state.pool()).delete(id).await?;
    if !deleted {
        return Err(AppError::NotFound(format!("category {id}")));
    }

    Ok(StatusCode::NO_CONTENT)
}

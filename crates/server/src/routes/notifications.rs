//! Notification route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};

use clementine_core::NotificationId;

use crate::db::NotificationRepository;
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::Notification;
use crate::state::AppState;

/// Build the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/{id}/read", post(mark_read))
}

/// GET /notifications - The caller's inbox, newest first.
async fn index(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Notification>>> {
    let notifications = NotificationRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(notifications))
}

/// POST /notifications/{id}/read - Mark one notification read.
async fn mark_read(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<NotificationId>,
) -> Result<StatusCode> {
    NotificationRepository::new(state.pool())
        .mark_read(id, user.id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

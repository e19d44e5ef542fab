//! Storage (warehouse) route handlers: staff session plus stock intake.
//!
//! The `received` endpoint performs the storage handoff: it appends the
//! `warehouse_received` log entry, after which the order's shipping method
//! is frozen.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use clementine_core::{OrderId, OrderStatus};

use crate::db::{OrderRepository, StaffTable};
use crate::error::{AppError, Result};
use crate::middleware::RequireStorage;
use crate::models::Order;
use crate::state::AppState;

use super::admin::{StaffLoginRequest, staff_login, staff_logout};

/// Build the storage router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/orders", get(intake_queue))
        .route("/orders/{id}/received", post(received))
}

/// Optional note attached to the intake confirmation.
#[derive(Debug, Default, Deserialize)]
pub struct IntakeRequest {
    pub note: Option<String>,
}

/// POST /storage/login - Storage session.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<StaffLoginRequest>,
) -> Result<impl IntoResponse> {
    staff_login(&state, StaffTable::Storage, jar, &body).await
}

/// POST /storage/logout - End the storage session.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<impl IntoResponse> {
    staff_logout(&state, StaffTable::Storage, jar).await
}

/// GET /storage/orders - Paid orders awaiting warehouse intake.
async fn intake_queue(
    RequireStorage(_storage): RequireStorage,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_by_status(OrderStatus::Paid)
        .await?;

    Ok(Json(orders))
}

/// POST /storage/orders/{id}/received - Confirm stock intake.
async fn received(
    RequireStorage(_storage): RequireStorage,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<IntakeRequest>,
) -> Result<StatusCode> {
    let repo = OrderRepository::new(state.pool());

    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    if order.status != OrderStatus::Paid {
        return Err(AppError::BadRequest(format!(
            "order is {}, expected paid",
            order.status
        )));
    }

    repo.advance_status(id, OrderStatus::WarehouseReceived, body.note.as_deref())
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

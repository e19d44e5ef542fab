//! Shipper route handlers: staff session plus the delivery work queue.

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
use crate::middleware::RequireShipper;
use crate::models::Order;
use crate::state::AppState;

use super::admin::{StaffLoginRequest, staff_login, staff_logout};

/// Build the shipper router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/orders", get(work_queue))
        .route("/orders/{id}/pickup", post(pickup))
        .route("/orders/{id}/delivered", post(delivered))
}

/// Optional note attached to a status advance.
#[derive(Debug, Default, Deserialize)]
pub struct StatusNoteRequest {
    pub note: Option<String>,
}

/// POST /shipper/login - Shipper session.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<StaffLoginRequest>,
) -> Result<impl IntoResponse> {
    staff_login(&state, StaffTable::Shipper, jar, &body).await
}

/// POST /shipper/logout - End the shipper session.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<impl IntoResponse> {
    staff_logout(&state, StaffTable::Shipper, jar).await
}

/// GET /shipper/orders - Orders at the warehouse awaiting pickup.
async fn work_queue(
    RequireShipper(_shipper): RequireShipper,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_by_status(OrderStatus::WarehouseReceived)
        .await?;

    Ok(Json(orders))
}

/// POST /shipper/orders/{id}/pickup - Take an order out for delivery.
async fn pickup(
    RequireShipper(_shipper): RequireShipper,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusNoteRequest>,
) -> Result<StatusCode> {
    advance(&state, id, OrderStatus::WarehouseReceived, OrderStatus::Shipping, body.note).await
}

/// POST /shipper/orders/{id}/delivered - Confirm delivery.
async fn delivered(
    RequireShipper(_shipper): RequireShipper,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<StatusNoteRequest>,
) -> Result<StatusCode> {
    advance(&state, id, OrderStatus::Shipping, OrderStatus::Delivered, body.note).await
}

/// Advance an order from `expected` to `next`, appending the log entry.
async fn advance(
    state: &AppState,
    id: OrderId,
    expected: OrderStatus,
    next: OrderStatus,
    note: Option<String>,
) -> Result<StatusCode> {
    let repo = OrderRepository::new(state.pool());

    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    if order.status != expected {
        return Err(AppError::BadRequest(format!(
            "order is {}, expected {expected}",
            order.status
        )));
    }

    repo.advance_status(id, next, note.as_deref()).await?;

    Ok(StatusCode::NO_CONTENT)
}

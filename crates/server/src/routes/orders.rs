//! Order route handlers: checkout, listing, detail, shipping method.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use clementine_core::{OrderId, OrderStatus};

use crate::db::{OrderRepository, StoreRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{Order, OrderItem, OrderLog, Payment, Shipping};
use crate::services::checkout::{CheckoutRequest, CheckoutService};
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/checkout", post(checkout))
        .route("/{id}", get(show))
        .route("/{id}/logs", get(logs))
        .route("/{id}/shipping", axum::routing::patch(update_shipping))
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Checkout response.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub payment: Payment,
    pub orders: Vec<Order>,
    /// Hosted payment page for the buyer.
    pub redirect_url: String,
}

/// Full order detail.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub shipping: Option<Shipping>,
    pub logs: Vec<OrderLog>,
}

/// Shipping method update body.
#[derive(Debug, Deserialize)]
pub struct UpdateShippingRequest {
    pub method: String,
}

/// Load an order the caller may read: the buyer, or the store's owner.
async fn readable_order(
    state: &AppState,
    id: OrderId,
    user: crate::middleware::CurrentUser,
) -> Result<Order> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;

    if order.user_id == user.id {
        return Ok(order);
    }

    let owns = StoreRepository::new(state.pool())
        .is_owner(order.store_id, user.id)
        .await?;
    if owns {
        return Ok(order);
    }

    Err(AppError::Forbidden("not your order".to_owned()))
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /orders/checkout - Multi-store checkout.
///
/// Groups the cart by store, creates one order per store and a single
/// payment, and returns the provider's hosted page to redirect to.
async fn checkout(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<CheckoutRequest>,
) -> Result<impl IntoResponse> {
    let service = CheckoutService::new(state.pool(), state.payment());
    let outcome = service.checkout(user.id, &body).await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            payment: outcome.payment,
            orders: outcome.orders,
            redirect_url: outcome.redirect_url,
        }),
    ))
}

/// GET /orders - The buyer's orders, newest first.
async fn index(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(Json(orders))
}

/// GET /orders/{id} - Order detail (buyer or store owner).
async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let order = readable_order(&state, id, user).await?;

    let repo = OrderRepository::new(state.pool());
    let items = repo.items(id).await?;
    let shipping = repo.shipping(id).await?;
    let logs = repo.logs(id).await?;

    Ok(Json(OrderDetail {
        order,
        items,
        shipping,
        logs,
    }))
}

/// GET /orders/{id}/logs - Status history (buyer or store owner).
async fn logs(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Vec<OrderLog>>> {
    readable_order(&state, id, user).await?;

    let logs = OrderRepository::new(state.pool()).logs(id).await?;
    Ok(Json(logs))
}

/// PATCH /orders/{id}/shipping - Change the shipping method.
///
/// Only the buyer may change it, and only while no storage-handoff
/// (`warehouse_received`) log entry exists.
async fn update_shipping(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateShippingRequest>,
) -> Result<StatusCode> {
    let repo = OrderRepository::new(state.pool());

    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    if order.user_id != user.id {
        return Err(AppError::Forbidden("not your order".to_owned()));
    }

    // Validate the method against the supported set.
    crate::services::checkout::shipping_fee(&body.method)
        .map_err(|_| AppError::BadRequest(format!("unknown shipping method: {}", body.method)))?;

    // Frozen once the warehouse has the goods.
    if repo.has_log(id, OrderStatus::WarehouseReceived).await? {
        return Err(AppError::BadRequest(
            "shipping method can no longer be changed".to_owned(),
        ));
    }

    repo.update_shipping_method(id, &body.method).await?;

    Ok(StatusCode::NO_CONTENT)
}

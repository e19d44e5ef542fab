//! Payment route handlers: the provider webhook and payment lookup.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};

use clementine_core::{OrderStatus, PaymentId, PaymentStatus};

use crate::db::{NotificationRepository, OrderRepository, PaymentRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Payment;
use crate::services::payment::{PaymentError, SIGNATURE_HEADER, WebhookEventType};
use crate::state::AppState;

/// Build the payments router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/{id}", get(show))
}

/// GET /payments/{id} - Payment detail (payer only).
async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<PaymentId>,
) -> Result<Json<Payment>> {
    let payment = PaymentRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("payment {id}")))?;

    if payment.user_id != user.id {
        return Err(AppError::Forbidden("not your payment".to_owned()));
    }

    Ok(Json(payment))
}

/// POST /payments/webhook - Provider webhook.
///
/// Verifies the signature over the raw body, then applies the event inside
/// one transaction: payment status, every associated order's status, exactly
/// one order-log entry per order, and a buyer notification. Any failure
/// rolls the transaction back and returns 500 so the provider retries.
async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    // Signature failures reject before any database work.
    let event = state
        .payment()
        .parse_webhook(&body, signature)
        .map_err(|err| match err {
            PaymentError::MissingSignature | PaymentError::InvalidSignature => {
                AppError::Unauthorized("webhook signature rejected".to_owned())
            }
            PaymentError::MalformedEvent(_) | PaymentError::UnsupportedEvent(_) => {
                AppError::BadRequest("unrecognized webhook event".to_owned())
            }
            other => AppError::Payment(other),
        })?;

    let payment = PaymentRepository::new(state.pool())
        .get_by_session(&event.session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("payment session {}", event.session_id)))?;

    // Providers redeliver; a payment already settled is acknowledged
    // without touching the database so each order keeps exactly one
    // log entry for this transition.
    if payment.status != PaymentStatus::Pending {
        tracing::info!(
            payment_id = %payment.id,
            status = ?payment.status,
            "Webhook redelivery ignored"
        );
        return Ok(StatusCode::OK);
    }

    let (order_status, title, note) = match event.event_type {
        WebhookEventType::Completed => (
            OrderStatus::Paid,
            "Payment received",
            "payment confirmed by provider",
        ),
        WebhookEventType::Failed => (
            OrderStatus::PaymentFailed,
            "Payment failed",
            "payment failed at provider",
        ),
        WebhookEventType::Expired => (
            OrderStatus::PaymentFailed,
            "Payment expired",
            "payment session expired",
        ),
    };

    let orders = OrderRepository::new(state.pool())
        .list_by_payment(payment.id)
        .await?;

    let mut tx = state.pool().begin().await.map_err(db_err)?;

    PaymentRepository::update_status_tx(&mut tx, payment.id, event.event_type.payment_status())
        .await?;

    for order in &orders {
        OrderRepository::update_status_tx(&mut tx, order.id, order_status).await?;
        OrderRepository::add_log_tx(&mut tx, order.id, order_status, Some(note)).await?;
    }

    NotificationRepository::create_tx(
        &mut tx,
        payment.user_id,
        title,
        &format!("Payment {} is now {}", payment.id, order_status),
    )
    .await?;

    tx.commit().await.map_err(db_err)?;

    tracing::info!(
        payment_id = %payment.id,
        orders = orders.len(),
        event = ?event.event_type,
        "Webhook processed"
    );

    Ok(StatusCode::OK)
}

fn db_err(err: sqlx::Error) -> AppError {
    AppError::Database(err.into())
}

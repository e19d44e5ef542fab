//! Voucher route handlers.
//!
//! Store owners manage codes scoped to their store; platform-wide codes are
//! created through the admin routes. The public check endpoint lets a
//! frontend validate a code before checkout.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::{DiscountId, StoreId};

use crate::db::DiscountRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::Discount;
use crate::state::AppState;

use super::stores::require_owner;

/// Build the vouchers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/{id}", axum::routing::delete(remove))
        .route("/check/{code}", get(check))
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Voucher creation body (store-scoped).
#[derive(Debug, Deserialize)]
pub struct CreateVoucherRequest {
    pub store_id: StoreId,
    pub code: String,
    pub percent_off: i32,
    pub max_uses: i32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Listing query: which store's vouchers to show.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub store_id: StoreId,
}

/// Public validity check response.
#[derive(Debug, Serialize)]
pub struct VoucherCheck {
    pub valid: bool,
    pub percent_off: Option<i32>,
    pub store_id: Option<StoreId>,
}

/// Shared validation for voucher creation bodies (also used by the admin
/// platform-voucher route).
pub(crate) fn validate_voucher_body(
    code: &str,
    percent_off: i32,
    max_uses: i32,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> Result<()> {
    if code.trim().is_empty() {
        return Err(AppError::BadRequest("voucher code is required".to_owned()));
    }
    if !(1..=100).contains(&percent_off) {
        return Err(AppError::BadRequest(
            "percent_off must be between 1 and 100".to_owned(),
        ));
    }
    if max_uses < 1 {
        return Err(AppError::BadRequest("max_uses must be positive".to_owned()));
    }
    if ends_at <= starts_at {
        return Err(AppError::BadRequest(
            "ends_at must be after starts_at".to_owned(),
        ));
    }
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /vouchers?store_id= - A store's vouchers (owner only).
async fn index(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Discount>>> {
    require_owner(&state, query.store_id, user.id).await?;

    let vouchers = DiscountRepository::new(state.pool())
        .list(Some(query.store_id))
        .await?;

    Ok(Json(vouchers))
}

/// POST /vouchers - Create a store-scoped voucher (owner only).
async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<CreateVoucherRequest>,
) -> Result<impl IntoResponse> {
    require_owner(&state, body.store_id, user.id).await?;
    validate_voucher_body(
        &body.code,
        body.percent_off,
        body.max_uses,
        body.starts_at,
        body.ends_at,
    )?;

    let voucher = DiscountRepository::new(state.pool())
        .create(
            Some(body.store_id),
            body.code.trim(),
            body.percent_off,
            body.max_uses,
            body.starts_at,
            body.ends_at,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(voucher)))
}

/// DELETE /vouchers/{id} - Delete a store voucher (owner only).
async fn remove(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<DiscountId>,
) -> Result<StatusCode> {
    let repo = DiscountRepository::new(state.pool());

    let voucher = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("voucher {id}")))?;

    // Platform-wide vouchers belong to admins, not store owners.
    let store_id = voucher
        .store_id
        .ok_or_else(|| AppError::Forbidden("platform voucher".to_owned()))?;
    require_owner(&state, store_id, user.id).await?;

    repo.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /vouchers/check/{code} - Public validity check.
async fn check(State(state): State<AppState>, Path(code): Path<String>) -> Result<Json<VoucherCheck>> {
    let repo = DiscountRepository::new(state.pool());

    let Some(voucher) = repo.get_by_code(&code).await? else {
        return Ok(Json(VoucherCheck {
            valid: false,
            percent_off: None,
            store_id: None,
        }));
    };

    let active = voucher.is_active(Utc::now());
    let remaining = repo.redemption_count(voucher.id).await? < i64::from(voucher.max_uses);

    Ok(Json(VoucherCheck {
        valid: active && remaining,
        percent_off: (active && remaining).then_some(voucher.percent_off),
        store_id: voucher.store_id,
    }))
}

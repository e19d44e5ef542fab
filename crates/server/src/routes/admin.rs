//! Admin route handlers: staff session plus platform management.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::{DiscountRepository, StaffTable, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Discount, StaffAccount, User};
use crate::services::auth::StaffAuthService;
use crate::state::AppState;

use super::REFRESH_COOKIE;
use super::users::{clear_refresh_cookie, refresh_cookie};
use super::vouchers::validate_voucher_body;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/users", get(list_users))
        .route("/vouchers", post(create_platform_voucher))
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Staff login body, shared with the shipper and storage routes.
#[derive(Debug, Deserialize)]
pub struct StaffLoginRequest {
    pub email: String,
    pub password: String,
}

/// Staff login response.
#[derive(Debug, Serialize)]
pub struct StaffLoginResponse {
    pub account: StaffAccount,
    pub access_token: String,
}

/// User listing query.
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Platform-wide voucher creation body.
#[derive(Debug, Deserialize)]
pub struct CreatePlatformVoucherRequest {
    pub code: String,
    pub percent_off: i32,
    pub max_uses: i32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

/// Shared staff login handler body used by all three staff routers.
pub(crate) async fn staff_login(
    state: &AppState,
    table: StaffTable,
    jar: CookieJar,
    body: &StaffLoginRequest,
) -> Result<(CookieJar, Json<StaffLoginResponse>)> {
    let auth = StaffAuthService::new(state.pool(), table, state.token_keys());
    let (account, tokens) = auth.login(&body.email, &body.password).await?;

    let jar = jar.add(refresh_cookie(tokens.refresh_token));
    Ok((
        jar,
        Json(StaffLoginResponse {
            account,
            access_token: tokens.access_token,
        }),
    ))
}

/// Shared staff logout handler body used by all three staff routers.
pub(crate) async fn staff_logout(
    state: &AppState,
    table: StaffTable,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode)> {
    let Some(cookie) = jar.get(REFRESH_COOKIE) else {
        return Err(AppError::Unauthorized("no refresh token".to_owned()));
    };

    let auth = StaffAuthService::new(state.pool(), table, state.token_keys());
    auth.logout(cookie.value()).await?;

    let jar = jar.add(clear_refresh_cookie());
    Ok((jar, StatusCode::NO_CONTENT))
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /admin/login - Admin session.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<StaffLoginRequest>,
) -> Result<impl IntoResponse> {
    staff_login(&state, StaffTable::Admin, jar, &body).await
}

/// POST /admin/logout - End the admin session.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<impl IntoResponse> {
    staff_logout(&state, StaffTable::Admin, jar).await
}

/// GET /admin/users - List buyer accounts, newest first.
async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<User>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let users = UserRepository::new(state.pool()).list(limit, offset).await?;
    Ok(Json(users))
}

/// POST /admin/vouchers - Create a platform-wide voucher.
async fn create_platform_voucher(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreatePlatformVoucherRequest>,
) -> Result<(StatusCode, Json<Discount>)> {
    validate_voucher_body(
        &body.code,
        body.percent_off,
        body.max_uses,
        body.starts_at,
        body.ends_at,
    )?;

    let voucher = DiscountRepository::new(state.pool())
        .create(
            None,
            body.code.trim(),
            body.percent_off,
            body.max_uses,
            body.starts_at,
            body.ends_at,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(voucher)))
}

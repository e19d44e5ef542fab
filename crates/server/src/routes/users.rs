//! Buyer account route handlers: registration, login, logout, profile.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration;

use crate::db::UserRepository;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::RequireUser;
use crate::models::User;
use crate::services::auth::AuthService;
use crate::state::AppState;

use super::REFRESH_COOKIE;

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me).patch(update_me))
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// Registration request body.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update body. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

/// Login response: the profile plus a bearer access token. The refresh
/// token travels only in the httpOnly cookie.
#[derive(Debug, serde::Serialize)]
pub struct LoginResponse {
    pub user: User,
    pub access_token: String,
}

/// Build the httpOnly refresh cookie shared by buyer and staff logins.
pub(crate) fn refresh_cookie(value: String) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::days(7))
        .build()
}

/// An expired cookie that clears the refresh token client-side.
pub(crate) fn clear_refresh_cookie() -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(Duration::ZERO)
        .build()
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /users/register - Create a buyer account.
async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool(), state.token_keys());
    let user = auth
        .register(&body.email, &body.password, &body.full_name)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /users/login - Authenticate and mint tokens.
///
/// Sets the refresh cookie and returns the access token in the body.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse> {
    let auth = AuthService::new(state.pool(), state.token_keys());
    let (user, tokens) = auth.login(&body.email, &body.password).await?;

    set_sentry_user(&user.id, Some(user.email.as_str()));

    let jar = jar.add(refresh_cookie(tokens.refresh_token));
    Ok((
        jar,
        Json(LoginResponse {
            user,
            access_token: tokens.access_token,
        }),
    ))
}

/// POST /users/logout - Clear the stored refresh token and the cookie.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<impl IntoResponse> {
    let Some(cookie) = jar.get(REFRESH_COOKIE) else {
        return Err(AppError::Unauthorized("no refresh token".to_owned()));
    };

    let auth = AuthService::new(state.pool(), state.token_keys());
    auth.logout(cookie.value()).await?;

    clear_sentry_user();

    let jar = jar.add(clear_refresh_cookie());
    Ok((jar, StatusCode::NO_CONTENT))
}

/// GET /users/me - Current profile.
async fn me(RequireUser(user): RequireUser, State(state): State<AppState>) -> Result<Json<User>> {
    let profile = UserRepository::new(state.pool())
        .get_by_id(user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_owned()))?;

    Ok(Json(profile))
}

/// PATCH /users/me - Update profile fields.
async fn update_me(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<User>> {
    let profile = UserRepository::new(state.pool())
        .update_profile(
            user.id,
            body.full_name.as_deref(),
            body.phone.as_deref(),
            body.avatar_url.as_deref(),
        )
        .await?;

    Ok(Json(profile))
}

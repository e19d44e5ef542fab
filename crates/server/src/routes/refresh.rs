//! Token refresh endpoint shared by every account role.
//!
//! The refresh cookie carries a role claim, so one endpoint can dispatch to
//! the right account table and validate the stored value by exact match.

use axum::{Json, Router, extract::State, routing::post};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use clementine_core::AccountRole;

use crate::db::StaffTable;
use crate::error::{AppError, Result};
use crate::services::auth::{self, AuthService, StaffAuthService, TokenKind};
use crate::state::AppState;

use super::REFRESH_COOKIE;

/// Build the refresh router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(refresh))
}

/// Refresh response carrying the new access token.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// POST /refresh - Exchange the refresh cookie for a new access token.
async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Result<Json<RefreshResponse>> {
    let Some(cookie) = jar.get(REFRESH_COOKIE) else {
        return Err(AppError::Unauthorized("no refresh token".to_owned()));
    };
    let token = cookie.value();

    // Peek at the role claim to pick the account table; the service
    // re-verifies signature, expiry, and the stored row value.
    let claims = auth::verify_token(state.token_keys(), TokenKind::Refresh, token)?;

    let access_token = match claims.role {
        AccountRole::User => {
            AuthService::new(state.pool(), state.token_keys())
                .refresh(token)
                .await?
        }
        AccountRole::Admin => {
            StaffAuthService::new(state.pool(), StaffTable::Admin, state.token_keys())
                .refresh(token)
                .await?
        }
        AccountRole::Shipper => {
            StaffAuthService::new(state.pool(), StaffTable::Shipper, state.token_keys())
                .refresh(token)
                .await?
        }
        AccountRole::Storage => {
            StaffAuthService::new(state.pool(), StaffTable::Storage, state.token_keys())
                .refresh(token)
                .await?
        }
    };

    Ok(Json(RefreshResponse { access_token }))
}

//! Authentication extractors.
//!
//! Handlers opt into authentication by taking one of the `Require*`
//! extractors. Each parses the bearer access token, verifies it against the
//! access secret, and checks the `role` claim. A missing token rejects with
//! 401 and a mismatched role with 403 before the handler body runs.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};

use clementine_core::{AccountRole, UserId};

use crate::services::auth::{self, TokenKind};
use crate::state::AppState;

/// The authenticated buyer extracted from an access token.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: UserId,
}

/// An authenticated staff account (admin/shipper/storage).
#[derive(Debug, Clone, Copy)]
pub struct CurrentStaff {
    pub id: i64,
    pub role: AccountRole,
}

/// Rejection for failed authentication or authorization.
pub enum AuthRejection {
    /// No usable bearer token.
    Unauthorized,
    /// Token is valid but the role claim doesn't open this route.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            Self::Forbidden => StatusCode::FORBIDDEN.into_response(),
        }
    }
}

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Verify the access token and check its role claim.
fn authenticate(
    parts: &Parts,
    state: &AppState,
    expected_role: AccountRole,
) -> Result<i64, AuthRejection> {
    let token = bearer_token(parts).ok_or(AuthRejection::Unauthorized)?;

    let claims = auth::verify_token(state.token_keys(), TokenKind::Access, token)
        .map_err(|_| AuthRejection::Unauthorized)?;

    if claims.role != expected_role {
        return Err(AuthRejection::Forbidden);
    }

    claims.account_id().map_err(|_| AuthRejection::Unauthorized)
}

/// Extractor that requires a buyer access token.
///
/// # Example
///
/// ```rust,ignore
/// async fn me(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("user {}", user.id)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = authenticate(parts, state, AccountRole::User)?;
        Ok(Self(CurrentUser {
            id: UserId::new(id),
        }))
    }
}

/// Extractor that requires an admin access token.
pub struct RequireAdmin(pub CurrentStaff);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = authenticate(parts, state, AccountRole::Admin)?;
        Ok(Self(CurrentStaff {
            id,
            role: AccountRole::Admin,
        }))
    }
}

/// Extractor that requires a shipper access token.
pub struct RequireShipper(pub CurrentStaff);

impl FromRequestParts<AppState> for RequireShipper {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = authenticate(parts, state, AccountRole::Shipper)?;
        Ok(Self(CurrentStaff {
            id,
            role: AccountRole::Shipper,
        }))
    }
}

/// Extractor that requires a storage (warehouse) access token.
pub struct RequireStorage(pub CurrentStaff);

impl FromRequestParts<AppState> for RequireStorage {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id = authenticate(parts, state, AccountRole::Storage)?;
        Ok(Self(CurrentStaff {
            id,
            role: AccountRole::Storage,
        }))
    }
}

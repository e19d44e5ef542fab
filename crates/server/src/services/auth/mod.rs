//! Authentication service.
//!
//! Provides password authentication and JWT access/refresh token handling.
//!
//! Both token kinds are HS256 JWTs signed with separate secrets. The refresh
//! token value is persisted on the owning account's row and validated on
//! refresh/logout by exact match; issuing a new one invalidates the old.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use clementine_core::{AccountRole, Email, UserId};

use crate::db::users::UserRepository;
use crate::db::{RepositoryError, StaffRepository, StaffTable};
use crate::models::{StaffAccount, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Access token lifetime.
const ACCESS_TOKEN_TTL_MINUTES: i64 = 15;

/// Refresh token lifetime.
const REFRESH_TOKEN_TTL_DAYS: i64 = 7;

/// Which signing secret a token was minted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by both token kinds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id as a string, per JWT convention.
    pub sub: String,
    /// Account role; gates route access.
    pub role: AccountRole,
    /// Issued-at (epoch seconds).
    pub iat: i64,
    /// Expiry (epoch seconds).
    pub exp: i64,
    /// Unique token id; makes every refresh token distinct.
    pub jti: String,
}

impl Claims {
    /// The account id parsed back out of `sub`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidToken`] if `sub` is not a valid id.
    pub fn account_id(&self) -> Result<i64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Pre-built signing and verification keys for both token kinds.
///
/// Built once at startup from the configured secrets and shared via app
/// state.
pub struct TokenKeys {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl TokenKeys {
    /// Build keys from the two configured secrets.
    #[must_use]
    pub fn new(access_secret: &SecretString, refresh_secret: &SecretString) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.expose_secret().as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.expose_secret().as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.expose_secret().as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.expose_secret().as_bytes()),
        }
    }

    const fn encoding(&self, kind: TokenKind) -> &EncodingKey {
        match kind {
            TokenKind::Access => &self.access_encoding,
            TokenKind::Refresh => &self.refresh_encoding,
        }
    }

    const fn decoding(&self, kind: TokenKind) -> &DecodingKey {
        match kind {
            TokenKind::Access => &self.access_decoding,
            TokenKind::Refresh => &self.refresh_decoding,
        }
    }
}

/// An access/refresh token pair minted at login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    /// Not serialized into JSON responses; it travels in an httpOnly cookie.
    #[serde(skip)]
    pub refresh_token: String,
}

/// Authentication service for buyer accounts.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    keys: &'a TokenKeys,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, keys: &'a TokenKeys) -> Self {
        Self {
            users: UserRepository::new(pool),
            keys,
        }
    }

    /// Register a new user with email, password, and display name.
    ///
    /// The password is hashed with Argon2id; plaintext is never stored.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::EmailTaken` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, &password_hash, full_name)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with email and password, minting a token pair.
    ///
    /// The refresh token is stored on the user's row, replacing any
    /// previous value.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, TokenPair), AuthError> {
        let email = Email::parse(email)?;

        let (user, password_hash) = self
            .users
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let tokens = mint_token_pair(self.keys, user.id.get(), AccountRole::User)?;
        self.users
            .set_refresh_token(user.id, &tokens.refresh_token)
            .await?;

        Ok((user, tokens))
    }

    /// Exchange a refresh token for a new access token.
    ///
    /// The presented token must verify against the refresh secret AND match
    /// the stored row value exactly.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` on signature/claim failure.
    /// Returns `AuthError::RefreshMismatch` if the stored value is absent or
    /// different.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = verify_token(self.keys, TokenKind::Refresh, refresh_token)?;
        // Staff tokens must never resolve against the buyer table, even if
        // the numeric ids collide.
        if claims.role != AccountRole::User {
            return Err(AuthError::InvalidToken);
        }
        let user_id = UserId::new(claims.account_id()?);

        let stored = self.users.get_refresh_token(user_id).await.map_err(|e| {
            match e {
                RepositoryError::NotFound => AuthError::AccountNotFound,
                other => AuthError::Repository(other),
            }
        })?;

        if stored.as_deref() != Some(refresh_token) {
            return Err(AuthError::RefreshMismatch);
        }

        mint_token(self.keys, TokenKind::Access, user_id.get(), claims.role)
    }

    /// Logout: validate the refresh token by exact match, then clear it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RefreshMismatch` if the stored value is absent or
    /// different.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let claims = verify_token(self.keys, TokenKind::Refresh, refresh_token)?;
        if claims.role != AccountRole::User {
            return Err(AuthError::InvalidToken);
        }
        let user_id = UserId::new(claims.account_id()?);

        let stored = self.users.get_refresh_token(user_id).await?;
        if stored.as_deref() != Some(refresh_token) {
            return Err(AuthError::RefreshMismatch);
        }

        self.users.clear_refresh_token(user_id).await?;
        Ok(())
    }
}

/// Authentication service for staff accounts (admin/shipper/storage).
pub struct StaffAuthService<'a> {
    staff: StaffRepository<'a>,
    table: StaffTable,
    keys: &'a TokenKeys,
}

impl<'a> StaffAuthService<'a> {
    /// Create a staff authentication service for one staff table.
    #[must_use]
    pub const fn new(pool: &'a PgPool, table: StaffTable, keys: &'a TokenKeys) -> Self {
        Self {
            staff: StaffRepository::new(pool, table),
            table,
            keys,
        }
    }

    /// Login a staff account, minting a token pair with the table's role.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(StaffAccount, TokenPair), AuthError> {
        let email = Email::parse(email)?;

        let (account, password_hash) = self
            .staff
            .get_password_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        let tokens = mint_token_pair(self.keys, account.id, self.table.role())?;
        self.staff
            .set_refresh_token(account.id, &tokens.refresh_token)
            .await?;

        Ok((account, tokens))
    }

    /// Exchange a staff refresh token for a new access token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RefreshMismatch` if the stored value is absent or
    /// different, `AuthError::InvalidToken` if the token's role doesn't match
    /// this service's table.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = verify_token(self.keys, TokenKind::Refresh, refresh_token)?;
        if claims.role != self.table.role() {
            return Err(AuthError::InvalidToken);
        }
        let id = claims.account_id()?;

        let stored = self.staff.get_refresh_token(id).await.map_err(|e| match e {
            RepositoryError::NotFound => AuthError::AccountNotFound,
            other => AuthError::Repository(other),
        })?;

        if stored.as_deref() != Some(refresh_token) {
            return Err(AuthError::RefreshMismatch);
        }

        mint_token(self.keys, TokenKind::Access, id, claims.role)
    }

    /// Logout a staff account, clearing the stored refresh token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::RefreshMismatch` if the stored value is absent or
    /// different.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let claims = verify_token(self.keys, TokenKind::Refresh, refresh_token)?;
        if claims.role != self.table.role() {
            return Err(AuthError::InvalidToken);
        }
        let id = claims.account_id()?;

        let stored = self.staff.get_refresh_token(id).await?;
        if stored.as_deref() != Some(refresh_token) {
            return Err(AuthError::RefreshMismatch);
        }

        self.staff.clear_refresh_token(id).await?;
        Ok(())
    }
}

// =============================================================================
// Token helpers
// =============================================================================

/// Mint one token of the given kind.
///
/// # Errors
///
/// Returns `AuthError::TokenEncoding` if signing fails.
pub fn mint_token(
    keys: &TokenKeys,
    kind: TokenKind,
    account_id: i64,
    role: AccountRole,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let ttl = match kind {
        TokenKind::Access => Duration::minutes(ACCESS_TOKEN_TTL_MINUTES),
        TokenKind::Refresh => Duration::days(REFRESH_TOKEN_TTL_DAYS),
    };

    let claims = Claims {
        sub: account_id.to_string(),
        role,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, keys.encoding(kind))?;
    Ok(token)
}

/// Mint an access/refresh pair for one account.
///
/// # Errors
///
/// Returns `AuthError::TokenEncoding` if signing fails.
pub fn mint_token_pair(
    keys: &TokenKeys,
    account_id: i64,
    role: AccountRole,
) -> Result<TokenPair, AuthError> {
    Ok(TokenPair {
        access_token: mint_token(keys, TokenKind::Access, account_id, role)?,
        refresh_token: mint_token(keys, TokenKind::Refresh, account_id, role)?,
    })
}

/// Verify a token of the given kind and return its claims.
///
/// # Errors
///
/// Returns `AuthError::InvalidToken` on signature or expiry failure.
pub fn verify_token(keys: &TokenKeys, kind: TokenKind, token: &str) -> Result<Claims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    // iss/aud are not used; sub + role carry everything we gate on.
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<Claims>(token, keys.decoding(kind), &validation)
        .map_err(|_| AuthError::InvalidToken)?;

    Ok(data.claims)
}

// =============================================================================
// Password helpers
// =============================================================================

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_keys() -> TokenKeys {
        TokenKeys::new(
            &SecretString::from("a".repeat(32)),
            &SecretString::from("b".repeat(32)),
        )
    }

    #[test]
    fn test_hash_password_never_stores_plaintext() {
        let hash = hash_password("correct horse battery").unwrap();
        assert_ne!(hash, "correct horse battery");
        assert!(!hash.contains("correct horse battery"));
        // PHC string format for Argon2id
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(verify_password("correct horse battery", &hash).is_ok());
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let hash = hash_password("correct horse battery").unwrap();
        assert!(matches!(
            verify_password("wrong password", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same password").unwrap();
        let b = hash_password("same password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_password_too_short() {
        assert!(matches!(
            validate_password("short"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(validate_password("long enough").is_ok());
    }

    #[test]
    fn test_mint_and_verify_access_token() {
        let keys = test_keys();
        let token = mint_token(&keys, TokenKind::Access, 42, AccountRole::User).unwrap();

        let claims = verify_token(&keys, TokenKind::Access, &token).unwrap();
        assert_eq!(claims.account_id().unwrap(), 42);
        assert_eq!(claims.role, AccountRole::User);
    }

    #[test]
    fn test_role_claim_survives_roundtrip() {
        let keys = test_keys();
        let token = mint_token(&keys, TokenKind::Access, 7, AccountRole::Shipper).unwrap();

        let claims = verify_token(&keys, TokenKind::Access, &token).unwrap();
        assert_eq!(claims.role, AccountRole::Shipper);
    }

    #[test]
    fn test_access_secret_rejects_refresh_token() {
        // Tokens are signed with separate secrets; a refresh token must never
        // pass as an access token.
        let keys = test_keys();
        let refresh = mint_token(&keys, TokenKind::Refresh, 42, AccountRole::User).unwrap();

        assert!(matches!(
            verify_token(&keys, TokenKind::Access, &refresh),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let keys = test_keys();
        assert!(matches!(
            verify_token(&keys, TokenKind::Access, "not-a-jwt"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_refresh_tokens_are_unique() {
        // jti makes every minted refresh token distinct, so replacing the
        // stored value really invalidates the previous token.
        let keys = test_keys();
        let a = mint_token(&keys, TokenKind::Refresh, 42, AccountRole::User).unwrap();
        let b = mint_token(&keys, TokenKind::Refresh, 42, AccountRole::User).unwrap();
        assert_ne!(a, b);
    }
}

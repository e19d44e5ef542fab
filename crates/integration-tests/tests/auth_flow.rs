//! Integration tests for registration, login, refresh, and logout.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The server running (cargo run -p clementine-server)
//!
//! Run with: cargo test -p clementine-integration-tests -- --ignored

use clementine_integration_tests::{api_base_url, client, register_and_login};
use serde_json::{Value, json};
use sqlx::Row;

// ============================================================================
// Registration & Login
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_register_stores_hashed_password() {
    let client = client();
    let user = register_and_login(&client).await;

    // Look at the row directly: the stored hash must not be the plaintext.
    let database_url = std::env::var("CLEMENTINE_DATABASE_URL")
        .expect("CLEMENTINE_DATABASE_URL required for this test");
    let pool = sqlx::PgPool::connect(&database_url)
        .await
        .expect("database connection failed");

    let row = sqlx::query("SELECT password_hash FROM app_user WHERE email = $1")
        .bind(&user.email)
        .fetch_one(&pool)
        .await
        .expect("user row should exist");
    let hash: String = row.get("password_hash");

    assert_ne!(hash, user.password);
    assert!(hash.starts_with("$argon2id$"), "expected Argon2id PHC hash");
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_login_wrong_password_returns_401() {
    let client = client();
    let user = register_and_login(&client).await;
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/users/login"))
        .json(&json!({ "email": user.email, "password": "definitely-wrong" }))
        .send()
        .await
        .expect("login request failed");

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_login_issues_tokens_bound_to_account() {
    let client = client();
    let user = register_and_login(&client).await;
    let base_url = api_base_url();

    // The access token opens /users/me for exactly this account.
    let resp = client
        .get(format!("{base_url}/users/me"))
        .bearer_auth(&user.access_token)
        .send()
        .await
        .expect("me request failed");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("me response should be JSON");
    assert_eq!(body["email"].as_str(), Some(user.email.as_str()));
}

// ============================================================================
// Refresh & Logout
// ============================================================================

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_refresh_cookie_mints_new_access_token() {
    let client = client();
    let user = register_and_login(&client).await;
    let base_url = api_base_url();

    // The login response set the httpOnly cookie on this client's jar.
    let resp = client
        .post(format!("{base_url}/refresh"))
        .send()
        .await
        .expect("refresh request failed");
    assert_eq!(resp.status(), 200);

    let body: Value = resp.json().await.expect("refresh response should be JSON");
    let new_token = body["access_token"].as_str().expect("access_token");
    assert!(!new_token.is_empty());
    assert_ne!(new_token, user.access_token);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_logout_invalidates_refresh_token() {
    let client = client();
    let _user = register_and_login(&client).await;
    let base_url = api_base_url();

    let resp = client
        .post(format!("{base_url}/users/logout"))
        .send()
        .await
        .expect("logout request failed");
    assert_eq!(resp.status(), 204);

    // The stored value was cleared; the (now-removed) cookie can't refresh.
    let resp = client
        .post(format!("{base_url}/refresh"))
        .send()
        .await
        .expect("refresh request failed");
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_unauthenticated_me_returns_401() {
    let client = client();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/users/me"))
        .send()
        .await
        .expect("me request failed");

    assert_eq!(resp.status(), 401);
}

//! Integration tests for Clementine.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and apply migrations
//! docker compose up -d postgres
//! cargo run -p clementine-cli -- migrate
//!
//! # Start the server
//! cargo run -p clementine-server
//!
//! # Run integration tests
//! cargo test -p clementine-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `API_BASE_URL` - Server base URL (default: `http://localhost:3000`)
//! - `CLEMENTINE_DATABASE_URL` - Direct database access for assertions
//! - `PAYMENT_WEBHOOK_SECRET` - Shared secret to sign synthetic webhooks

use reqwest::Client;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Create an HTTP client with a cookie store (for the refresh cookie).
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A registered test user with a live access token.
pub struct TestUser {
    pub email: String,
    pub password: String,
    pub access_token: String,
}

/// Register and log in a fresh user, returning its credentials and token.
///
/// # Panics
///
/// Panics if registration or login fails.
pub async fn register_and_login(client: &Client) -> TestUser {
    let base_url = api_base_url();
    let email = format!("buyer-{}@test.clementine.store", Uuid::new_v4());
    let password = format!("pw-{}", Uuid::new_v4());

    let resp = client
        .post(format!("{base_url}/users/register"))
        .json(&json!({
            "email": email,
            "password": password,
            "full_name": "Test Buyer",
        }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), 201, "registration should succeed");

    let resp = client
        .post(format!("{base_url}/users/login"))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), 200, "login should succeed");

    let body: Value = resp.json().await.expect("login response should be JSON");
    let access_token = body["access_token"]
        .as_str()
        .expect("login response carries access_token")
        .to_string();

    TestUser {
        email,
        password,
        access_token,
    }
}

/// Create a store owned by the given user, returning its id.
///
/// # Panics
///
/// Panics if the request fails.
pub async fn create_store(client: &Client, token: &str) -> i64 {
    let base_url = api_base_url();
    let resp = client
        .post(format!("{base_url}/store"))
        .bearer_auth(token)
        .json(&json!({ "name": format!("store-{}", Uuid::new_v4()) }))
        .send()
        .await
        .expect("store create request failed");
    assert_eq!(resp.status(), 201);

    let body: Value = resp.json().await.expect("store response should be JSON");
    body["id"].as_i64().expect("store id")
}

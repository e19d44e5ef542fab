//! Staff account bootstrap command.
//!
//! Creates admin/shipper/storage accounts with a generated password that is
//! printed once. Staff have no self-service registration endpoint; this is
//! the only way accounts enter those tables.

use secrecy::SecretString;
use thiserror::Error;

use clementine_server::db::{StaffRepository, StaffTable};
use clementine_server::services::auth;

/// Errors from the staff command.
#[derive(Debug, Error)]
pub enum StaffCommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] clementine_core::EmailError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] clementine_server::db::RepositoryError),

    #[error("Auth error: {0}")]
    Auth(#[from] clementine_server::services::auth::AuthError),
}

/// Create a staff account with a random one-time password.
///
/// # Errors
///
/// Returns `StaffCommandError` if the email is invalid, the database is
/// unreachable, or the email is already taken.
pub async fn create(table: StaffTable, email: &str, name: &str) -> Result<(), StaffCommandError> {
    dotenvy::dotenv().ok();

    let email = clementine_core::Email::parse(email)?;

    let database_url = std::env::var("CLEMENTINE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| StaffCommandError::MissingEnvVar("CLEMENTINE_DATABASE_URL"))?;

    let pool = clementine_server::db::create_pool(&SecretString::from(database_url)).await?;

    let password = generate_password();
    let password_hash = auth::hash_password(&password)?;

    let account = StaffRepository::new(&pool, table)
        .create(&email, &password_hash, name)
        .await?;

    tracing::info!(id = account.id, email = %account.email, "Staff account created");
    tracing::info!("One-time password (change after first login): {password}");

    Ok(())
}

/// Generate a 24-character alphanumeric password.
fn generate_password() -> String {
    use rand::Rng;
    use rand::distr::Alphanumeric;

    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}

//! Database migration command.
//!
//! Migrations are embedded at compile time from `crates/server/migrations/`
//! and applied in order. The server never runs them itself.
//!
//! # Environment Variables
//!
//! - `CLEMENTINE_DATABASE_URL` (fallback `DATABASE_URL`) - `PostgreSQL`
//!   connection string

use secrecy::SecretString;
use thiserror::Error;

/// Errors from the migrate command.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns `MigrationError` if the database is unreachable or a migration
/// fails to apply.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("CLEMENTINE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MigrationError::MissingEnvVar("CLEMENTINE_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = clementine_server::db::create_pool(&SecretString::from(database_url)).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

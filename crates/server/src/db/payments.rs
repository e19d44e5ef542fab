//! Payment repository. One payment row per checkout; webhook deliveries
//! look the row up by provider session id.

use sqlx::{PgPool, Postgres, Transaction};

use clementine_core::{Money, PaymentId, PaymentStatus, UserId};

use super::RepositoryError;
use crate::models::Payment;

const PAYMENT_COLUMNS: &str =
    "id, user_id, provider_session_id, amount, status, created_at, updated_at";

/// Repository for payment database operations.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a payment row inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the session id is already
    /// recorded (duplicate checkout submit).
    pub async fn create_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
        provider_session_id: &str,
        amount: Money,
    ) -> Result<Payment, RepositoryError> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "INSERT INTO payment (user_id, provider_session_id, amount, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(user_id)
        .bind(provider_session_id)
        .bind(amount)
        .bind(PaymentStatus::Pending)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "payment session already recorded"))?;

        Ok(payment)
    }

    /// Get a payment by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PaymentId) -> Result<Option<Payment>, RepositoryError> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(payment)
    }

    /// Look a payment up by the provider's session id (webhook path).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_session(
        &self,
        provider_session_id: &str,
    ) -> Result<Option<Payment>, RepositoryError> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment WHERE provider_session_id = $1"
        ))
        .bind(provider_session_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(payment)
    }

    /// Update a payment's status inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment doesn't exist.
    pub async fn update_status_tx(
        tx: &mut Transaction<'_, Postgres>,
        id: PaymentId,
        status: PaymentStatus,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE payment SET status = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(&mut **tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

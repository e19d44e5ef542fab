//! Order repository: orders, items, logs, and shipping rows.
//!
//! Checkout and webhook processing write through `_tx` methods so every
//! statement lands in the caller's transaction.

use sqlx::{PgPool, Postgres, Transaction};

use clementine_core::{Money, OrderId, OrderStatus, PaymentId, StoreId, UserId, VariantId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderLog, Shipping};

const ORDER_COLUMNS: &str =
    "id, user_id, store_id, payment_id, status, total, created_at, updated_at";

/// Shipping details captured at checkout.
#[derive(Debug, Clone)]
pub struct NewShipping<'s> {
    pub method: &'s str,
    pub recipient_name: &'s str,
    pub phone: &'s str,
    pub address: &'s str,
    pub fee: Money,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Transactional writes (checkout, webhook)
    // =========================================================================

    /// Insert an order row inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_tx(
        tx: &mut Transaction<'_, Postgres>,
        user_id: UserId,
        store_id: StoreId,
        payment_id: PaymentId,
        total: Money,
    ) -> Result<Order, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO order_table (user_id, store_id, payment_id, status, total)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(store_id)
        .bind(payment_id)
        .bind(OrderStatus::Created)
        .bind(total)
        .fetch_one(&mut **tx)
        .await?;

        Ok(order)
    }

    /// Insert a line-item snapshot inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_item_tx(
        tx: &mut Transaction<'_, Postgres>,
        order_id: OrderId,
        variant_id: VariantId,
        product_name: &str,
        variant_name: &str,
        unit_price: Money,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO order_item
                 (order_id, variant_id, product_name, variant_name, unit_price, quantity)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(order_id)
        .bind(variant_id)
        .bind(product_name)
        .bind(variant_name)
        .bind(unit_price)
        .bind(quantity)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Insert the shipping row for an order inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create_shipping_tx(
        tx: &mut Transaction<'_, Postgres>,
        order_id: OrderId,
        shipping: &NewShipping<'_>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO shipping (order_id, method, recipient_name, phone, address, fee)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(order_id)
        .bind(shipping.method)
        .bind(shipping.recipient_name)
        .bind(shipping.phone)
        .bind(shipping.address)
        .bind(shipping.fee)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Append an order-log entry inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_log_tx(
        tx: &mut Transaction<'_, Postgres>,
        order_id: OrderId,
        status: OrderStatus,
        note: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO order_log (order_id, status, note) VALUES ($1, $2, $3)")
            .bind(order_id)
            .bind(status)
            .bind(note)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Update an order's current status inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn update_status_tx(
        tx: &mut Transaction<'_, Postgres>,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE order_table SET status = $2, updated_at = now() WHERE id = $1")
                .bind(order_id)
                .bind(status)
                .execute(&mut **tx)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM order_table WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(order)
    }

    /// List a buyer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM order_table WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// List a store's orders, newest first (owner view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_store(&self, store_id: StoreId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM order_table WHERE store_id = $1 ORDER BY created_at DESC"
        ))
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Every order belonging to one payment (one multi-store checkout).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_payment(
        &self,
        payment_id: PaymentId,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM order_table WHERE payment_id = $1 ORDER BY id ASC"
        ))
        .bind(payment_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Orders with a given current status (shipper work queue).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_status(
        &self,
        status: OrderStatus,
    ) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM order_table WHERE status = $1 ORDER BY created_at ASC"
        ))
        .bind(status)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// List an order's line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, order_id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT order_id, variant_id, product_name, variant_name, unit_price, quantity
             FROM order_item WHERE order_id = $1 ORDER BY variant_id ASC",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(items)
    }

    /// The order's append-only status history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn logs(&self, order_id: OrderId) -> Result<Vec<OrderLog>, RepositoryError> {
        let logs = sqlx::query_as::<_, OrderLog>(
            "SELECT id, order_id, status, note, created_at
             FROM order_log WHERE order_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(order_id)
        .fetch_all(self.pool)
        .await?;

        Ok(logs)
    }

    /// Whether a log entry with the given status exists for the order.
    ///
    /// Used to freeze the shipping method once the storage handoff
    /// (`warehouse_received`) has been logged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_log(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let row = sqlx::query_as::<_, (bool,)>(
            "SELECT EXISTS (SELECT 1 FROM order_log WHERE order_id = $1 AND status = $2)",
        )
        .bind(order_id)
        .bind(status)
        .fetch_one(self.pool)
        .await?;

        Ok(row.0)
    }

    /// Get the shipping row for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn shipping(&self, order_id: OrderId) -> Result<Option<Shipping>, RepositoryError> {
        let shipping = sqlx::query_as::<_, Shipping>(
            "SELECT id, order_id, method, recipient_name, phone, address, fee,
                    created_at, updated_at
             FROM shipping WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(shipping)
    }

    /// Change the shipping method for an order.
    ///
    /// The route layer must first check that no storage-handoff log entry
    /// exists; this method only performs the write.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no shipping row exists.
    pub async fn update_shipping_method(
        &self,
        order_id: OrderId,
        method: &str,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE shipping SET method = $2, updated_at = now() WHERE order_id = $1")
                .bind(order_id)
                .bind(method)
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Append a log entry and update the order's status in one transaction.
    ///
    /// This is the staff path (shipper/storage status advance).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    pub async fn advance_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
        note: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        Self::update_status_tx(&mut tx, order_id, status).await?;
        Self::add_log_tx(&mut tx, order_id, status, note).await?;

        tx.commit().await?;

        Ok(())
    }
}

//! Order, payment, and shipping domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use clementine_core::{
    Money, OrderId, OrderLogId, OrderStatus, PaymentId, PaymentStatus, ShippingId, StoreId, UserId,
    VariantId,
};

/// One order, scoped to a single store.
///
/// A multi-store checkout creates several orders sharing one payment.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub store_id: StoreId,
    pub payment_id: PaymentId,
    pub status: OrderStatus,
    pub total: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line item snapshot taken at checkout time.
///
/// Name and price are denormalized so later catalog edits don't rewrite
/// order history.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub variant_id: VariantId,
    pub product_name: String,
    pub variant_name: String,
    pub unit_price: Money,
    pub quantity: i32,
}

/// An append-only status history entry for an order.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderLog {
    pub id: OrderLogId,
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A payment covering one whole checkout (possibly several orders).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
    pub id: PaymentId,
    pub user_id: UserId,
    /// Session id from the payment provider; webhook deliveries carry this.
    pub provider_session_id: String,
    pub amount: Money,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Shipping details for one order.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Shipping {
    pub id: ShippingId,
    pub order_id: OrderId,
    pub method: String,
    pub recipient_name: String,
    pub phone: String,
    pub address: String,
    pub fee: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//! Status enums and role types shared across the platform.

use serde::{Deserialize, Serialize};

/// Order lifecycle status.
///
/// Used both for the current status on an order row and for the append-only
/// order log entries that reconstruct shipment progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Checkout created the order; awaiting payment confirmation.
    #[default]
    Created,
    /// Payment confirmed by the provider webhook.
    Paid,
    /// Payment failed or the provider session expired.
    PaymentFailed,
    /// Stock confirmed received by a warehouse (storage handoff).
    ///
    /// After this log entry exists the shipping method is frozen.
    WarehouseReceived,
    /// Handed to the shipper; in transit.
    Shipping,
    /// Delivered to the buyer.
    Delivered,
    /// Cancelled before fulfillment.
    Cancelled,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Paid => "paid",
            Self::PaymentFailed => "payment_failed",
            Self::WarehouseReceived => "warehouse_received",
            Self::Shipping => "shipping",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// Payment record status, driven by provider webhook events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "payment_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Session opened with the provider; awaiting the webhook.
    #[default]
    Pending,
    /// The provider reported a completed payment.
    Completed,
    /// The provider reported a failed payment.
    Failed,
    /// The provider session expired unpaid.
    Expired,
}

/// Role of a member within a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "store_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum StoreRole {
    /// The single owning member, created with the store.
    Owner,
    /// Additional member without ownership rights.
    Staff,
}

/// Sender side of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "chat_sender", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ChatSender {
    /// The buyer side of the conversation.
    Customer,
    /// The store side of the conversation.
    Store,
}

/// Account kind carried in the JWT `role` claim.
///
/// Gates route access: buyer endpoints require `User`, staff endpoints
/// require their matching role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    User,
    Admin,
    Shipper,
    Storage,
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
            Self::Shipper => write!(f, "shipper"),
            Self::Storage => write!(f, "storage"),
        }
    }
}

impl std::str::FromStr for AccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "shipper" => Ok(Self::Shipper),
            "storage" => Ok(Self::Storage),
            _ => Err(format!("invalid account role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_serde() {
        let json = serde_json::to_string(&OrderStatus::WarehouseReceived).unwrap();
        assert_eq!(json, "\"warehouse_received\"");
        let back: OrderStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OrderStatus::WarehouseReceived);
    }

    #[test]
    fn test_account_role_roundtrip() {
        for role in [
            AccountRole::User,
            AccountRole::Admin,
            AccountRole::Shipper,
            AccountRole::Storage,
        ] {
            let parsed: AccountRole = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
    }

    #[test]
    fn test_account_role_rejects_unknown() {
        assert!("superuser".parse::<AccountRole>().is_err());
    }

    #[test]
    fn test_payment_status_default() {
        assert_eq!(PaymentStatus::default(), PaymentStatus::Pending);
    }
}

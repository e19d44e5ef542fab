//! Voucher (discount code) domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use clementine_core::{DiscountId, StoreId};

/// A discount code.
///
/// `store_id = None` means a platform-wide voucher (admin-created);
/// otherwise the code only applies to that store's portion of a checkout.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Discount {
    pub id: DiscountId,
    pub store_id: Option<StoreId>,
    pub code: String,
    /// Percentage off, 1-100.
    pub percent_off: i32,
    /// Total number of redemptions allowed across all users.
    pub max_uses: i32,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Discount {
    /// Whether the voucher window is open at `now`.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && now < self.ends_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clementine_core::DiscountId;

    fn voucher(start: i64, end: i64) -> Discount {
        Discount {
            id: DiscountId::new(1),
            store_id: None,
            code: "WELCOME10".to_string(),
            percent_off: 10,
            max_uses: 100,
            starts_at: Utc.timestamp_opt(start, 0).single().expect("timestamp"),
            ends_at: Utc.timestamp_opt(end, 0).single().expect("timestamp"),
            created_at: Utc.timestamp_opt(start, 0).single().expect("timestamp"),
        }
    }

    #[test]
    fn test_is_active_inside_window() {
        let v = voucher(100, 200);
        let now = Utc.timestamp_opt(150, 0).single().expect("timestamp");
        assert!(v.is_active(now));
    }

    #[test]
    fn test_is_active_outside_window() {
        let v = voucher(100, 200);
        let before = Utc.timestamp_opt(99, 0).single().expect("timestamp");
        let at_end = Utc.timestamp_opt(200, 0).single().expect("timestamp");
        assert!(!v.is_active(before));
        assert!(!v.is_active(at_end));
    }
}

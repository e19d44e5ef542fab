//! Monetary amounts backed by decimal arithmetic.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Money`] value.
#[derive(thiserror::Error, Debug, Clone)]
pub enum MoneyError {
    /// The amount is negative.
    #[error("amount cannot be negative")]
    Negative,
}

/// A non-negative monetary amount in the platform currency.
///
/// Prices, fees, and totals are stored as `NUMERIC(12,2)` and never float.
/// Serialized as a decimal string to avoid precision loss in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a `Money` value, rejecting negative amounts.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Negative`] if `amount < 0`.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative);
        }
        Ok(Self(amount))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Saturating addition; totals never wrap.
    #[must_use]
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Multiply by an item quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }

    /// Apply a percentage discount (0-100), rounding to 2 decimal places.
    ///
    /// Values above 100 are clamped so a discount can never drive the
    /// amount negative.
    #[must_use]
    pub fn less_percent(self, percent: u32) -> Self {
        let percent = percent.min(100);
        let keep = Decimal::from(100 - percent) / Decimal::ONE_HUNDRED;
        Self((self.0 * keep).round_dp(2))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.0
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        // Database values are constrained non-negative by CHECK constraints
        Ok(Self(amount))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn money(mantissa: i64, scale: u32) -> Money {
        Money::new(Decimal::new(mantissa, scale)).unwrap()
    }

    #[test]
    fn test_new_rejects_negative() {
        assert!(Money::new(Decimal::new(-1, 2)).is_err());
        assert!(Money::new(Decimal::ZERO).is_ok());
        assert!(Money::new(Decimal::new(1999, 2)).is_ok());
    }

    #[test]
    fn test_times() {
        let unit = money(250, 2);
        assert_eq!(unit.times(3).amount(), Decimal::new(750, 2));
    }

    #[test]
    fn test_saturating_add() {
        let a = money(125, 2);
        let b = money(375, 2);
        assert_eq!(a.saturating_add(b).amount(), Decimal::new(500, 2));
    }

    #[test]
    fn test_less_percent() {
        let total = money(200, 0);
        assert_eq!(total.less_percent(10).amount(), Decimal::new(18000, 2));
        // Clamped: discount can never go below zero
        assert_eq!(total.less_percent(150).amount(), Decimal::new(0, 2));
    }

    #[test]
    fn test_display_two_places() {
        let m = money(5, 0);
        assert_eq!(m.to_string(), "5.00");
    }

    #[test]
    fn test_serde_as_string() {
        let m = money(1999, 2);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "\"19.99\"");
    }
}

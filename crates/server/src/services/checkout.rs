//! Checkout orchestration.
//!
//! Groups the cart by store, opens a provider session for the grand total,
//! then writes one order (items, shipping, initial log) per store plus a
//! single payment row, all inside one transaction with each statement
//! awaited in sequence. The cart is cleared in the same transaction, so a
//! partial failure rolls everything back.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

use clementine_core::{Money, OrderStatus, StoreId, UserId, VariantId};

use crate::db::orders::NewShipping;
use crate::db::{
    CartRepository, DiscountRepository, OrderRepository, PaymentRepository, RepositoryError,
};
use crate::error::AppError;
use crate::models::{CartLine, Discount, Order, Payment};
use crate::services::payment::{PaymentClient, PaymentError};

/// Errors that can occur during checkout.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Cart has no items.
    #[error("cart is empty")]
    EmptyCart,

    /// Requested more units than the variant has in stock.
    #[error("insufficient stock for variant {variant_id}: requested {requested}, available {available}")]
    InsufficientStock {
        variant_id: VariantId,
        requested: i32,
        available: i32,
    },

    /// Shipping method outside the supported set.
    #[error("unknown shipping method: {0}")]
    UnknownShippingMethod(String),

    /// Voucher code doesn't exist.
    #[error("voucher not found")]
    VoucherNotFound,

    /// Voucher exists but its window is closed.
    #[error("voucher is not active")]
    VoucherInactive,

    /// Voucher has reached its redemption limit.
    #[error("voucher redemption limit reached")]
    VoucherExhausted,

    /// This user already redeemed the voucher.
    #[error("voucher already redeemed")]
    VoucherAlreadyRedeemed,

    /// Underlying repository error.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Payment provider error.
    #[error("payment error: {0}")]
    Payment(#[from] PaymentError),
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::EmptyCart
            | CheckoutError::InsufficientStock { .. }
            | CheckoutError::UnknownShippingMethod(_)
            | CheckoutError::VoucherInactive
            | CheckoutError::VoucherExhausted
            | CheckoutError::VoucherAlreadyRedeemed => Self::BadRequest(err.to_string()),
            CheckoutError::VoucherNotFound => Self::NotFound("voucher not found".to_owned()),
            CheckoutError::Repository(e) => Self::Database(e),
            CheckoutError::Payment(e) => Self::Payment(e),
        }
    }
}

/// Checkout request body.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Shipping method: `standard` or `express`.
    pub shipping_method: String,
    pub recipient_name: String,
    pub phone: String,
    pub address: String,
    /// Optional voucher code applied before the provider session opens.
    pub voucher_code: Option<String>,
}

/// Result of a successful checkout.
#[derive(Debug)]
pub struct CheckoutOutcome {
    pub payment: Payment,
    pub orders: Vec<Order>,
    /// Hosted payment page to redirect the buyer to.
    pub redirect_url: String,
}

/// Cart lines grouped under one store, with their subtotal.
#[derive(Debug, Clone)]
pub struct StoreGroup {
    pub store_id: StoreId,
    pub lines: Vec<CartLine>,
    pub subtotal: Money,
}

/// Checkout orchestration service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    payment: &'a PaymentClient,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, payment: &'a PaymentClient) -> Self {
        Self { pool, payment }
    }

    /// Run a full checkout for `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` on an empty cart, stock shortfall, invalid
    /// voucher, provider failure, or any database error (in which case no
    /// local rows are left behind).
    pub async fn checkout(
        &self,
        user_id: UserId,
        request: &CheckoutRequest,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let carts = CartRepository::new(self.pool);
        let cart = carts.get_or_create(user_id).await?;
        let lines = carts.lines(cart.id).await?;

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        check_stock(&lines)?;

        let fee = shipping_fee(&request.shipping_method)?;
        let groups = group_by_store(&lines);

        // Voucher validation happens before any write so invalid codes fail
        // the whole checkout up front.
        let voucher = match &request.voucher_code {
            Some(code) => Some(self.validate_voucher(code, user_id).await?),
            None => None,
        };

        let grand_total = grand_total(&groups, fee, voucher.as_ref());

        // Open the provider session first; the transaction below only
        // commits once a session exists to reconcile against.
        let reference = format!("checkout-{user_id}");
        let session = self.payment.create_session(grand_total, &reference).await?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let payment =
            PaymentRepository::create_tx(&mut tx, user_id, &session.id, grand_total).await?;

        let mut orders = Vec::with_capacity(groups.len());
        for group in &groups {
            let store_total = group_total(group, fee, voucher.as_ref());
            let order = OrderRepository::create_tx(
                &mut tx,
                user_id,
                group.store_id,
                payment.id,
                store_total,
            )
            .await?;

            for line in &group.lines {
                OrderRepository::add_item_tx(
                    &mut tx,
                    order.id,
                    line.variant_id,
                    &line.product_name,
                    &line.variant_name,
                    line.unit_price,
                    line.quantity,
                )
                .await?;
            }

            OrderRepository::create_shipping_tx(
                &mut tx,
                order.id,
                &NewShipping {
                    method: &request.shipping_method,
                    recipient_name: &request.recipient_name,
                    phone: &request.phone,
                    address: &request.address,
                    fee,
                },
            )
            .await?;

            OrderRepository::add_log_tx(&mut tx, order.id, OrderStatus::Created, None).await?;

            orders.push(order);
        }

        if let Some(voucher) = &voucher {
            DiscountRepository::record_redemption_tx(&mut tx, voucher.id, user_id).await?;
        }

        CartRepository::clear_tx(&mut tx, cart.id).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(CheckoutOutcome {
            payment,
            orders,
            redirect_url: session.redirect_url,
        })
    }

    async fn validate_voucher(
        &self,
        code: &str,
        user_id: UserId,
    ) -> Result<Discount, CheckoutError> {
        let discounts = DiscountRepository::new(self.pool);

        let voucher = discounts
            .get_by_code(code)
            .await?
            .ok_or(CheckoutError::VoucherNotFound)?;

        if !voucher.is_active(Utc::now()) {
            return Err(CheckoutError::VoucherInactive);
        }
        if discounts.redemption_count(voucher.id).await? >= i64::from(voucher.max_uses) {
            return Err(CheckoutError::VoucherExhausted);
        }
        if discounts.has_redeemed(voucher.id, user_id).await? {
            return Err(CheckoutError::VoucherAlreadyRedeemed);
        }

        Ok(voucher)
    }
}

// =============================================================================
// Pure checkout math
// =============================================================================

/// Flat shipping fee per store order, by method.
///
/// # Errors
///
/// Returns `CheckoutError::UnknownShippingMethod` for anything else.
pub fn shipping_fee(method: &str) -> Result<Money, CheckoutError> {
    use rust_decimal::Decimal;

    let fee = match method {
        "standard" => Decimal::new(500, 2),
        "express" => Decimal::new(1500, 2),
        other => return Err(CheckoutError::UnknownShippingMethod(other.to_owned())),
    };

    // Constants above are non-negative by construction.
    Ok(Money::new(fee).unwrap_or(Money::ZERO))
}

/// Reject lines that request more units than are in stock.
///
/// # Errors
///
/// Returns `CheckoutError::InsufficientStock` for the first shortfall.
pub fn check_stock(lines: &[CartLine]) -> Result<(), CheckoutError> {
    for line in lines {
        if line.quantity > line.stock {
            return Err(CheckoutError::InsufficientStock {
                variant_id: line.variant_id,
                requested: line.quantity,
                available: line.stock,
            });
        }
    }
    Ok(())
}

/// Group cart lines by store, ordered by store id.
///
/// `BTreeMap` keeps the grouping deterministic: the same cart always
/// produces the same order sequence.
#[must_use]
pub fn group_by_store(lines: &[CartLine]) -> Vec<StoreGroup> {
    let mut by_store: BTreeMap<StoreId, Vec<CartLine>> = BTreeMap::new();
    for line in lines {
        by_store.entry(line.store_id).or_default().push(line.clone());
    }

    by_store
        .into_iter()
        .map(|(store_id, lines)| {
            let subtotal = lines.iter().fold(Money::ZERO, |acc, line| {
                let quantity = u32::try_from(line.quantity).unwrap_or(0);
                acc.saturating_add(line.unit_price.times(quantity))
            });
            StoreGroup {
                store_id,
                lines,
                subtotal,
            }
        })
        .collect()
}

/// Discounted subtotal for one group.
///
/// A store-scoped voucher only discounts its own store's subtotal; a
/// platform-wide voucher discounts every group. The fee is never discounted.
fn discounted_subtotal(group: &StoreGroup, voucher: Option<&Discount>) -> Money {
    let percent = voucher.and_then(|v| match v.store_id {
        Some(store_id) if store_id != group.store_id => None,
        _ => u32::try_from(v.percent_off).ok(),
    });

    match percent {
        Some(percent) => group.subtotal.less_percent(percent),
        None => group.subtotal,
    }
}

/// One store order's total: discounted subtotal plus its shipping fee.
#[must_use]
pub fn group_total(group: &StoreGroup, fee: Money, voucher: Option<&Discount>) -> Money {
    discounted_subtotal(group, voucher).saturating_add(fee)
}

/// Grand total across all store groups; this is the amount the provider
/// session is opened for.
#[must_use]
pub fn grand_total(groups: &[StoreGroup], fee: Money, voucher: Option<&Discount>) -> Money {
    groups.iter().fold(Money::ZERO, |acc, group| {
        acc.saturating_add(group_total(group, fee, voucher))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use clementine_core::{DiscountId, ProductId};
    use rust_decimal::Decimal;

    fn money(mantissa: i64, scale: u32) -> Money {
        Money::new(Decimal::new(mantissa, scale)).unwrap()
    }

    fn line(store: i64, variant: i64, price_cents: i64, quantity: i32, stock: i32) -> CartLine {
        CartLine {
            variant_id: VariantId::new(variant),
            product_id: ProductId::new(variant),
            store_id: StoreId::new(store),
            product_name: format!("product {variant}"),
            variant_name: "default".to_string(),
            unit_price: money(price_cents, 2),
            quantity,
            stock,
        }
    }

    fn voucher(store_id: Option<i64>, percent_off: i32) -> Discount {
        Discount {
            id: DiscountId::new(1),
            store_id: store_id.map(StoreId::new),
            code: "TEST".to_string(),
            percent_off,
            max_uses: 10,
            starts_at: Utc.timestamp_opt(0, 0).single().unwrap(),
            ends_at: Utc.timestamp_opt(i32::MAX.into(), 0).single().unwrap(),
            created_at: Utc.timestamp_opt(0, 0).single().unwrap(),
        }
    }

    #[test]
    fn test_group_by_store_is_deterministic() {
        // Lines arrive interleaved across stores; grouping must come out
        // ordered by store id with per-store line order preserved.
        let lines = vec![
            line(2, 10, 100, 1, 5),
            line(1, 11, 200, 1, 5),
            line(2, 12, 300, 1, 5),
        ];

        let groups = group_by_store(&lines);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].store_id, StoreId::new(1));
        assert_eq!(groups[1].store_id, StoreId::new(2));
        assert_eq!(groups[1].lines.len(), 2);
    }

    #[test]
    fn test_group_subtotals() {
        let lines = vec![
            line(1, 10, 250, 2, 5), // 5.00
            line(1, 11, 100, 3, 5), // 3.00
        ];

        let groups = group_by_store(&lines);
        assert_eq!(groups[0].subtotal, money(800, 2));
    }

    #[test]
    fn test_grand_total_sums_groups_and_fees() {
        let lines = vec![
            line(1, 10, 1000, 1, 5), // store 1: 10.00
            line(2, 11, 2000, 1, 5), // store 2: 20.00
        ];
        let groups = group_by_store(&lines);
        let fee = money(500, 2);

        // 10 + 5 + 20 + 5
        assert_eq!(grand_total(&groups, fee, None), money(4000, 2));
    }

    #[test]
    fn test_platform_voucher_discounts_every_store() {
        let lines = vec![line(1, 10, 1000, 1, 5), line(2, 11, 2000, 1, 5)];
        let groups = group_by_store(&lines);
        let v = voucher(None, 10);

        // (9 + 0) + (18 + 0) with zero fee
        assert_eq!(
            grand_total(&groups, Money::ZERO, Some(&v)),
            money(2700, 2)
        );
    }

    #[test]
    fn test_store_voucher_discounts_only_its_store() {
        let lines = vec![line(1, 10, 1000, 1, 5), line(2, 11, 2000, 1, 5)];
        let groups = group_by_store(&lines);
        let v = voucher(Some(1), 50);

        // store 1: 5.00, store 2: 20.00
        assert_eq!(
            grand_total(&groups, Money::ZERO, Some(&v)),
            money(2500, 2)
        );
    }

    #[test]
    fn test_fee_is_never_discounted() {
        let lines = vec![line(1, 10, 1000, 1, 5)];
        let groups = group_by_store(&lines);
        let v = voucher(None, 100);
        let fee = money(500, 2);

        assert_eq!(grand_total(&groups, fee, Some(&v)), fee);
    }

    #[test]
    fn test_check_stock_accepts_exact_fit() {
        let lines = vec![line(1, 10, 100, 5, 5)];
        assert!(check_stock(&lines).is_ok());
    }

    #[test]
    fn test_check_stock_rejects_shortfall() {
        let lines = vec![line(1, 10, 100, 6, 5)];
        let err = check_stock(&lines).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock {
                requested: 6,
                available: 5,
                ..
            }
        ));
    }

    #[test]
    fn test_shipping_fee_by_method() {
        assert_eq!(shipping_fee("standard").unwrap(), money(500, 2));
        assert_eq!(shipping_fee("express").unwrap(), money(1500, 2));
        assert!(matches!(
            shipping_fee("carrier-pigeon"),
            Err(CheckoutError::UnknownShippingMethod(_))
        ));
    }
}

//! Cart domain types.

use serde::Serialize;
use sqlx::FromRow;

use clementine_core::{CartId, Money, ProductId, StoreId, UserId, VariantId};

/// A user's cart. Created lazily on first add; one per user.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
}

/// A cart line joined with its variant, product, and store.
///
/// This is the shape checkout consumes: everything needed to group lines by
/// store and snapshot names/prices into order items.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
    pub variant_id: VariantId,
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub product_name: String,
    pub variant_name: String,
    pub unit_price: Money,
    pub quantity: i32,
    pub stock: i32,
}

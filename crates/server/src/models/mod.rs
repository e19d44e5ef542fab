//! Domain types returned by repositories and serialized in responses.
//!
//! These are validated domain objects, mapped from database rows via
//! `sqlx::FromRow`. Password hashes and refresh tokens never appear on
//! any serializable type here.

pub mod cart;
pub mod chat;
pub mod discount;
pub mod notification;
pub mod order;
pub mod product;
pub mod store;
pub mod user;

pub use cart::{Cart, CartLine};
pub use chat::{ChatMessage, Conversation};
pub use discount::Discount;
pub use notification::Notification;
pub use order::{Order, OrderItem, OrderLog, Payment, Shipping};
pub use product::{Category, Product, ProductImage, ProductVariant};
pub use store::{Store, StoreMember};
pub use user::{StaffAccount, User};

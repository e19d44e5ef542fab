//! HTTP route handlers for the marketplace API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (verifies database)
//!
//! # Users
//! POST  /users/register        - Register a buyer account
//! POST  /users/login           - Login (sets refresh cookie)
//! POST  /users/logout          - Logout (clears refresh cookie)
//! GET   /users/me              - Current profile
//! PATCH /users/me              - Update profile
//!
//! # Token refresh (all roles, via httpOnly cookie)
//! POST /refresh                - Exchange refresh cookie for access token
//!
//! # Stores
//! POST   /store                - Create store (caller becomes owner)
//! GET    /store/mine           - Stores the caller belongs to
//! GET    /store/{id}           - Store detail
//! PATCH  /store/{id}           - Update (owner)
//! DELETE /store/{id}           - Delete (owner)
//! GET    /store/{id}/orders    - Store's orders (owner)
//!
//! # Catalog
//! GET    /products             - Public listing (filters: category_id, store_id, q)
//! GET    /products/{id}        - Product detail with variants and images
//! POST   /products             - Create (store owner)
//! PATCH  /products/{id}        - Update (owner)
//! DELETE /products/{id}        - Delete (owner)
//! POST   /products/{id}/variants              - Add variant (owner)
//! PATCH  /products/{id}/variants/{variant_id} - Update variant (owner)
//! DELETE /products/{id}/variants/{variant_id} - Delete variant (owner)
//! POST   /products/{id}/images                - Attach image (owner)
//! DELETE /products/{id}/images/{image_id}     - Delete image (owner)
//! GET    /categories           - Public category list
//! POST   /categories           - Create (admin)
//! PATCH  /categories/{id}      - Rename (admin)
//! DELETE /categories/{id}      - Delete (admin)
//!
//! # Cart
//! GET    /cart                      - Cart lines
//! POST   /cart/items                - Add item (quantity accumulates)
//! PATCH  /cart/items/{variant_id}   - Set quantity
//! DELETE /cart/items/{variant_id}   - Remove item
//! DELETE /cart                      - Clear cart
//!
//! # Orders & checkout
//! POST  /orders/checkout            - Multi-store checkout
//! GET   /orders                     - Buyer's orders
//! GET   /orders/{id}                - Order detail (buyer or store owner)
//! GET   /orders/{id}/logs           - Status history
//! PATCH /orders/{id}/shipping       - Change method (pre-handoff only)
//!
//! # Payments
//! POST /payments/webhook            - Provider webhook (signature-gated)
//! GET  /payments/{id}               - Payment detail (payer only)
//!
//! # Vouchers
//! GET    /vouchers/check/{code}     - Public validity check
//! GET    /vouchers?store_id=        - Store's vouchers (owner)
//! POST   /vouchers                  - Create store voucher (owner)
//! DELETE /vouchers/{id}             - Delete (owner)
//!
//! # Wishlist
//! GET    /wishlist                  - Wishlisted products
//! POST   /wishlist                  - Add product
//! DELETE /wishlist/{product_id}     - Remove product
//!
//! # Notifications
//! GET  /notifications               - Inbox, newest first
//! POST /notifications/{id}/read     - Mark read
//!
//! # Chat
//! GET  /chat                        - Buyer's conversations
//! POST /chat                        - Open conversation with a store
//! GET  /chat/store/{store_id}       - Store's conversations (owner)
//! GET  /chat/{id}/messages          - Messages (participant only)
//! POST /chat/{id}/messages          - Send message (participant only)
//!
//! # Staff
//! POST /admin/login  /admin/logout      - Admin session
//! GET  /admin/users                     - List users (admin)
//! POST /admin/vouchers                  - Platform-wide voucher (admin)
//! POST /shipper/login  /shipper/logout  - Shipper session
//! GET  /shipper/orders                  - Orders awaiting pickup
//! POST /shipper/orders/{id}/pickup      - Start delivery
//! POST /shipper/orders/{id}/delivered   - Confirm delivery
//! POST /storage/login  /storage/logout  - Storage session
//! GET  /storage/orders                  - Paid orders awaiting intake
//! POST /storage/orders/{id}/received    - Storage handoff (freezes method)
//! ```

pub mod admin;
pub mod cart;
pub mod categories;
pub mod chat;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod products;
pub mod refresh;
pub mod shipper;
pub mod storage;
pub mod stores;
pub mod users;
pub mod vouchers;
pub mod wishlist;

use axum::Router;

use crate::state::AppState;

/// Name of the httpOnly refresh token cookie.
pub const REFRESH_COOKIE: &str = "refresh_token";

/// Compose every resource router under its path prefix.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/users", users::router())
        .nest("/refresh", refresh::router())
        .nest("/store", stores::router())
        .nest("/products", products::router())
        .nest("/categories", categories::router())
        .nest("/cart", cart::router())
        .nest("/orders", orders::router())
        .nest("/payments", payments::router())
        .nest("/vouchers", vouchers::router())
        .nest("/wishlist", wishlist::router())
        .nest("/notifications", notifications::router())
        .nest("/chat", chat::router())
        .nest("/admin", admin::router())
        .nest("/shipper", shipper::router())
        .nest("/storage", storage::router())
}

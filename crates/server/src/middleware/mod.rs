//! Request middleware and extractors.

pub mod auth;

pub use auth::{CurrentStaff, CurrentUser, RequireAdmin, RequireShipper, RequireStorage, RequireUser};

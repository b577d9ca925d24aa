//! Data models
//!
//! Shared between pos-server and the frontend (via API, camelCase JSON).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are UUID strings, all timestamps Unix millis.

pub mod auth;
pub mod category;
pub mod customer;
pub mod order;
pub mod product;
pub mod report;
pub mod user;

// Re-exports
pub use auth::*;
pub use category::*;
pub use customer::*;
pub use order::*;
pub use product::*;
pub use report::*;
pub use user::*;

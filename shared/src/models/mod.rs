//! Data models
//!
//! Shared between the engine and its embedders.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY, snowflake-generated).

pub mod catalog;
pub mod loyalty;
pub mod money;
pub mod reservation;

// Re-exports
pub use catalog::*;
pub use loyalty::*;
pub use money::*;
pub use reservation::*;

//! SQLite backend for the checkout engine.
//!
//! Migrations live in `migrations/` next to this module and are applied with `sqlx::migrate!`.
mod sqlite_impl;

pub mod db;
pub use sqlite_impl::SqliteDatabase;

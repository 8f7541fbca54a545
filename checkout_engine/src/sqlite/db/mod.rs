//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interaction are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool,
//! or create an atomic transaction as the need arises and call through to the functions without any other changes.
//!
//! Composite parts of an order (delivery, payment method and histories, product snapshots) are stored as JSON text
//! columns. Decoding failures are reported with the column and record they came from.
use std::env;

use log::info;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{sqlite::SqlitePoolOptions, Error as SqlxError, SqlitePool};

use crate::traits::CheckoutDatabaseError;

pub mod catalog;
pub mod orders;
pub mod payments;

const SQLITE_DB_URL: &str = "sqlite://data/checkout.db";

pub fn db_url() -> String {
    let result = env::var("CHECKOUT_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ CHECKOUT_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect(url).await?;
    Ok(pool)
}

pub(crate) fn to_json<T: Serialize>(column: &'static str, id: i64, value: &T) -> Result<String, CheckoutDatabaseError> {
    serde_json::to_string(value).map_err(|e| CheckoutDatabaseError::ColumnDecodeError {
        column,
        id,
        message: e.to_string(),
    })
}

pub(crate) fn from_json<T: DeserializeOwned>(
    column: &'static str,
    id: i64,
    value: &str,
) -> Result<T, CheckoutDatabaseError> {
    serde_json::from_str(value).map_err(|e| CheckoutDatabaseError::ColumnDecodeError {
        column,
        id,
        message: e.to_string(),
    })
}

pub(crate) fn decode_error<E: ToString>(column: &'static str, id: i64) -> impl FnOnce(E) -> CheckoutDatabaseError {
    move |e| CheckoutDatabaseError::ColumnDecodeError { column, id, message: e.to_string() }
}

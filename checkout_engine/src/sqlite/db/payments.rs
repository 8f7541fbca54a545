use checkout_common::Cents;
use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{FromRow, SqliteConnection};

use super::decode_error;
use crate::{
    db_types::{OrderId, Payment, PaymentStatus, Price},
    traits::CheckoutDatabaseError,
};

#[derive(Debug, FromRow)]
struct PaymentRow {
    id: i64,
    transaction_id: String,
    order_id: i64,
    provider: String,
    amount: Cents,
    currency: String,
    status: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = CheckoutDatabaseError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let status = PaymentStatus::try_from(row.status).map_err(decode_error("status", row.id))?;
        Ok(Payment {
            id: row.id,
            transaction_id: row.transaction_id,
            order_id: row.order_id,
            provider: row.provider,
            price: Price::new(row.amount, row.currency),
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const PAYMENT_COLUMNS: &str =
    "SELECT id, transaction_id, order_id, provider, amount, currency, status, created_at, updated_at FROM payments";

pub async fn next_payment_id(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let id = sqlx::query_scalar("INSERT INTO payment_sequence DEFAULT VALUES RETURNING id").fetch_one(conn).await?;
    Ok(id)
}

/// Stores a new payment attempt. Fails if the transaction id is already taken.
pub async fn insert_payment(payment: &Payment, conn: &mut SqliteConnection) -> Result<(), CheckoutDatabaseError> {
    sqlx::query(
        r#"
            INSERT INTO payments (
                id,
                transaction_id,
                order_id,
                provider,
                amount,
                currency,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9);
        "#,
    )
    .bind(payment.id)
    .bind(&payment.transaction_id)
    .bind(payment.order_id)
    .bind(&payment.provider)
    .bind(payment.price.amount)
    .bind(&payment.price.currency)
    .bind(i64::from(payment.status))
    .bind(payment.created_at)
    .bind(payment.updated_at)
    .execute(conn)
    .await?;
    debug!("🗃️ Payment {} for order #{} inserted", payment.transaction_id, payment.order_id);
    Ok(())
}

pub async fn fetch_payment(
    transaction_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, CheckoutDatabaseError> {
    let row: Option<PaymentRow> = sqlx::query_as(&format!("{PAYMENT_COLUMNS} WHERE transaction_id = $1"))
        .bind(transaction_id)
        .fetch_optional(conn)
        .await?;
    row.map(Payment::try_from).transpose()
}

/// Returns every payment attempt for the order, oldest first.
pub async fn fetch_payments_for_order(
    order_id: OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Payment>, CheckoutDatabaseError> {
    let rows: Vec<PaymentRow> = sqlx::query_as(&format!("{PAYMENT_COLUMNS} WHERE order_id = $1 ORDER BY id ASC"))
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    trace!("🗃️ {} payments found for order #{order_id}", rows.len());
    rows.into_iter().map(Payment::try_from).collect()
}

/// Writes the provider tag and status of an existing payment.
pub async fn update_payment(payment: &Payment, conn: &mut SqliteConnection) -> Result<(), CheckoutDatabaseError> {
    let result = sqlx::query(
        "UPDATE payments SET provider = $1, status = $2, updated_at = $3 WHERE transaction_id = $4",
    )
    .bind(&payment.provider)
    .bind(i64::from(payment.status))
    .bind(payment.updated_at)
    .bind(&payment.transaction_id)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(CheckoutDatabaseError::PaymentNotFound(payment.transaction_id.clone()));
    }
    trace!("🗃️ Payment {} is now {} ({})", payment.transaction_id, payment.status, payment.provider);
    Ok(())
}

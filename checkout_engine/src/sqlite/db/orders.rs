use checkout_common::Cents;
use chrono::{DateTime, Utc};
use log::{debug, trace};
use sqlx::{FromRow, SqliteConnection};

use super::{decode_error, from_json, to_json};
use crate::{
    db_types::{Customer, Order, OrderId, OrderItem, Price, ProductSnapshot},
    traits::CheckoutDatabaseError,
};

#[derive(Debug, FromRow)]
struct OrderRow {
    id: i64,
    created_at: DateTime<Utc>,
    comment: String,
    do_not_call: bool,
    total_cost: Cents,
    currency: String,
    customer_name: String,
    customer_phone: String,
    delivery: String,
    payment: String,
}

#[derive(Debug, FromRow)]
struct OrderItemRow {
    quantity: i64,
    price: Cents,
    currency: String,
    product: String,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, CheckoutDatabaseError> {
        let id = self.id;
        Ok(Order {
            id,
            created_at: self.created_at,
            comment: self.comment,
            do_not_call: self.do_not_call,
            total_cost: Price::new(self.total_cost, self.currency),
            customer: Customer { name: self.customer_name, phone: self.customer_phone },
            delivery: from_json("delivery", id, &self.delivery)?,
            payment: from_json("payment", id, &self.payment)?,
            items,
        })
    }
}

impl OrderItemRow {
    fn into_item(self, order_id: OrderId) -> Result<OrderItem, CheckoutDatabaseError> {
        let quantity = u32::try_from(self.quantity).map_err(decode_error("quantity", order_id))?;
        let product: ProductSnapshot = from_json("product", order_id, &self.product)?;
        Ok(OrderItem { quantity, price: Price::new(self.price, self.currency), product })
    }
}

/// Allocates the next order id. Ids are never reused, even if the order that claimed one is never written.
pub async fn next_order_id(conn: &mut SqliteConnection) -> Result<OrderId, sqlx::Error> {
    let id = sqlx::query_scalar("INSERT INTO order_sequence DEFAULT VALUES RETURNING id").fetch_one(conn).await?;
    Ok(id)
}

/// Inserts the order and its line items using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: &Order, conn: &mut SqliteConnection) -> Result<(), CheckoutDatabaseError> {
    let delivery = to_json("delivery", order.id, &order.delivery)?;
    let payment = to_json("payment", order.id, &order.payment)?;
    sqlx::query(
        r#"
            INSERT INTO orders (
                id,
                created_at,
                comment,
                do_not_call,
                total_cost,
                currency,
                customer_name,
                customer_phone,
                delivery,
                payment,
                delivery_status,
                payment_status
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12);
        "#,
    )
    .bind(order.id)
    .bind(order.created_at)
    .bind(&order.comment)
    .bind(order.do_not_call)
    .bind(order.total_cost.amount)
    .bind(&order.total_cost.currency)
    .bind(&order.customer.name)
    .bind(&order.customer.phone)
    .bind(delivery)
    .bind(payment)
    .bind(i64::from(order.delivery_status()))
    .bind(i64::from(order.payment_status()))
    .execute(&mut *conn)
    .await?;
    for (position, item) in order.items.iter().enumerate() {
        let product = to_json("product", order.id, &item.product)?;
        sqlx::query(
            r#"
                INSERT INTO order_items (order_id, position, product_id, quantity, price, currency, product)
                VALUES ($1, $2, $3, $4, $5, $6, $7);
            "#,
        )
        .bind(order.id)
        .bind(position as i64)
        .bind(item.product.id)
        .bind(i64::from(item.quantity))
        .bind(item.price.amount)
        .bind(&item.price.currency)
        .bind(product)
        .execute(&mut *conn)
        .await?;
    }
    debug!("🗃️ Order #{} inserted with {} items", order.id, order.items.len());
    Ok(())
}

pub async fn fetch_order(id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, CheckoutDatabaseError> {
    let row: Option<OrderRow> = sqlx::query_as(
        r#"
            SELECT id, created_at, comment, do_not_call, total_cost, currency, customer_name, customer_phone,
                   delivery, payment
            FROM orders WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    let Some(row) = row else {
        trace!("🗃️ Order #{id} not found");
        return Ok(None);
    };
    let items = fetch_order_items(id, conn).await?;
    row.into_order(items).map(Some)
}

async fn fetch_order_items(
    order_id: OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<OrderItem>, CheckoutDatabaseError> {
    let rows: Vec<OrderItemRow> = sqlx::query_as(
        "SELECT quantity, price, currency, product FROM order_items WHERE order_id = $1 ORDER BY position ASC",
    )
    .bind(order_id)
    .fetch_all(conn)
    .await?;
    rows.into_iter().map(|r| r.into_item(order_id)).collect()
}

/// Writes the mutable parts of the order: comment, contact details, and the delivery and payment records with their
/// status histories. Line items and the total cost are fixed at creation and are left alone.
pub async fn update_order(order: &Order, conn: &mut SqliteConnection) -> Result<(), CheckoutDatabaseError> {
    let delivery = to_json("delivery", order.id, &order.delivery)?;
    let payment = to_json("payment", order.id, &order.payment)?;
    let result = sqlx::query(
        r#"
            UPDATE orders SET
                updated_at = CURRENT_TIMESTAMP,
                comment = $1,
                do_not_call = $2,
                customer_name = $3,
                customer_phone = $4,
                delivery = $5,
                payment = $6,
                delivery_status = $7,
                payment_status = $8
            WHERE id = $9
        "#,
    )
    .bind(&order.comment)
    .bind(order.do_not_call)
    .bind(&order.customer.name)
    .bind(&order.customer.phone)
    .bind(delivery)
    .bind(payment)
    .bind(i64::from(order.delivery_status()))
    .bind(i64::from(order.payment_status()))
    .bind(order.id)
    .execute(conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(CheckoutDatabaseError::OrderNotFound(order.id));
    }
    trace!("🗃️ Order #{} updated. Payment status is {}", order.id, order.payment_status());
    Ok(())
}

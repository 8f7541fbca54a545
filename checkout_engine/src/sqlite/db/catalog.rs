use std::collections::HashMap;

use checkout_common::Cents;
use log::{debug, trace};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};

use super::decode_error;
use crate::{
    db_types::{DeliveryMethod, PaymentMethod, Price, ProductSnapshot},
    traits::CheckoutDatabaseError,
};

#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    slug: String,
    price: Cents,
    currency: String,
    sale_price: Option<Cents>,
    sale_min_quantity: Option<i64>,
}

impl TryFrom<ProductRow> for ProductSnapshot {
    type Error = CheckoutDatabaseError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let mut price = Price::new(row.price, row.currency);
        if let (Some(amount), Some(min_quantity)) = (row.sale_price, row.sale_min_quantity) {
            let min_quantity = u32::try_from(min_quantity).map_err(decode_error("sale_min_quantity", row.id))?;
            price = price.with_sale(amount, min_quantity);
        }
        Ok(ProductSnapshot { id: row.id, name: row.name, slug: row.slug, price })
    }
}

/// Fetches the products with the given ids. The result follows the order of `ids`, a product requested twice appears
/// twice, and unknown ids are left out, so callers can detect missing products by comparing lengths.
pub async fn fetch_products_preserving_order(
    ids: &[i64],
    conn: &mut SqliteConnection,
) -> Result<Vec<ProductSnapshot>, CheckoutDatabaseError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::<Sqlite>::new(
        "SELECT id, name, slug, price, currency, sale_price, sale_min_quantity FROM products WHERE id IN (",
    );
    let mut in_clause = builder.separated(", ");
    for id in ids {
        in_clause.push_bind(*id);
    }
    builder.push(")");
    trace!("🗃️ Executing query: {}", builder.sql());
    let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(conn).await?;
    let products = rows
        .into_iter()
        .map(|row| ProductSnapshot::try_from(row).map(|p| (p.id, p)))
        .collect::<Result<HashMap<_, _>, _>>()?;
    Ok(ids.iter().filter_map(|id| products.get(id).cloned()).collect())
}

/// Returns the delivery method with the given slug, if it exists and is enabled.
pub async fn fetch_delivery_method_by_slug(
    slug: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<DeliveryMethod>, sqlx::Error> {
    let row: Option<(i64, String, String)> =
        sqlx::query_as("SELECT id, name, slug FROM delivery_methods WHERE slug = $1 AND enabled = 1")
            .bind(slug)
            .fetch_optional(conn)
            .await?;
    Ok(row.map(|(id, name, slug)| DeliveryMethod { id, name, slug }))
}

/// Returns the payment method with the given slug, if it exists and is enabled.
pub async fn fetch_payment_method_by_slug(
    slug: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentMethod>, sqlx::Error> {
    let row: Option<(i64, String, String)> =
        sqlx::query_as("SELECT id, name, slug FROM payment_methods WHERE slug = $1 AND enabled = 1")
            .bind(slug)
            .fetch_optional(conn)
            .await?;
    Ok(row.map(|(id, name, slug)| PaymentMethod { id, name, slug }))
}

/// Adds a product to the catalog and returns its id.
pub async fn insert_product(
    name: &str,
    slug: &str,
    price: &Price,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    let id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO products (name, slug, price, currency, sale_price, sale_min_quantity)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id;
        "#,
    )
    .bind(name)
    .bind(slug)
    .bind(price.amount)
    .bind(&price.currency)
    .bind(price.sale.as_ref().map(|s| s.amount))
    .bind(price.sale.as_ref().map(|s| i64::from(s.min_quantity)))
    .fetch_one(conn)
    .await?;
    debug!("🗃️ Product '{slug}' added to the catalog with id {id} at {price}");
    Ok(id)
}

pub async fn insert_delivery_method(
    name: &str,
    slug: &str,
    enabled: bool,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    let id: i64 = sqlx::query_scalar("INSERT INTO delivery_methods (name, slug, enabled) VALUES ($1, $2, $3) RETURNING id")
        .bind(name)
        .bind(slug)
        .bind(enabled)
        .fetch_one(conn)
        .await?;
    debug!("🗃️ Delivery method '{slug}' added with id {id}");
    Ok(id)
}

pub async fn insert_payment_method(
    name: &str,
    slug: &str,
    enabled: bool,
    conn: &mut SqliteConnection,
) -> Result<i64, sqlx::Error> {
    let id: i64 = sqlx::query_scalar("INSERT INTO payment_methods (name, slug, enabled) VALUES ($1, $2, $3) RETURNING id")
        .bind(name)
        .bind(slug)
        .bind(enabled)
        .fetch_one(conn)
        .await?;
    debug!("🗃️ Payment method '{slug}' added with id {id}");
    Ok(id)
}

use thiserror::Error;

use crate::db_types::{DeliveryMethod, NewOrder, Order, OrderId, Payment, PaymentMethod, ProductSnapshot};

#[derive(Debug, Clone, Error)]
pub enum CheckoutDatabaseError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Could not decode the {column} column of record {id}: {message}")]
    ColumnDecodeError { column: &'static str, id: i64, message: String },
    #[error("Order #{0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Payment with transaction id {0} does not exist")]
    PaymentNotFound(String),
}

impl From<sqlx::Error> for CheckoutDatabaseError {
    fn from(e: sqlx::Error) -> Self {
        CheckoutDatabaseError::DatabaseError(e.to_string())
    }
}

#[allow(async_fn_in_trait)]
pub trait OrderRepository {
    /// Reserves the next order id.
    async fn next_order_id(&self) -> Result<OrderId, CheckoutDatabaseError>;

    /// Allocates an id for the order and stores it, together with all its line items, as a single unit. Both status
    /// histories are seeded with one `New` entry dated at the order's creation time.
    async fn create_order(&self, order: NewOrder) -> Result<Order, CheckoutDatabaseError>;

    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, CheckoutDatabaseError>;

    /// Persists the mutable parts of an existing order (status histories, comment, flags). Line items and the total
    /// cost are immutable and are not written.
    async fn save_order(&self, order: &Order) -> Result<(), CheckoutDatabaseError>;
}

#[allow(async_fn_in_trait)]
pub trait PaymentRepository {
    /// Reserves the next payment id.
    async fn next_payment_id(&self) -> Result<i64, CheckoutDatabaseError>;

    async fn insert_payment(&self, payment: &Payment) -> Result<(), CheckoutDatabaseError>;

    async fn fetch_payment(&self, transaction_id: &str) -> Result<Option<Payment>, CheckoutDatabaseError>;

    /// All payment attempts for the order, oldest first.
    async fn fetch_payments_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>, CheckoutDatabaseError>;

    /// Updates the provider tag and status of an existing payment.
    async fn save_payment(&self, payment: &Payment) -> Result<(), CheckoutDatabaseError>;
}

#[allow(async_fn_in_trait)]
pub trait ProductCatalog {
    /// Fetches the products with the given ids. The result follows the order of `ids`, not the catalog's order.
    /// Unknown ids are left out, so callers can detect misses by comparing lengths.
    async fn fetch_products_preserving_order(&self, ids: &[i64]) -> Result<Vec<ProductSnapshot>, CheckoutDatabaseError>;
}

#[allow(async_fn_in_trait)]
pub trait DeliveryCatalog {
    /// Returns the delivery method with the given slug, if it exists and is enabled.
    async fn fetch_delivery_method_by_slug(&self, slug: &str) -> Result<Option<DeliveryMethod>, CheckoutDatabaseError>;

    /// Returns the payment method with the given slug, if it exists and is enabled.
    async fn fetch_payment_method_by_slug(&self, slug: &str) -> Result<Option<PaymentMethod>, CheckoutDatabaseError>;
}

/// The full set of storage behaviour the checkout needs.
pub trait CheckoutDatabase: Clone + OrderRepository + PaymentRepository + ProductCatalog + DeliveryCatalog {
    /// The URL of the database
    fn url(&self) -> &str;
}

//! `SqliteDatabase` is a concrete implementation of a checkout engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::{
    migrate::{MigrateDatabase, MigrateError},
    Sqlite,
    SqlitePool,
};

use super::db::{catalog, db_url, new_pool, orders, payments};
use crate::{
    db_types::{DeliveryMethod, NewOrder, Order, OrderId, Payment, PaymentMethod, ProductSnapshot},
    traits::{
        CheckoutDatabase,
        CheckoutDatabaseError,
        DeliveryCatalog,
        OrderRepository,
        PaymentRepository,
        ProductCatalog,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl CheckoutDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }
}

impl OrderRepository for SqliteDatabase {
    async fn next_order_id(&self) -> Result<OrderId, CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let id = orders::next_order_id(&mut conn).await?;
        Ok(id)
    }

    /// Allocates the id and writes the order with all of its line items in a single transaction.
    async fn create_order(&self, order: NewOrder) -> Result<Order, CheckoutDatabaseError> {
        let mut tx = self.pool.begin().await?;
        let id = orders::next_order_id(&mut tx).await?;
        let order = Order::from_new_order(id, order);
        orders::insert_order(&order, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{id} has been saved in the DB");
        Ok(order)
    }

    async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order(id, &mut conn).await
    }

    async fn save_order(&self, order: &Order) -> Result<(), CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_order(order, &mut conn).await
    }
}

impl PaymentRepository for SqliteDatabase {
    async fn next_payment_id(&self) -> Result<i64, CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let id = payments::next_payment_id(&mut conn).await?;
        Ok(id)
    }

    async fn insert_payment(&self, payment: &Payment) -> Result<(), CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        payments::insert_payment(payment, &mut conn).await
    }

    async fn fetch_payment(&self, transaction_id: &str) -> Result<Option<Payment>, CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payment(transaction_id, &mut conn).await
    }

    async fn fetch_payments_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>, CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payments_for_order(order_id, &mut conn).await
    }

    async fn save_payment(&self, payment: &Payment) -> Result<(), CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        payments::update_payment(payment, &mut conn).await
    }
}

impl ProductCatalog for SqliteDatabase {
    async fn fetch_products_preserving_order(&self, ids: &[i64]) -> Result<Vec<ProductSnapshot>, CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        catalog::fetch_products_preserving_order(ids, &mut conn).await
    }
}

impl DeliveryCatalog for SqliteDatabase {
    async fn fetch_delivery_method_by_slug(&self, slug: &str) -> Result<Option<DeliveryMethod>, CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let method = catalog::fetch_delivery_method_by_slug(slug, &mut conn).await?;
        Ok(method)
    }

    async fn fetch_payment_method_by_slug(&self, slug: &str) -> Result<Option<PaymentMethod>, CheckoutDatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let method = catalog::fetch_payment_method_by_slug(slug, &mut conn).await?;
        Ok(method)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, connecting to the database given by `CHECKOUT_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Opens the database at `url`, creating the file if it does not exist yet, and brings its schema up to date.
    pub async fn open_and_migrate(url: &str, max_connections: u32) -> Result<Self, MigrateError> {
        if !Sqlite::database_exists(url).await? {
            info!("🗃️ Creating new database at {url}");
            Sqlite::create_database(url).await?;
        }
        let db = Self::new_with_url(url, max_connections).await?;
        db.migrate().await?;
        Ok(db)
    }

    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        debug!("🗃️ Migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

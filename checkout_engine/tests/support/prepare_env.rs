use checkout_common::Cents;
use checkout_engine::{
    db_types::Price,
    events::EventProducers,
    sqlite::db::catalog,
    traits::CheckoutDatabase,
    CheckoutApi,
    PaymentContext,
    SqliteDatabase,
};
use log::*;
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};

use super::fakes::{FakeCardHold, FakePartsPay};

pub type TestApi = CheckoutApi<SqliteDatabase, FakeCardHold, FakePartsPay>;

pub async fn prepare_test_env(url: &str) {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    debug!("🚀️ Logging initialised");
    create_database(url).await;
    run_migrations(url).await;
}

pub fn random_db_path() -> String {
    let path = std::env::temp_dir().join(format!("checkout_test_{}.db", rand::random::<u64>()));
    format!("sqlite://{}", path.display())
}

pub async fn run_migrations(url: &str) {
    let db = SqliteDatabase::new_with_url(url, 1).await.expect("Error creating connection to database");
    migrate!("./src/sqlite/migrations").run(db.pool()).await.expect("Error running DB migrations");
    db.close().await;
    info!("🚀️ Migrations complete");
}

pub async fn create_database(url: &str) {
    if let Err(e) = Sqlite::drop_database(url).await {
        trace!("Could not drop database {url}: {e:?}");
    }
    Sqlite::create_database(url).await.expect("Error creating database");
    info!("Created Sqlite database {url}");
}

/// Product ids of the seeded catalog
#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    /// 50.00, or 45.00 each when buying two or more
    pub phone: i64,
    /// 25.00
    pub case: i64,
}

pub async fn seed_catalog(db: &SqliteDatabase) -> Catalog {
    let mut conn = db.pool().acquire().await.expect("Error acquiring connection");
    let delivery_methods = [("Courier", "courier", true), ("Post office", "post", true), ("Pigeon", "pigeon", false)];
    for (name, slug, enabled) in delivery_methods {
        catalog::insert_delivery_method(name, slug, enabled, &mut conn).await.expect("Error adding delivery method");
    }
    let payment_methods = [
        ("Cash", "cash", true),
        ("Card payment", "p2p", true),
        ("Installments", "parts_pay", true),
        ("Card transfer", "to_card", true),
        ("Cash on delivery", "cod", true),
        ("Invoice", "pay-in", true),
        ("Crypto", "crypto", false),
    ];
    for (name, slug, enabled) in payment_methods {
        catalog::insert_payment_method(name, slug, enabled, &mut conn).await.expect("Error adding payment method");
    }
    let phone_price = Price::from_cents(5_000).with_sale(Cents::from(4_500), 2);
    let phone = catalog::insert_product("Phone", "phone", &phone_price, &mut conn).await.expect("Error adding product");
    let case = catalog::insert_product("Case", "case", &Price::from_cents(2_500), &mut conn)
        .await
        .expect("Error adding product");
    Catalog { phone, case }
}

/// A migrated, seeded database and an API over it with fake provider gateways.
pub async fn setup_with(producers: EventProducers) -> (TestApi, Catalog, FakeCardHold, FakePartsPay) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    let catalog = seed_catalog(&db).await;
    let card_hold = FakeCardHold::default();
    let parts_pay = FakePartsPay::default();
    let context = PaymentContext::new(card_hold.clone(), parts_pay.clone());
    let api = CheckoutApi::new(db, context, producers).with_currency("UAH");
    (api, catalog, card_hold, parts_pay)
}

pub async fn setup() -> (TestApi, Catalog, FakeCardHold, FakePartsPay) {
    setup_with(EventProducers::default()).await
}

pub async fn tear_down(api: TestApi) {
    let url = api.db().url().to_string();
    api.db().close().await;
    if let Err(e) = Sqlite::drop_database(&url).await {
        warn!("🚀️ Failed to drop test database {url}: {e}");
    }
}

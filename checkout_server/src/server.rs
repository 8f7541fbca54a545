use std::time::Duration;

use actix_web::{
    dev::Server,
    error::JsonPayloadError,
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpRequest,
    HttpServer,
};
use checkout_engine::{events::EventHandlers, CheckoutApi, PaymentContext, SqliteDatabase};
use log::*;
use payment_providers::{CardHoldApi, PartsPayApi};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    notifications::Notifier,
    routes::{
        health,
        AcceptHoldenPaymentRoute,
        CreateOrderRoute,
        InitPaymentRoute,
        OrderInfoRoute,
        ProviderCallbackRoute,
    },
};

pub type LiveCheckoutApi = CheckoutApi<SqliteDatabase, CardHoldApi, PartsPayApi>;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::open_and_migrate(&config.database_url, config.max_db_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let card_hold =
        CardHoldApi::new(config.card_hold.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let parts_pay =
        PartsPayApi::new(config.parts_pay.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let hooks = Notifier::new(config.notifications.clone()).hooks();
    let handlers = EventHandlers::new(config.event_buffer_size, hooks);
    let api = CheckoutApi::new(db, PaymentContext::new(card_hold, parts_pay), handlers.producers())
        .with_currency(&config.currency);
    handlers.start_handlers();
    info!("🚀️ Checkout engine ready. Orders are priced in {}", config.currency);
    let api = web::Data::new(api);
    let srv = create_server_instance(config, api.clone())?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    info!("🚀️ Server stopped. Closing the database");
    api.db().close().await;
    result
}

/// The checkout API is shared by every worker. Its per-order and per-payment locks only serialise requests that see
/// the same instance.
pub fn create_server_instance(config: ServerConfig, api: web::Data<LiveCheckoutApi>) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("checkout::access_log"))
            .app_data(api.clone())
            .app_data(json_config())
            .service(health)
            .service(CreateOrderRoute::<SqliteDatabase, CardHoldApi, PartsPayApi>::new())
            .service(InitPaymentRoute::<SqliteDatabase, CardHoldApi, PartsPayApi>::new())
            .service(AcceptHoldenPaymentRoute::<SqliteDatabase, CardHoldApi, PartsPayApi>::new())
            .service(OrderInfoRoute::<SqliteDatabase, CardHoldApi, PartsPayApi>::new())
            .service(ProviderCallbackRoute::<SqliteDatabase, CardHoldApi, PartsPayApi>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}

/// Malformed JSON bodies get the same `{"error": ...}` response as every other failure.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
        debug!("💻️ Could not deserialize request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}

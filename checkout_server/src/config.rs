use std::env;

use checkout_common::{helpers::parse_env, DEFAULT_CURRENCY_CODE};
use log::*;
use payment_providers::{CardHoldConfig, PartsPayConfig};

const DEFAULT_CHECKOUT_HOST: &str = "127.0.0.1";
const DEFAULT_CHECKOUT_PORT: u16 = 8360;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/checkout.db";
const DEFAULT_EVENT_BUFFER_SIZE: usize = 128;
const DEFAULT_MAX_DB_CONNECTIONS: u32 = 25;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub max_db_connections: u32,
    /// The currency code used for new orders and payments
    pub currency: String,
    /// Capacity of each notification queue. Events are dropped (and logged) when a queue is full.
    pub event_buffer_size: usize,
    pub notifications: NotificationConfig,
    pub card_hold: CardHoldConfig,
    pub parts_pay: PartsPayConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CHECKOUT_HOST.to_string(),
            port: DEFAULT_CHECKOUT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_db_connections: DEFAULT_MAX_DB_CONNECTIONS,
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
            notifications: NotificationConfig::default(),
            card_hold: CardHoldConfig::default(),
            parts_pay: PartsPayConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CHECKOUT_HOST").ok().unwrap_or_else(|| DEFAULT_CHECKOUT_HOST.into());
        let port = env::var("CHECKOUT_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for CHECKOUT_PORT. {e} Using the default, {DEFAULT_CHECKOUT_PORT}, \
                         instead."
                    );
                    DEFAULT_CHECKOUT_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_CHECKOUT_PORT);
        let database_url = env::var("CHECKOUT_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ CHECKOUT_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.into()
        });
        let max_db_connections = parse_env("CHECKOUT_MAX_DB_CONNECTIONS").unwrap_or(DEFAULT_MAX_DB_CONNECTIONS);
        let currency = env::var("CHECKOUT_CURRENCY").ok().unwrap_or_else(|| {
            info!("🪛️ CHECKOUT_CURRENCY is not set. Using {DEFAULT_CURRENCY_CODE}.");
            DEFAULT_CURRENCY_CODE.into()
        });
        let event_buffer_size = configure_event_buffer_size();
        let notifications = NotificationConfig::from_env_or_default(&currency);
        let card_hold = CardHoldConfig::new_from_env_or_default();
        let parts_pay = PartsPayConfig::new_from_env_or_default();
        Self {
            host,
            port,
            database_url,
            max_db_connections,
            currency,
            event_buffer_size,
            notifications,
            card_hold,
            parts_pay,
        }
    }
}

fn configure_event_buffer_size() -> usize {
    env::var("CHECKOUT_EVENT_BUFFER_SIZE")
        .map_err(|_| {
            info!("🪛️ CHECKOUT_EVENT_BUFFER_SIZE is not set. Using the default value of {DEFAULT_EVENT_BUFFER_SIZE}.")
        })
        .and_then(|s| {
            s.parse::<usize>()
                .map_err(|e| warn!("🪛️ Invalid configuration value for CHECKOUT_EVENT_BUFFER_SIZE. {e}"))
                .and_then(|n| match n {
                    0 => {
                        warn!("🪛️ CHECKOUT_EVENT_BUFFER_SIZE must be at least 1.");
                        Err(())
                    },
                    n => Ok(n),
                })
        })
        .ok()
        .unwrap_or(DEFAULT_EVENT_BUFFER_SIZE)
}

//-------------------------------------------------  Notifications  ---------------------------------------------------
/// Settings for the customer-facing messages built in [`crate::notifications`].
#[derive(Clone, Debug, Default)]
pub struct NotificationConfig {
    /// Link to an order page. `{id}` is replaced with the order id.
    pub order_link_mask: String,
    /// Link to a product page. `{id}` is replaced with the product id.
    pub product_link_mask: String,
    /// The card customers transfer money to when they pay with the `to_card` method
    pub card_number: String,
    pub currency: String,
}

impl NotificationConfig {
    pub fn from_env_or_default(currency: &str) -> Self {
        let order_link_mask = env::var("CHECKOUT_ORDER_LINK_MASK").unwrap_or_else(|_| {
            warn!("🪛️ CHECKOUT_ORDER_LINK_MASK is not set. Notifications will not link to orders.");
            String::default()
        });
        let product_link_mask = env::var("CHECKOUT_PRODUCT_LINK_MASK").unwrap_or_default();
        let card_number = env::var("CHECKOUT_CARD_NUMBER").unwrap_or_else(|_| {
            warn!("🪛️ CHECKOUT_CARD_NUMBER is not set. Card transfer instructions will be incomplete.");
            String::default()
        });
        Self { order_link_mask, product_link_mask, card_number, currency: currency.to_string() }
    }
}

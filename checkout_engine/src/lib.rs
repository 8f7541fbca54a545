//! Checkout Engine
//!
//! The checkout engine turns storefront carts into orders and drives their payments through the configured payment
//! providers. It is storage- and provider-agnostic: persistence goes through the repository traits in [`traits`], and
//! remote provider calls go through the gateway traits in the same module.
//!
//! The library is divided into these main sections:
//! 1. The data model ([`db_types`]): orders, payments, prices and the delivery and payment status histories.
//! 2. Persistence. The repository traits in [`traits`] and the stock SQLite implementation, [`SqliteDatabase`].
//! 3. Payment strategies ([`strategies`]) and the [`PaymentContext`] that picks the strategy for a payment method or
//!    provider.
//! 4. The public API ([`CheckoutApi`]), which sequences the checkout operations.
//!
//! The engine also publishes events when orders and payments are created and when payment statuses change. Register
//! hooks with [`events::EventHooks`] to send notifications or otherwise react to them.
//!
//! # Usage
//!
//! ```rust,ignore
//! use checkout_engine::{events::{EventHandlers, EventHooks}, CheckoutApi, PaymentContext, SqliteDatabase};
//! use payment_providers::{CardHoldApi, CardHoldConfig, PartsPayApi, PartsPayConfig};
//!
//! let db = SqliteDatabase::new(25).await?;
//! let card_hold = CardHoldApi::new(CardHoldConfig::new_from_env_or_default())?;
//! let parts_pay = PartsPayApi::new(PartsPayConfig::new_from_env_or_default())?;
//! let handlers = EventHandlers::new(128, EventHooks::default());
//! let api = CheckoutApi::new(db, PaymentContext::new(card_hold, parts_pay), handlers.producers());
//! handlers.start_handlers();
//! let order = api.create_order(form).await?;
//! let next = api.init_payment(order.id).await?;
//! ```
pub mod checkout_api;
pub mod db_types;
pub mod events;
pub mod helpers;
pub mod payment_context;
pub mod strategies;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use checkout_api::{
    forms,
    objects::{CallbackResult, InitPaymentResponse, OrderInfo},
    CheckoutApi,
    CheckoutError,
    ErrorKind,
};
pub use payment_context::{PaymentContext, ResolveError};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;

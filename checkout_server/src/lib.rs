//! # Checkout server
//! This crate hosts the HTTP surface of the checkout engine. It is responsible for:
//! * Accepting carts from the storefront and turning them into orders.
//! * Starting payments and telling the storefront what the customer has to do next.
//! * Receiving status webhooks from the payment providers.
//! * Building the customer and staff notifications for checkout events.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /checkout/create`: Create an order from a checkout form.
//! * `POST /checkout/init-payment`: Start a payment for an order.
//! * `POST /checkout/accept-holden-payment`: Capture a held payment.
//! * `POST /checkout/order-info`: An order and its payment attempts.
//! * `POST /callback/{provider}`: Payment provider webhooks.
pub mod cli;
pub mod config;
pub mod errors;
pub mod notifications;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;

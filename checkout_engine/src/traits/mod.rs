//! # Interface contracts of the checkout engine's collaborators.
//!
//! ## Repositories
//! The orchestrator never talks to a database directly. It goes through four narrow traits:
//!
//! * [`OrderRepository`] allocates order ids, creates orders and persists order changes.
//! * [`PaymentRepository`] stores payment attempts, keyed by their public transaction id.
//! * [`ProductCatalog`] resolves product snapshots for the items in a cart.
//! * [`DeliveryCatalog`] resolves the enabled delivery and payment methods by slug.
//!
//! [`CheckoutDatabase`] bundles all four. [`crate::SqliteDatabase`] is the stock implementation.
//!
//! ## Gateways
//! [`CardHoldGateway`] and [`PartsPayGateway`] abstract the remote calls made by the payment strategies. The clients in
//! `payment_providers` implement them.
mod checkout_database;
mod gateways;

pub use checkout_database::{
    CheckoutDatabase,
    CheckoutDatabaseError,
    DeliveryCatalog,
    OrderRepository,
    PaymentRepository,
    ProductCatalog,
};
pub use gateways::{CardHoldGateway, PartsPayGateway};

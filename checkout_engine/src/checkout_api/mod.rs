//! The public checkout API.
//!
//! [`CheckoutApi`] is the orchestrator: it validates carts, creates orders, starts payments through the strategy that
//! matches the order's payment method, and applies provider responses and callbacks to the stored payment and order.
pub mod checkout_flow_api;
pub mod errors;
pub mod forms;
pub mod objects;

pub use checkout_flow_api::CheckoutApi;
pub use errors::{CheckoutError, ErrorKind};

//! Payment strategies.
//!
//! Each payment integration implements some of three capabilities:
//!
//! * [`InitiatePayment`]: start a payment and tell the customer what to do next.
//! * [`AcceptHold`]: capture funds that the provider is holding, on the merchant's request.
//! * [`CallbackStrategy`]: verify and interpret the provider's asynchronous webhooks.
//!
//! Strategies only talk to the provider. They never touch the database; the orchestrator persists whatever they
//! report.
use std::collections::HashMap;

use payment_providers::ProviderApiError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::db_types::{InitAction, Order, Payment, PaymentStatus};

mod card_hold;
mod default;
mod parts_pay;

pub use card_hold::{CardHoldCallback, CardHoldStrategy};
pub use default::DefaultStrategy;
pub use parts_pay::PartsPayStrategy;

/// Provider tags are recorded on a payment once it has been initiated, and route later accept and callback calls.
pub mod provider_tag {
    pub const NONE: &str = "none";
    pub const CARD_HOLD: &str = "liqpay";
    pub const PARTS_PAY: &str = "privat_parts_pay";
}

#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("The provider request failed. {0}")]
    Provider(#[from] ProviderApiError),
    #[error("{provider} reported a status we do not handle: '{status}'")]
    UnmappedStatus { provider: &'static str, status: String },
    #[error("{provider} sent a callback for an action we do not handle: '{action}'")]
    UnsupportedAction { provider: &'static str, action: String },
    #[error("Malformed callback. {0}")]
    MalformedCallback(String),
    #[error("Cannot use this payment method. {0}")]
    InvalidPayment(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitResult {
    pub action: InitAction,
    /// The form markup or the URL, depending on `action`
    pub resource: String,
    pub provider: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    pub status: PaymentStatus,
    pub description: String,
    /// Whatever the provider sent us, for the logs
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallbackOutcome {
    /// Persist the new status
    Apply(StatusUpdate),
    /// The provider reported an intermediate state. Nothing must be persisted.
    Skip { state: String, raw: Value },
}

/// The raw webhook request, as received.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub content_type: String,
    pub body: Vec<u8>,
}

impl CallbackParams {
    pub fn new<S: Into<String>>(content_type: S, body: Vec<u8>) -> Self {
        Self { content_type: content_type.into(), body }
    }

    pub fn is_json(&self) -> bool {
        self.content_type.contains("json")
    }

    /// Decodes an `application/x-www-form-urlencoded` body.
    pub fn form_fields(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(&self.body).into_owned().collect()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, StrategyError> {
        serde_json::from_slice(&self.body).map_err(|e| StrategyError::MalformedCallback(e.to_string()))
    }
}

#[allow(async_fn_in_trait)]
pub trait InitiatePayment {
    async fn initiate(&self, order: &Order, payment: &Payment) -> Result<InitResult, StrategyError>;
}

#[allow(async_fn_in_trait)]
pub trait AcceptHold {
    async fn accept_hold(&self, order: &Order, payment: &Payment) -> Result<StatusUpdate, StrategyError>;
}

/// Webhook handling for one provider.
///
/// The request body can only be read once, so it is parsed a single time with [`CallbackStrategy::parse_callback`] and
/// the parsed value is handed to the remaining steps.
pub trait CallbackStrategy {
    type Callback;

    fn parse_callback(&self, params: &CallbackParams) -> Result<Self::Callback, StrategyError>;

    fn validate_signature(&self, callback: &Self::Callback) -> bool;

    fn transaction_id(&self, callback: &Self::Callback) -> Result<String, StrategyError>;

    fn process_callback(&self, callback: &Self::Callback) -> Result<CallbackOutcome, StrategyError>;
}

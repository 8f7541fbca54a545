use log::*;
use payment_providers::{card_hold_status as status, ACTION_HOLD};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    db_types::{InitAction, Order, Payment, PaymentStatus},
    strategies::{
        provider_tag,
        AcceptHold,
        CallbackOutcome,
        CallbackParams,
        CallbackStrategy,
        InitResult,
        InitiatePayment,
        StatusUpdate,
        StrategyError,
    },
    traits::CardHoldGateway,
};

const PROVIDER: &str = "card-hold provider";

/// Card payments that are held first and captured later.
#[derive(Clone)]
pub struct CardHoldStrategy<C> {
    gateway: C,
}

impl<C> CardHoldStrategy<C> {
    pub fn new(gateway: C) -> Self {
        Self { gateway }
    }
}

/// A parsed card-hold webhook: the signed envelope plus its decoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CardHoldCallback {
    pub data: String,
    pub signature: String,
    pub payload: Value,
}

#[derive(Deserialize)]
struct Envelope {
    data: String,
    signature: String,
}

fn string_field<'a>(payload: &'a Value, field: &str) -> &'a str {
    payload[field].as_str().unwrap_or_default()
}

fn error_description(payload: &Value) -> String {
    format!("code: {} | description: {}", payload["err_code"], payload["err_description"])
}

impl<C: CardHoldGateway> InitiatePayment for CardHoldStrategy<C> {
    async fn initiate(&self, order: &Order, payment: &Payment) -> Result<InitResult, StrategyError> {
        let form = self.gateway.hold_form(&payment.transaction_id, payment.price.amount, &payment.description())?;
        debug!("💳️ Hold form prepared for payment {} of order #{}", payment.transaction_id, order.id);
        Ok(InitResult { action: InitAction::Form, resource: form, provider: provider_tag::CARD_HOLD })
    }
}

impl<C: CardHoldGateway> AcceptHold for CardHoldStrategy<C> {
    async fn accept_hold(&self, order: &Order, payment: &Payment) -> Result<StatusUpdate, StrategyError> {
        let raw = self.gateway.complete_hold(&payment.transaction_id, payment.price.amount).await?;
        debug!("💳️ Hold completion for order #{} returned {raw}", order.id);
        let (status, description) = match string_field(&raw, "status") {
            status::ERROR | status::FAILURE => (PaymentStatus::Failed, error_description(&raw)),
            status::SUCCESS => (PaymentStatus::Done, "Held payment was accepted".to_string()),
            status::REVERSED => (PaymentStatus::Refund, "Held payment was reversed".to_string()),
            other => {
                return Err(StrategyError::UnmappedStatus { provider: PROVIDER, status: other.to_string() });
            },
        };
        Ok(StatusUpdate { status, description, raw })
    }
}

impl<C: CardHoldGateway> CallbackStrategy for CardHoldStrategy<C> {
    type Callback = CardHoldCallback;

    fn parse_callback(&self, params: &CallbackParams) -> Result<Self::Callback, StrategyError> {
        let Envelope { data, signature } = if params.is_json() {
            params.json::<Envelope>()?
        } else {
            let mut fields = params.form_fields();
            let data = fields.remove("data").ok_or_else(|| StrategyError::MalformedCallback("missing data".into()))?;
            let signature = fields.remove("signature").unwrap_or_default();
            Envelope { data, signature }
        };
        let payload = self.gateway.decode_payload(&data).map_err(|e| StrategyError::MalformedCallback(e.to_string()))?;
        Ok(CardHoldCallback { data, signature, payload })
    }

    fn validate_signature(&self, callback: &Self::Callback) -> bool {
        self.gateway.verify_signature(&callback.data, &callback.signature)
    }

    fn transaction_id(&self, callback: &Self::Callback) -> Result<String, StrategyError> {
        match string_field(&callback.payload, "order_id") {
            "" => Err(StrategyError::MalformedCallback("the payload has no order_id".into())),
            id => Ok(id.to_string()),
        }
    }

    fn process_callback(&self, callback: &Self::Callback) -> Result<CallbackOutcome, StrategyError> {
        let payload = &callback.payload;
        let action = string_field(payload, "action");
        if action != ACTION_HOLD {
            return Err(StrategyError::UnsupportedAction { provider: PROVIDER, action: action.to_string() });
        }
        let (status, description) = match string_field(payload, "status") {
            status::HOLD_WAIT => (PaymentStatus::WaitingConfirmation, "updated by callback".to_string()),
            status::SUCCESS => (PaymentStatus::Done, "updated by callback".to_string()),
            status::ERROR | status::FAILURE => (PaymentStatus::Failed, error_description(payload)),
            other => {
                return Err(StrategyError::UnmappedStatus { provider: PROVIDER, status: other.to_string() });
            },
        };
        Ok(CallbackOutcome::Apply(StatusUpdate { status, description, raw: payload.clone() }))
    }
}

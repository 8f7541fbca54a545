use log::*;
use payment_providers::{parts_pay_state as state, PartsPayCallback, PartsPayHoldRequest, PartsPayProduct};
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
    traits::PartsPayGateway,
};

const PROVIDER: &str = "parts-pay provider";
const UPDATED_BY_CALLBACK: &str = "updated by callback";

/// Bank installments. The bank holds the order amount while the customer signs the installment agreement, and the
/// merchant confirms the hold once the goods ship.
#[derive(Clone)]
pub struct PartsPayStrategy<P> {
    gateway: P,
}

impl<P> PartsPayStrategy<P> {
    pub fn new(gateway: P) -> Self {
        Self { gateway }
    }
}

fn hold_request(order: &Order, payment: &Payment) -> Result<PartsPayHoldRequest, StrategyError> {
    let parts_count = order
        .payment
        .extra
        .parts_count
        .filter(|n| *n > 0)
        .ok_or_else(|| StrategyError::InvalidPayment(format!("Order #{} has no installment count", order.id)))?;
    let products = order
        .items
        .iter()
        .map(|item| PartsPayProduct { name: item.product.name.clone(), count: item.quantity, price: item.price.amount })
        .collect();
    Ok(PartsPayHoldRequest {
        order_ref: payment.transaction_id.clone(),
        amount: payment.price.amount,
        parts_count,
        products,
    })
}

fn to_raw<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

impl<P: PartsPayGateway> InitiatePayment for PartsPayStrategy<P> {
    async fn initiate(&self, order: &Order, payment: &Payment) -> Result<InitResult, StrategyError> {
        let request = hold_request(order, payment)?;
        let response = self.gateway.hold(&request).await?;
        debug!("💳️ Installment hold for order #{} created. Redirecting customer.", order.id);
        let url = self.gateway.redirect_url(&response.token);
        Ok(InitResult { action: InitAction::Redirect, resource: url, provider: provider_tag::PARTS_PAY })
    }
}

impl<P: PartsPayGateway> AcceptHold for PartsPayStrategy<P> {
    async fn accept_hold(&self, order: &Order, payment: &Payment) -> Result<StatusUpdate, StrategyError> {
        let response = self.gateway.confirm(&payment.transaction_id).await?;
        debug!("💳️ Installment confirmation for order #{} returned {}", order.id, response.state);
        let raw = to_raw(&response);
        match response.state.as_str() {
            state::FAIL => Ok(StatusUpdate {
                status: PaymentStatus::Failed,
                description: format!("code: none | description: {}", response.message),
                raw,
            }),
            state::SUCCESS => Ok(StatusUpdate {
                status: PaymentStatus::Confirmed,
                description: "Held payment was accepted".into(),
                raw,
            }),
            other => Err(StrategyError::UnmappedStatus { provider: PROVIDER, status: other.to_string() }),
        }
    }
}

impl<P: PartsPayGateway> CallbackStrategy for PartsPayStrategy<P> {
    type Callback = PartsPayCallback;

    fn parse_callback(&self, params: &CallbackParams) -> Result<Self::Callback, StrategyError> {
        params.json::<PartsPayCallback>()
    }

    fn validate_signature(&self, callback: &Self::Callback) -> bool {
        self.gateway.verify_callback(callback)
    }

    fn transaction_id(&self, callback: &Self::Callback) -> Result<String, StrategyError> {
        if callback.order_id.is_empty() {
            return Err(StrategyError::MalformedCallback("the callback has no orderId".into()));
        }
        Ok(callback.order_id.clone())
    }

    fn process_callback(&self, callback: &Self::Callback) -> Result<CallbackOutcome, StrategyError> {
        let raw = to_raw(callback);
        let (status, description) = match callback.payment_state.as_str() {
            state::SUCCESS => (PaymentStatus::Done, UPDATED_BY_CALLBACK.to_string()),
            state::FAIL => (PaymentStatus::Failed, callback.message.clone()),
            state::CANCELED => (PaymentStatus::Canceled, UPDATED_BY_CALLBACK.to_string()),
            state::LOCKED => (PaymentStatus::WaitingConfirmation, UPDATED_BY_CALLBACK.to_string()),
            state::CLIENT_WAIT | state::OTP_WAITING | state::PP_CREATION | state::CREATED => {
                let id = &callback.order_id;
                trace!("💳️ Installment callback for {id} is in intermediate state {}", callback.payment_state);
                return Ok(CallbackOutcome::Skip { state: callback.payment_state.clone(), raw });
            },
            other => {
                return Err(StrategyError::UnmappedStatus { provider: PROVIDER, status: other.to_string() });
            },
        };
        Ok(CallbackOutcome::Apply(StatusUpdate { status, description, raw }))
    }
}

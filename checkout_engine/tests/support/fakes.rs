use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
    Mutex,
};

use checkout_common::Cents;
use checkout_engine::{
    strategies::CallbackParams,
    traits::{CardHoldGateway, PartsPayGateway},
};
use payment_providers::{
    helpers::{decode_json_payload, encode_json_payload},
    ConfirmResponse,
    HoldResponse,
    PartsPayCallback,
    PartsPayHoldRequest,
    ProviderApiError,
};
use serde_json::{json, Value};

pub const PARTS_PAY_TOKEN: &str = "tok-123";
pub const VALID_PARTS_PAY_SIGNATURE: &str = "valid";

/// Card-hold gateway double. Signatures are `signed:<data>`; hold completion returns whatever `completion` holds.
#[derive(Clone)]
pub struct FakeCardHold {
    pub completion: Arc<Mutex<Value>>,
    pub completions: Arc<AtomicUsize>,
}

impl Default for FakeCardHold {
    fn default() -> Self {
        Self { completion: Arc::new(Mutex::new(json!({"status": "success"}))), completions: Arc::default() }
    }
}

impl FakeCardHold {
    pub fn complete_with(&self, response: Value) {
        *self.completion.lock().unwrap() = response;
    }

    pub fn completion_count(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}

impl CardHoldGateway for FakeCardHold {
    fn hold_form(&self, order_ref: &str, amount: Cents, description: &str) -> Result<String, ProviderApiError> {
        Ok(format!(r#"<form data-order="{order_ref}" data-amount="{amount}">{description}</form>"#))
    }

    async fn complete_hold(&self, _order_ref: &str, _amount: Cents) -> Result<Value, ProviderApiError> {
        self.completions.fetch_add(1, Ordering::SeqCst);
        Ok(self.completion.lock().unwrap().clone())
    }

    fn verify_signature(&self, data: &str, signature: &str) -> bool {
        signature == card_hold_signature(data)
    }

    fn decode_payload(&self, data: &str) -> Result<Value, ProviderApiError> {
        decode_json_payload(data)
    }
}

pub fn card_hold_signature(data: &str) -> String {
    format!("signed:{data}")
}

fn card_hold_form(data: &str, signature: &str) -> CallbackParams {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("data", data)
        .append_pair("signature", signature)
        .finish();
    CallbackParams::new("application/x-www-form-urlencoded", body.into_bytes())
}

pub fn signed_card_hold_callback(payload: &Value) -> CallbackParams {
    let data = encode_json_payload(payload).unwrap();
    card_hold_form(&data, &card_hold_signature(&data))
}

/// A correctly signed card-hold webhook for the given transaction.
pub fn card_hold_callback(transaction_id: &str, status: &str) -> CallbackParams {
    signed_card_hold_callback(&json!({"action": "hold", "status": status, "order_id": transaction_id, "amount": "100.00"}))
}

pub fn forged_card_hold_callback(transaction_id: &str, status: &str) -> CallbackParams {
    let payload = json!({"action": "hold", "status": status, "order_id": transaction_id});
    let data = encode_json_payload(&payload).unwrap();
    card_hold_form(&data, "not-a-signature")
}

/// Installment gateway double. Callbacks are valid when their signature is [`VALID_PARTS_PAY_SIGNATURE`].
#[derive(Clone, Default)]
pub struct FakePartsPay {
    pub holds: Arc<Mutex<Vec<PartsPayHoldRequest>>>,
    pub confirm_state: Arc<Mutex<String>>,
    pub fail_holds: Arc<AtomicBool>,
}

impl FakePartsPay {
    pub fn confirm_with(&self, state: &str) {
        *self.confirm_state.lock().unwrap() = state.to_string();
    }

    pub fn fail_holds(&self) {
        self.fail_holds.store(true, Ordering::SeqCst);
    }

    pub fn hold_requests(&self) -> Vec<PartsPayHoldRequest> {
        self.holds.lock().unwrap().clone()
    }
}

impl PartsPayGateway for FakePartsPay {
    async fn hold(&self, request: &PartsPayHoldRequest) -> Result<HoldResponse, ProviderApiError> {
        if self.fail_holds.load(Ordering::SeqCst) {
            return Err(ProviderApiError::QueryError { status: 503, message: "Service unavailable".into() });
        }
        self.holds.lock().unwrap().push(request.clone());
        Ok(HoldResponse {
            state: "SUCCESS".into(),
            order_id: request.order_ref.clone(),
            token: PARTS_PAY_TOKEN.into(),
            ..Default::default()
        })
    }

    async fn confirm(&self, order_ref: &str) -> Result<ConfirmResponse, ProviderApiError> {
        let state = self.confirm_state.lock().unwrap().clone();
        Ok(ConfirmResponse { state, order_id: order_ref.to_string(), ..Default::default() })
    }

    fn redirect_url(&self, token: &str) -> String {
        format!("https://parts.example/ipp/v2/payment?token={token}")
    }

    fn verify_callback(&self, callback: &PartsPayCallback) -> bool {
        callback.signature == VALID_PARTS_PAY_SIGNATURE
    }
}

pub fn parts_pay_callback(transaction_id: &str, state: &str, signature: &str) -> CallbackParams {
    let callback = PartsPayCallback {
        order_id: transaction_id.to_string(),
        store_id: "store-1".into(),
        payment_state: state.to_string(),
        message: format!("state is {state}"),
        signature: signature.to_string(),
    };
    let body = serde_json::to_vec(&callback).unwrap();
    CallbackParams::new("application/json", body)
}

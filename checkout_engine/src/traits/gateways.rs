use checkout_common::Cents;
use payment_providers::{
    CardHoldApi,
    ConfirmResponse,
    HoldResponse,
    PartsPayApi,
    PartsPayCallback,
    PartsPayHoldRequest,
    ProviderApiError,
};
use serde_json::Value;

/// Remote operations of the card-hold provider.
#[allow(async_fn_in_trait)]
pub trait CardHoldGateway {
    /// Renders the signed, auto-submitting form that places a hold for `amount` on the customer's card.
    fn hold_form(&self, order_ref: &str, amount: Cents, description: &str) -> Result<String, ProviderApiError>;

    /// Captures a previously held amount and returns the provider's response.
    async fn complete_hold(&self, order_ref: &str, amount: Cents) -> Result<Value, ProviderApiError>;

    fn verify_signature(&self, data: &str, signature: &str) -> bool;

    fn decode_payload(&self, data: &str) -> Result<Value, ProviderApiError>;
}

/// Remote operations of the bank installment provider.
#[allow(async_fn_in_trait)]
pub trait PartsPayGateway {
    async fn hold(&self, request: &PartsPayHoldRequest) -> Result<HoldResponse, ProviderApiError>;

    async fn confirm(&self, order_ref: &str) -> Result<ConfirmResponse, ProviderApiError>;

    fn redirect_url(&self, token: &str) -> String;

    fn verify_callback(&self, callback: &PartsPayCallback) -> bool;
}

impl CardHoldGateway for CardHoldApi {
    fn hold_form(&self, order_ref: &str, amount: Cents, description: &str) -> Result<String, ProviderApiError> {
        CardHoldApi::hold_form(self, order_ref, amount, description)
    }

    async fn complete_hold(&self, order_ref: &str, amount: Cents) -> Result<Value, ProviderApiError> {
        CardHoldApi::complete_hold(self, order_ref, amount).await
    }

    fn verify_signature(&self, data: &str, signature: &str) -> bool {
        CardHoldApi::verify_signature(self, data, signature)
    }

    fn decode_payload(&self, data: &str) -> Result<Value, ProviderApiError> {
        CardHoldApi::decode_payload(self, data)
    }
}

impl PartsPayGateway for PartsPayApi {
    async fn hold(&self, request: &PartsPayHoldRequest) -> Result<HoldResponse, ProviderApiError> {
        PartsPayApi::hold(self, request).await
    }

    async fn confirm(&self, order_ref: &str) -> Result<ConfirmResponse, ProviderApiError> {
        PartsPayApi::confirm(self, order_ref).await
    }

    fn redirect_url(&self, token: &str) -> String {
        PartsPayApi::redirect_url(self, token)
    }

    fn verify_callback(&self, callback: &PartsPayCallback) -> bool {
        PartsPayApi::verify_callback(self, callback)
    }
}

use std::sync::Arc;

use checkout_common::Cents;
use log::*;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::CardHoldConfig,
    helpers::{decode_json_payload, encode_json_payload, sha1_base64, signatures_match},
    ProviderApiError,
};

pub const CARD_HOLD_API_VERSION: &str = "3";
pub const ACTION_HOLD: &str = "hold";
pub const ACTION_HOLD_COMPLETION: &str = "hold_completion";

/// Status strings reported by the card-hold provider.
pub mod card_hold_status {
    pub const HOLD_WAIT: &str = "hold_wait";
    pub const SUCCESS: &str = "success";
    pub const ERROR: &str = "error";
    pub const FAILURE: &str = "failure";
    pub const REVERSED: &str = "reversed";
}

/// A base64-encoded JSON payload and its signature. This is the envelope used in both directions: for requests we
/// send and for the callbacks the provider posts back to us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedEnvelope {
    pub data: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize)]
struct HoldRequest<'a> {
    public_key: &'a str,
    version: &'a str,
    action: &'a str,
    amount: String,
    currency: &'a str,
    description: &'a str,
    order_id: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    result_url: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    server_url: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct HoldCompletionRequest<'a> {
    public_key: &'a str,
    version: &'a str,
    action: &'a str,
    amount: String,
    order_id: &'a str,
}

#[derive(Clone)]
pub struct CardHoldApi {
    config: CardHoldConfig,
    client: Arc<Client>,
}

impl CardHoldApi {
    pub fn new(config: CardHoldConfig) -> Result<Self, ProviderApiError> {
        if config.private_key.is_empty() {
            return Err(ProviderApiError::Initialization("The card-hold private key is empty".into()));
        }
        let client = Client::builder().build().map_err(|e| ProviderApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &CardHoldConfig {
        &self.config
    }

    /// `base64(sha1(private_key + data + private_key))`
    pub fn sign(&self, data: &str) -> String {
        let key = self.config.private_key.reveal().as_bytes();
        sha1_base64(&[key, data.as_bytes(), key])
    }

    pub fn verify_signature(&self, data: &str, signature: &str) -> bool {
        signatures_match(&self.sign(data), signature)
    }

    pub fn envelope<T: Serialize>(&self, payload: &T) -> Result<SignedEnvelope, ProviderApiError> {
        let data = encode_json_payload(payload)?;
        let signature = self.sign(&data);
        Ok(SignedEnvelope { data, signature })
    }

    /// Decodes the `data` field of a callback envelope into a JSON object. The signature is not checked here.
    pub fn decode_payload(&self, data: &str) -> Result<Value, ProviderApiError> {
        decode_json_payload(data)
    }

    /// Renders the auto-submitting HTML form that starts a hold on the provider's checkout page.
    pub fn hold_form(&self, order_ref: &str, amount: Cents, description: &str) -> Result<String, ProviderApiError> {
        let request = HoldRequest {
            public_key: &self.config.public_key,
            version: CARD_HOLD_API_VERSION,
            action: ACTION_HOLD,
            amount: amount.to_decimal_string(),
            currency: &self.config.currency,
            description,
            order_id: order_ref,
            result_url: &self.config.result_url,
            server_url: &self.config.callback_url,
        };
        let SignedEnvelope { data, signature } = self.envelope(&request)?;
        debug!("💳️ Rendering card-hold form for transaction {order_ref}");
        Ok(format!(
            "<form method=\"POST\" action=\"{url}\" accept-charset=\"utf-8\">\n<input type=\"hidden\" \
             name=\"data\" value=\"{data}\" />\n<input type=\"hidden\" name=\"signature\" value=\"{signature}\" \
             />\n<button type=\"submit\">Pay</button>\n</form>",
            url = self.config.checkout_url
        ))
    }

    /// Captures a previously held amount. Returns the provider's raw JSON response.
    pub async fn complete_hold(&self, order_ref: &str, amount: Cents) -> Result<Value, ProviderApiError> {
        let request = HoldCompletionRequest {
            public_key: &self.config.public_key,
            version: CARD_HOLD_API_VERSION,
            action: ACTION_HOLD_COMPLETION,
            amount: amount.to_decimal_string(),
            order_id: order_ref,
        };
        let envelope = self.envelope(&request)?;
        trace!("💳️ Sending hold completion for {order_ref} to {}", self.config.api_url);
        let response = self
            .client
            .post(&self.config.api_url)
            .form(&envelope)
            .send()
            .await
            .map_err(|e| ProviderApiError::RequestError(e.to_string()))?;
        if response.status().is_success() {
            let value = response.json::<Value>().await.map_err(|e| ProviderApiError::JsonError(e.to_string()))?;
            if !value.is_object() {
                return Err(ProviderApiError::ResponseError(format!("Expected a JSON object, got {value}")));
            }
            debug!("💳️ Hold completion for {order_ref} returned status {}", value["status"]);
            Ok(value)
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ProviderApiError::ResponseError(e.to_string()))?;
            Err(ProviderApiError::QueryError { status, message })
        }
    }
}

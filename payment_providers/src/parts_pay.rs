use std::sync::Arc;

use checkout_common::Cents;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;

use crate::{
    config::PartsPayConfig,
    helpers::{sha1_base64, signatures_match},
    ProviderApiError,
};

pub const MERCHANT_TYPE_PARTS_PAY: &str = "PP";
const HOLD_PATH: &str = "/ipp/v2/payment/hold";
const CONFIRM_PATH: &str = "/ipp/v2/payment/confirm";
const PAYMENT_PAGE_PATH: &str = "/ipp/v2/payment";

/// Payment states reported by the installment provider, in responses and in callbacks.
pub mod parts_pay_state {
    pub const CREATED: &str = "CREATED";
    pub const CANCELED: &str = "CANCELED";
    pub const SUCCESS: &str = "SUCCESS";
    pub const FAIL: &str = "FAIL";
    pub const CLIENT_WAIT: &str = "CLIENT_WAIT";
    pub const OTP_WAITING: &str = "OTP_WAITING";
    pub const PP_CREATION: &str = "PP_CREATION";
    pub const LOCKED: &str = "LOCKED";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartsPayProduct {
    pub name: String,
    pub count: u32,
    /// Unit price
    pub price: Cents,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartsPayHoldRequest {
    /// Our reference for the payment. The provider echoes it back as `orderId`.
    pub order_ref: String,
    pub amount: Cents,
    pub parts_count: u32,
    pub products: Vec<PartsPayProduct>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HoldResponse {
    pub store_id: String,
    pub state: String,
    pub order_id: String,
    pub token: String,
    pub message: String,
    pub signature: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfirmResponse {
    pub store_id: String,
    pub state: String,
    pub order_id: String,
    pub message: String,
    pub signature: String,
}

/// The JSON body the provider posts to our webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartsPayCallback {
    pub order_id: String,
    pub store_id: String,
    pub payment_state: String,
    pub message: String,
    pub signature: String,
}

fn to_major_units_f64(amount: Cents) -> f64 {
    amount.value() as f64 / 100.0
}

#[derive(Clone)]
pub struct PartsPayApi {
    config: PartsPayConfig,
    client: Arc<Client>,
}

impl PartsPayApi {
    pub fn new(config: PartsPayConfig) -> Result<Self, ProviderApiError> {
        if config.password.is_empty() {
            return Err(ProviderApiError::Initialization("The parts-pay password is empty".into()));
        }
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=UTF-8"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json; charset=utf-8"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ProviderApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &PartsPayConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url.trim_end_matches('/'))
    }

    /// The page the customer must be redirected to in order to complete the installment application.
    pub fn redirect_url(&self, token: &str) -> String {
        format!("{}?token={token}", self.url(PAYMENT_PAGE_PATH))
    }

    fn sign(&self, fields: &[&str]) -> String {
        let password = self.config.password.reveal().as_bytes();
        let mut parts = Vec::with_capacity(fields.len() + 2);
        parts.push(password);
        parts.extend(fields.iter().map(|f| f.as_bytes()));
        parts.push(password);
        sha1_base64(&parts)
    }

    pub fn hold_signature(&self, request: &PartsPayHoldRequest) -> String {
        let products = request
            .products
            .iter()
            .map(|p| format!("{}{}{}", p.name, p.count, p.price.value()))
            .collect::<String>();
        let amount = request.amount.value().to_string();
        let parts_count = request.parts_count.to_string();
        self.sign(&[
            self.config.store_id.as_str(),
            request.order_ref.as_str(),
            amount.as_str(),
            parts_count.as_str(),
            MERCHANT_TYPE_PARTS_PAY,
            self.config.response_url.as_str(),
            self.config.redirect_url.as_str(),
            products.as_str(),
        ])
    }

    pub fn confirm_signature(&self, order_ref: &str) -> String {
        self.sign(&[self.config.store_id.as_str(), order_ref])
    }

    pub fn callback_signature(&self, callback: &PartsPayCallback) -> String {
        self.sign(&[
            callback.store_id.as_str(),
            callback.order_id.as_str(),
            callback.payment_state.as_str(),
            callback.message.as_str(),
        ])
    }

    /// A callback is genuine if it names our store and carries a matching signature.
    pub fn verify_callback(&self, callback: &PartsPayCallback) -> bool {
        callback.store_id == self.config.store_id
            && signatures_match(&self.callback_signature(callback), &callback.signature)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T, ProviderApiError> {
        let url = self.url(path);
        trace!("💳️ Sending parts-pay request to {url}");
        let response =
            self.client.post(url).json(&body).send().await.map_err(|e| ProviderApiError::RequestError(e.to_string()))?;
        if response.status().is_success() {
            response.json::<T>().await.map_err(|e| ProviderApiError::JsonError(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| ProviderApiError::ResponseError(e.to_string()))?;
            Err(ProviderApiError::QueryError { status, message })
        }
    }

    /// Registers an installment application with the provider. The provider must answer with a `SUCCESS` state and a
    /// token, otherwise the hold is considered to have failed.
    pub async fn hold(&self, request: &PartsPayHoldRequest) -> Result<HoldResponse, ProviderApiError> {
        let products = request
            .products
            .iter()
            .map(|p| json!({"name": p.name, "count": p.count, "price": to_major_units_f64(p.price)}))
            .collect::<Vec<_>>();
        let body = json!({
            "storeId": self.config.store_id,
            "orderId": request.order_ref,
            "amount": to_major_units_f64(request.amount),
            "partsCount": request.parts_count,
            "merchantType": MERCHANT_TYPE_PARTS_PAY,
            "products": products,
            "responseUrl": self.config.response_url,
            "redirectUrl": self.config.redirect_url,
            "signature": self.hold_signature(request),
        });
        let response = self.post::<HoldResponse>(HOLD_PATH, body).await?;
        if response.state != parts_pay_state::SUCCESS {
            warn!("💳️ Parts-pay hold for {} was refused: {} {}", request.order_ref, response.state, response.message);
            return Err(ProviderApiError::ResponseError(format!(
                "Hold was not created. State: {}. {}",
                response.state, response.message
            )));
        }
        if response.token.is_empty() {
            return Err(ProviderApiError::ResponseError("Hold response did not include a token".into()));
        }
        debug!("💳️ Parts-pay hold created for {}", request.order_ref);
        Ok(response)
    }

    /// Confirms a held installment payment, so that the bank pays out.
    pub async fn confirm(&self, order_ref: &str) -> Result<ConfirmResponse, ProviderApiError> {
        let body = json!({
            "storeId": self.config.store_id,
            "orderId": order_ref,
            "signature": self.confirm_signature(order_ref),
        });
        let response = self.post::<ConfirmResponse>(CONFIRM_PATH, body).await?;
        debug!("💳️ Parts-pay confirmation for {order_ref} returned state {}", response.state);
        Ok(response)
    }
}

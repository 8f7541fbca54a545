use checkout_common::{Secret, DEFAULT_CURRENCY_CODE};
use log::*;

const DEFAULT_CARD_HOLD_API_URL: &str = "https://www.liqpay.ua/api/request";
const DEFAULT_CARD_HOLD_CHECKOUT_URL: &str = "https://www.liqpay.ua/api/3/checkout";
const DEFAULT_PARTS_PAY_API_URL: &str = "https://payparts2.privatbank.ua";

/// Configuration for the card-hold (peer-to-peer) provider.
#[derive(Debug, Clone, Default)]
pub struct CardHoldConfig {
    pub public_key: String,
    pub private_key: Secret<String>,
    /// Server-to-server endpoint for `hold_completion` requests
    pub api_url: String,
    /// Where the customer's browser posts the hold form
    pub checkout_url: String,
    /// Webhook URL the provider calls with status updates
    pub callback_url: String,
    /// Where the customer is sent after finishing on the provider's page
    pub result_url: String,
    pub currency: String,
}

impl CardHoldConfig {
    pub fn new_from_env_or_default() -> Self {
        let public_key = std::env::var("CHECKOUT_CARD_HOLD_PUBLIC_KEY").unwrap_or_else(|_| {
            warn!("🪛️ CHECKOUT_CARD_HOLD_PUBLIC_KEY not set, using (probably useless) default");
            "sandbox_i00000000".to_string()
        });
        let private_key = Secret::new(std::env::var("CHECKOUT_CARD_HOLD_PRIVATE_KEY").unwrap_or_else(|_| {
            warn!("🪛️ CHECKOUT_CARD_HOLD_PRIVATE_KEY not set, using (probably useless) default");
            "sandbox_00000000000000".to_string()
        }));
        let api_url = std::env::var("CHECKOUT_CARD_HOLD_API_URL").unwrap_or_else(|_| DEFAULT_CARD_HOLD_API_URL.into());
        let checkout_url =
            std::env::var("CHECKOUT_CARD_HOLD_CHECKOUT_URL").unwrap_or_else(|_| DEFAULT_CARD_HOLD_CHECKOUT_URL.into());
        let callback_url = std::env::var("CHECKOUT_CARD_HOLD_CALLBACK_URL").unwrap_or_else(|_| {
            warn!("🪛️ CHECKOUT_CARD_HOLD_CALLBACK_URL not set. The provider will not be able to notify us.");
            String::default()
        });
        let result_url = std::env::var("CHECKOUT_CARD_HOLD_RESULT_URL").unwrap_or_default();
        let currency = std::env::var("CHECKOUT_CURRENCY").unwrap_or_else(|_| DEFAULT_CURRENCY_CODE.into());
        Self { public_key, private_key, api_url, checkout_url, callback_url, result_url, currency }
    }
}

/// Configuration for the bank installment ("parts pay") provider.
#[derive(Debug, Clone, Default)]
pub struct PartsPayConfig {
    pub store_id: String,
    pub password: Secret<String>,
    /// Base URL of the provider. Endpoint paths are appended to it.
    pub api_url: String,
    /// Webhook URL the provider calls with payment state changes
    pub response_url: String,
    /// Where the customer is sent after finishing on the provider's page
    pub redirect_url: String,
}

impl PartsPayConfig {
    pub fn new_from_env_or_default() -> Self {
        let store_id = std::env::var("CHECKOUT_PARTS_PAY_STORE_ID").unwrap_or_else(|_| {
            warn!("🪛️ CHECKOUT_PARTS_PAY_STORE_ID not set, using (probably useless) default");
            "00000000000000000000".to_string()
        });
        let password = Secret::new(std::env::var("CHECKOUT_PARTS_PAY_PASSWORD").unwrap_or_else(|_| {
            warn!("🪛️ CHECKOUT_PARTS_PAY_PASSWORD not set, using (probably useless) default");
            "00000000000000".to_string()
        }));
        let api_url = std::env::var("CHECKOUT_PARTS_PAY_API_URL").unwrap_or_else(|_| DEFAULT_PARTS_PAY_API_URL.into());
        let response_url = std::env::var("CHECKOUT_PARTS_PAY_RESPONSE_URL").unwrap_or_else(|_| {
            warn!("🪛️ CHECKOUT_PARTS_PAY_RESPONSE_URL not set. The provider will not be able to notify us.");
            String::default()
        });
        let redirect_url = std::env::var("CHECKOUT_PARTS_PAY_REDIRECT_URL").unwrap_or_default();
        Self { store_id, password, api_url, response_url, redirect_url }
    }
}

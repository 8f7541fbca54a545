//! HTTP clients for the external payment providers.
//!
//! * [`CardHoldApi`] talks to the card-hold provider: it renders the signed hold form and captures held funds.
//! * [`PartsPayApi`] talks to the bank installment provider: it registers holds, confirms them and verifies
//!   callbacks.
//!
//! Neither client knows anything about orders or payments. Mapping provider states onto payment statuses is done by
//! the payment strategies in `checkout_engine`.
mod card_hold;
pub mod config;
mod error;
pub mod helpers;
mod parts_pay;

pub use card_hold::{card_hold_status, CardHoldApi, SignedEnvelope, ACTION_HOLD, CARD_HOLD_API_VERSION};
pub use config::{CardHoldConfig, PartsPayConfig};
pub use error::ProviderApiError;
pub use parts_pay::{
    parts_pay_state,
    ConfirmResponse,
    HoldResponse,
    PartsPayApi,
    PartsPayCallback,
    PartsPayHoldRequest,
    PartsPayProduct,
    MERCHANT_TYPE_PARTS_PAY,
};

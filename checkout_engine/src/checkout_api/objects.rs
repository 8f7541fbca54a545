use serde::{Deserialize, Serialize};

use crate::db_types::{InitAction, Order, OrderId, Payment};

/// What the storefront needs to continue after a payment has been started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitPaymentResponse {
    pub action: InitAction,
    /// Form markup or redirect URL, depending on `action`. Empty for `none`.
    pub resource: String,
    pub transaction_id: String,
    pub payment_method: String,
    pub order_id: OrderId,
    pub do_not_call: bool,
}

impl InitPaymentResponse {
    pub fn new(order: &Order, payment: &Payment, action: InitAction, resource: String) -> Self {
        Self {
            action,
            resource,
            transaction_id: payment.transaction_id.clone(),
            payment_method: order.payment.method.slug.clone(),
            order_id: order.id,
            do_not_call: order.do_not_call,
        }
    }
}

/// The result of a provider callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackResult {
    /// The new status was recorded
    Applied,
    /// The provider reported an intermediate state
    Skipped,
    /// The payment already had the reported status
    Duplicate,
    /// The payment is already settled, so the reported status was not recorded
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderInfo {
    pub order: Order,
    /// Every payment attempt for the order, oldest first
    pub payments: Vec<Payment>,
}

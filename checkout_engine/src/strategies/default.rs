use log::*;

use crate::{
    db_types::{InitAction, Order, Payment},
    strategies::{provider_tag, InitResult, InitiatePayment, StrategyError},
};

/// Payment methods that are settled outside the checkout: cash, cash on delivery, card transfers and invoices. There
/// is nothing to initiate, and their status only changes through manual back-office action.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStrategy;

impl InitiatePayment for DefaultStrategy {
    async fn initiate(&self, order: &Order, payment: &Payment) -> Result<InitResult, StrategyError> {
        debug!(
            "💳️ Payment {} for order #{} ({}) needs no provider interaction",
            payment.transaction_id, order.id, order.payment.method.slug
        );
        Ok(InitResult { action: InitAction::None, resource: String::new(), provider: provider_tag::NONE })
    }
}

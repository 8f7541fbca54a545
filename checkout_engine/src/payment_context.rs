//! Strategy resolution.
//!
//! The payment method a customer picks (`cash`, `p2p`, `parts_pay`, ...) and the provider tag recorded on a payment
//! after initiation (`none`, `liqpay`, `privat_parts_pay`) are separate namespaces. Initiation is looked up by method
//! slug; accepting holds and handling callbacks are looked up by provider tag.
//!
//! The tables are closed: resolution returns enums over the known strategies, and adding a provider means adding a
//! variant.
use payment_providers::PartsPayCallback;
use thiserror::Error;

use crate::{
    db_types::{payment_method_slug, Order, Payment},
    strategies::{
        provider_tag,
        AcceptHold,
        CallbackOutcome,
        CallbackParams,
        CallbackStrategy,
        CardHoldCallback,
        CardHoldStrategy,
        DefaultStrategy,
        InitResult,
        InitiatePayment,
        PartsPayStrategy,
        StatusUpdate,
        StrategyError,
    },
    traits::{CardHoldGateway, PartsPayGateway},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("No accept capability for provider '{0}'")]
    NoAcceptCapability(String),
    #[error("No callback capability for provider '{0}'")]
    NoCallbackCapability(String),
}

pub struct PaymentContext<C, P> {
    default: DefaultStrategy,
    card_hold: CardHoldStrategy<C>,
    parts_pay: PartsPayStrategy<P>,
}

impl<C, P> PaymentContext<C, P>
where
    C: CardHoldGateway,
    P: PartsPayGateway,
{
    pub fn new(card_hold: C, parts_pay: P) -> Self {
        Self {
            default: DefaultStrategy,
            card_hold: CardHoldStrategy::new(card_hold),
            parts_pay: PartsPayStrategy::new(parts_pay),
        }
    }

    /// Any method that is not settled through a provider falls back to the default strategy.
    pub fn resolve_initiator(&self, method_slug: &str) -> Initiator<'_, C, P> {
        match method_slug {
            payment_method_slug::P2P => Initiator::CardHold(&self.card_hold),
            payment_method_slug::PARTS_PAY => Initiator::PartsPay(&self.parts_pay),
            _ => Initiator::Default(&self.default),
        }
    }

    pub fn resolve_accepter(&self, provider: &str) -> Result<Accepter<'_, C, P>, ResolveError> {
        match provider {
            provider_tag::CARD_HOLD => Ok(Accepter::CardHold(&self.card_hold)),
            provider_tag::PARTS_PAY => Ok(Accepter::PartsPay(&self.parts_pay)),
            _ => Err(ResolveError::NoAcceptCapability(provider.to_string())),
        }
    }

    pub fn resolve_callback_handler(&self, provider: &str) -> Result<CallbackHandler<'_, C, P>, ResolveError> {
        match provider {
            provider_tag::CARD_HOLD => Ok(CallbackHandler::CardHold(&self.card_hold)),
            provider_tag::PARTS_PAY => Ok(CallbackHandler::PartsPay(&self.parts_pay)),
            _ => Err(ResolveError::NoCallbackCapability(provider.to_string())),
        }
    }
}

pub enum Initiator<'a, C, P> {
    Default(&'a DefaultStrategy),
    CardHold(&'a CardHoldStrategy<C>),
    PartsPay(&'a PartsPayStrategy<P>),
}

impl<C: CardHoldGateway, P: PartsPayGateway> InitiatePayment for Initiator<'_, C, P> {
    async fn initiate(&self, order: &Order, payment: &Payment) -> Result<InitResult, StrategyError> {
        match self {
            Initiator::Default(s) => s.initiate(order, payment).await,
            Initiator::CardHold(s) => s.initiate(order, payment).await,
            Initiator::PartsPay(s) => s.initiate(order, payment).await,
        }
    }
}

pub enum Accepter<'a, C, P> {
    CardHold(&'a CardHoldStrategy<C>),
    PartsPay(&'a PartsPayStrategy<P>),
}

impl<C: CardHoldGateway, P: PartsPayGateway> AcceptHold for Accepter<'_, C, P> {
    async fn accept_hold(&self, order: &Order, payment: &Payment) -> Result<StatusUpdate, StrategyError> {
        match self {
            Accepter::CardHold(s) => s.accept_hold(order, payment).await,
            Accepter::PartsPay(s) => s.accept_hold(order, payment).await,
        }
    }
}

pub enum CallbackHandler<'a, C, P> {
    CardHold(&'a CardHoldStrategy<C>),
    PartsPay(&'a PartsPayStrategy<P>),
}

/// A webhook body, parsed by the handler of the provider that sent it.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCallback {
    CardHold(CardHoldCallback),
    PartsPay(PartsPayCallback),
}

fn mismatch() -> StrategyError {
    StrategyError::MalformedCallback("the callback was parsed by a different provider".into())
}

impl<C: CardHoldGateway, P: PartsPayGateway> CallbackStrategy for CallbackHandler<'_, C, P> {
    type Callback = ParsedCallback;

    fn parse_callback(&self, params: &CallbackParams) -> Result<Self::Callback, StrategyError> {
        match self {
            CallbackHandler::CardHold(s) => s.parse_callback(params).map(ParsedCallback::CardHold),
            CallbackHandler::PartsPay(s) => s.parse_callback(params).map(ParsedCallback::PartsPay),
        }
    }

    fn validate_signature(&self, callback: &Self::Callback) -> bool {
        match (self, callback) {
            (CallbackHandler::CardHold(s), ParsedCallback::CardHold(cb)) => s.validate_signature(cb),
            (CallbackHandler::PartsPay(s), ParsedCallback::PartsPay(cb)) => s.validate_signature(cb),
            _ => false,
        }
    }

    fn transaction_id(&self, callback: &Self::Callback) -> Result<String, StrategyError> {
        match (self, callback) {
            (CallbackHandler::CardHold(s), ParsedCallback::CardHold(cb)) => s.transaction_id(cb),
            (CallbackHandler::PartsPay(s), ParsedCallback::PartsPay(cb)) => s.transaction_id(cb),
            _ => Err(mismatch()),
        }
    }

    fn process_callback(&self, callback: &Self::Callback) -> Result<CallbackOutcome, StrategyError> {
        match (self, callback) {
            (CallbackHandler::CardHold(s), ParsedCallback::CardHold(cb)) => s.process_callback(cb),
            (CallbackHandler::PartsPay(s), ParsedCallback::PartsPay(cb)) => s.process_callback(cb),
            _ => Err(mismatch()),
        }
    }
}

#[cfg(test)]
mod test {
    use checkout_common::Cents;
    use payment_providers::{ConfirmResponse, HoldResponse, PartsPayHoldRequest, ProviderApiError};
    use serde_json::Value;

    use super::*;

    struct NoCardHold;

    impl CardHoldGateway for NoCardHold {
        fn hold_form(&self, _: &str, _: Cents, _: &str) -> Result<String, ProviderApiError> {
            Ok(String::new())
        }

        async fn complete_hold(&self, _: &str, _: Cents) -> Result<Value, ProviderApiError> {
            Ok(Value::Null)
        }

        fn verify_signature(&self, _: &str, _: &str) -> bool {
            false
        }

        fn decode_payload(&self, _: &str) -> Result<Value, ProviderApiError> {
            Ok(Value::Null)
        }
    }

    struct NoPartsPay;

    impl PartsPayGateway for NoPartsPay {
        async fn hold(&self, _: &PartsPayHoldRequest) -> Result<HoldResponse, ProviderApiError> {
            Ok(HoldResponse::default())
        }

        async fn confirm(&self, _: &str) -> Result<ConfirmResponse, ProviderApiError> {
            Ok(ConfirmResponse::default())
        }

        fn redirect_url(&self, _: &str) -> String {
            String::new()
        }

        fn verify_callback(&self, _: &PartsPayCallback) -> bool {
            false
        }
    }

    fn context() -> PaymentContext<NoCardHold, NoPartsPay> {
        PaymentContext::new(NoCardHold, NoPartsPay)
    }

    #[test]
    fn initiators_are_resolved_by_method_slug() {
        let ctx = context();
        assert!(matches!(ctx.resolve_initiator("p2p"), Initiator::CardHold(_)));
        assert!(matches!(ctx.resolve_initiator("parts_pay"), Initiator::PartsPay(_)));
        for slug in ["cash", "cod", "to_card", "pay-in", "anything-else", ""] {
            assert!(matches!(ctx.resolve_initiator(slug), Initiator::Default(_)), "{slug}");
        }
    }

    #[test]
    fn accepters_are_resolved_by_provider_tag() {
        let ctx = context();
        assert!(matches!(ctx.resolve_accepter("liqpay"), Ok(Accepter::CardHold(_))));
        assert!(matches!(ctx.resolve_accepter("privat_parts_pay"), Ok(Accepter::PartsPay(_))));
        assert_eq!(ctx.resolve_accepter("none").err(), Some(ResolveError::NoAcceptCapability("none".into())));
        // method slugs are not provider tags
        assert!(ctx.resolve_accepter("p2p").is_err());
        assert!(ctx.resolve_accepter("").is_err());
    }

    #[test]
    fn callback_handlers_are_resolved_by_provider_tag() {
        let ctx = context();
        assert!(matches!(ctx.resolve_callback_handler("liqpay"), Ok(CallbackHandler::CardHold(_))));
        assert!(matches!(ctx.resolve_callback_handler("privat_parts_pay"), Ok(CallbackHandler::PartsPay(_))));
        assert_eq!(
            ctx.resolve_callback_handler("parts_pay").err(),
            Some(ResolveError::NoCallbackCapability("parts_pay".into()))
        );
    }
}

use thiserror::Error;

use crate::{
    checkout_api::forms::FormErrors,
    db_types::{OrderId, PaymentStatus},
    payment_context::ResolveError,
    strategies::StrategyError,
    traits::CheckoutDatabaseError,
};

/// The broad category of a [`CheckoutError`]. Callers use this to decide how to report the failure without matching
/// on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input: invalid form, unknown method or provider, forged or malformed callback
    Input,
    /// The request is valid, but the order is not in a state that allows it
    Guard,
    /// The order or payment does not exist
    NotFound,
    /// The payment provider failed or answered with something we do not understand
    Provider,
    /// Storage failure
    Persistence,
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("[{operation}] Invalid form. {errors}")]
    InvalidForm { operation: &'static str, errors: FormErrors },
    #[error("[create order] {submitted} items were submitted, but only {found} were found in the catalog")]
    ItemCountMismatch { submitted: usize, found: usize },
    #[error("[create order] Unknown delivery method '{0}'")]
    UnknownDeliveryMethod(String),
    #[error("[create order] Unknown payment method '{0}'")]
    UnknownPaymentMethod(String),
    #[error("[init payment] Cannot start a payment for order #{order_id} with payment status '{status}'")]
    PaymentNotAllowed { order_id: OrderId, status: PaymentStatus },
    #[error("[{operation}] Order #{order_id} does not exist")]
    OrderNotFound { operation: &'static str, order_id: OrderId },
    #[error("[{operation}] Payment {transaction_id} does not exist")]
    PaymentNotFound { operation: &'static str, transaction_id: String },
    #[error("[{operation}] {source}")]
    Unresolved { operation: &'static str, source: ResolveError },
    #[error("[provider callback] Payment {transaction_id} was initiated with '{expected}', not '{provider}'")]
    ProviderMismatch { transaction_id: String, provider: String, expected: String },
    #[error("[provider callback] Invalid signature on a callback from '{provider}'")]
    InvalidSignature { provider: String },
    #[error("[provider callback] Malformed callback from '{provider}'. {reason}")]
    MalformedCallback { provider: String, reason: String },
    #[error("[{operation}] {context}: {source}")]
    Provider { operation: &'static str, context: String, source: StrategyError },
    #[error("[{operation}] {context}: {source}")]
    Persistence { operation: &'static str, context: String, source: CheckoutDatabaseError },
}

impl CheckoutError {
    pub fn kind(&self) -> ErrorKind {
        use CheckoutError::*;
        match self {
            InvalidForm { .. } |
            ItemCountMismatch { .. } |
            UnknownDeliveryMethod(_) |
            UnknownPaymentMethod(_) |
            Unresolved { .. } |
            InvalidSignature { .. } |
            MalformedCallback { .. } => ErrorKind::Input,
            PaymentNotAllowed { .. } | ProviderMismatch { .. } => ErrorKind::Guard,
            OrderNotFound { .. } | PaymentNotFound { .. } => ErrorKind::NotFound,
            Provider { .. } => ErrorKind::Provider,
            Persistence { .. } => ErrorKind::Persistence,
        }
    }

    pub(crate) fn persistence<C: Into<String>>(
        operation: &'static str,
        context: C,
    ) -> impl FnOnce(CheckoutDatabaseError) -> Self {
        let context = context.into();
        move |source| CheckoutError::Persistence { operation, context, source }
    }

    pub(crate) fn provider<C: Into<String>>(operation: &'static str, context: C) -> impl FnOnce(StrategyError) -> Self {
        let context = context.into();
        move |source| CheckoutError::Provider { operation, context, source }
    }
}

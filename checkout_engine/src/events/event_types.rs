use crate::db_types::{Order, Payment};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCreatedEvent {
    pub order: Order,
}

impl OrderCreatedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentCreatedEvent {
    pub order: Order,
    pub payment: Payment,
}

impl PaymentCreatedEvent {
    pub fn new(order: Order, payment: Payment) -> Self {
        Self { order, payment }
    }
}

/// Emitted whenever a payment's status changes, whether through an explicit accept call or a provider callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentAcceptedEvent {
    pub order: Order,
    pub payment: Payment,
}

impl PaymentAcceptedEvent {
    pub fn new(order: Order, payment: Payment) -> Self {
        Self { order, payment }
    }
}

use std::{future::Future, pin::Pin, sync::Arc};

use log::*;

use crate::events::{
    EventHandler,
    EventProducer,
    Handler,
    OrderCreatedEvent,
    PaymentAcceptedEvent,
    PaymentCreatedEvent,
};

pub type HookFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

#[derive(Default, Clone)]
pub struct EventProducers {
    pub order_created_producer: Vec<EventProducer<OrderCreatedEvent>>,
    pub payment_created_producer: Vec<EventProducer<PaymentCreatedEvent>>,
    pub payment_accepted_producer: Vec<EventProducer<PaymentAcceptedEvent>>,
}

impl EventProducers {
    pub fn publish_order_created(&self, event: OrderCreatedEvent) {
        for producer in &self.order_created_producer {
            producer.publish_event(event.clone());
        }
    }

    pub fn publish_payment_created(&self, event: PaymentCreatedEvent) {
        for producer in &self.payment_created_producer {
            producer.publish_event(event.clone());
        }
    }

    pub fn publish_payment_accepted(&self, event: PaymentAcceptedEvent) {
        for producer in &self.payment_accepted_producer {
            producer.publish_event(event.clone());
        }
    }
}

pub struct EventHandlers {
    pub on_order_created: Option<EventHandler<OrderCreatedEvent>>,
    pub on_payment_created: Option<EventHandler<PaymentCreatedEvent>>,
    pub on_payment_accepted: Option<EventHandler<PaymentAcceptedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_order_created = hooks.on_order_created.map(|f| EventHandler::new(buffer_size, f));
        let on_payment_created = hooks.on_payment_created.map(|f| EventHandler::new(buffer_size, f));
        let on_payment_accepted = hooks.on_payment_accepted.map(|f| EventHandler::new(buffer_size, f));
        Self { on_order_created, on_payment_created, on_payment_accepted }
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_order_created {
            result.order_created_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_payment_created {
            result.payment_created_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_payment_accepted {
            result.payment_accepted_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns a background task per registered handler. Each task runs until every producer has been dropped.
    pub fn start_handlers(self) {
        if let Some(handler) = self.on_order_created {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_payment_created {
            tokio::spawn(handler.start_handler());
        }
        if let Some(handler) = self.on_payment_accepted {
            tokio::spawn(handler.start_handler());
        }
        debug!("📬️ Event handlers started");
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_order_created: Option<Handler<OrderCreatedEvent>>,
    pub on_payment_created: Option<Handler<PaymentCreatedEvent>>,
    pub on_payment_accepted: Option<Handler<PaymentAcceptedEvent>>,
}

impl EventHooks {
    pub fn on_order_created<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(OrderCreatedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_order_created = Some(Arc::new(f));
        self
    }

    pub fn on_payment_created<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PaymentCreatedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_payment_created = Some(Arc::new(f));
        self
    }

    pub fn on_payment_accepted<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(PaymentAcceptedEvent) -> HookFuture) + Send + Sync + 'static {
        self.on_payment_accepted = Some(Arc::new(f));
        self
    }
}

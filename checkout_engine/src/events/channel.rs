//! Bounded, fire-and-forget event queues
//!
//! Components of the checkout subscribe to lifecycle events (order created, payment created, payment accepted) and
//! react to them, typically by notifying the customer or the shop staff. Handlers only see the event itself.
//!
//! Publishing never blocks the caller. Each handler has a bounded queue; when it is full (or the handler has shut
//! down) the event is dropped and the loss is logged.
use std::{future::Future, pin::Pin, sync::Arc};

use log::*;
use tokio::{
    sync::{mpsc, mpsc::error::TrySendError},
    task::JoinSet,
};

pub type Handler<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Owns the receiving end of an event queue and the hook that consumes it.
pub struct EventHandler<E: Send + Sync + 'static> {
    queue: mpsc::Receiver<E>,
    // Kept so producers can be handed out before the handler starts. Dropped on start.
    template: mpsc::Sender<E>,
    handler: Handler<E>,
}

impl<E: Send + Sync + 'static> EventHandler<E> {
    pub fn new(buffer_size: usize, handler: Handler<E>) -> Self {
        let (template, queue) = mpsc::channel(buffer_size.max(1));
        Self { queue, template, handler }
    }

    pub fn subscribe(&self) -> EventProducer<E> {
        EventProducer::new(self.template.clone())
    }

    /// Drains the queue until every producer has been dropped, then waits for the hooks still in flight.
    pub async fn start_handler(self) {
        let Self { mut queue, template, handler } = self;
        drop(template);
        debug!("📬️ Event handler started");
        let mut in_flight = JoinSet::new();
        while let Some(event) = queue.recv().await {
            trace!("📬️ Dispatching event");
            in_flight.spawn((handler)(event));
            // reap finished hooks so the set does not grow without bound
            while let Some(done) = in_flight.try_join_next() {
                report(done);
            }
        }
        if !in_flight.is_empty() {
            debug!("📬️ All producers are gone. Waiting for {} hooks to finish", in_flight.len());
        }
        while let Some(done) = in_flight.join_next().await {
            report(done);
        }
        debug!("📬️ Event handler has shut down");
    }
}

fn report(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!("📬️ An event hook panicked or was cancelled. {e}");
    }
}

#[derive(Clone)]
pub struct EventProducer<E: Send + Sync> {
    sender: mpsc::Sender<E>,
}

impl<E: Send + Sync> EventProducer<E> {
    pub fn new(sender: mpsc::Sender<E>) -> Self {
        Self { sender }
    }

    /// Queues the event for the handler without waiting. Returns `false` if the event was dropped.
    pub fn publish_event(&self, event: E) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("📬️ Event queue is full. The event has been dropped.");
                false
            },
            Err(TrySendError::Closed(_)) => {
                error!("📬️ Event handler has shut down. The event has been dropped.");
                false
            },
        }
    }
}

//! Customer and staff notifications.
//!
//! The engine publishes events when orders and payments are created and when a payment changes status. This module
//! turns those events into short texts: SMS messages for the customer and chat messages for the shop staff. Delivery
//! of the texts is not handled here. The hooks from [`Notifier::hooks`] write every message to the `checkout::notify`
//! log target, where a log shipper or a sidecar can pick them up.
use std::{fmt::Display, sync::Arc};

use checkout_common::Cents;
use checkout_engine::{
    db_types::{payment_method_slug, Order, Payment, PaymentStatus},
    events::{EventHooks, HookFuture, OrderCreatedEvent, PaymentAcceptedEvent, PaymentCreatedEvent},
};
use log::*;

use crate::config::NotificationConfig;

pub const NOTIFY_LOG_TARGET: &str = "checkout::notify";

/// Renders amounts of money for humans, e.g. `1234.50 UAH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyFormat {
    currency: String,
}

impl MoneyFormat {
    pub fn new<S: Into<String>>(currency: S) -> Self {
        Self { currency: currency.into() }
    }

    pub fn format(&self, amount: Cents) -> String {
        format!("{} {}", amount.to_decimal_string(), self.currency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    Sms { phone: String },
    StaffChat,
}

impl Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Channel::Sms { phone } => write!(f, "sms:{phone}"),
            Channel::StaffChat => write!(f, "staff-chat"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: Channel,
    pub text: String,
}

impl Notification {
    pub fn sms<S: Into<String>>(phone: &str, text: S) -> Self {
        Self { channel: Channel::Sms { phone: phone.to_string() }, text: text.into() }
    }

    pub fn staff<S: Into<String>>(text: S) -> Self {
        Self { channel: Channel::StaffChat, text: text.into() }
    }
}

pub struct Notifier {
    config: NotificationConfig,
    money: MoneyFormat,
}

impl Notifier {
    pub fn new(config: NotificationConfig) -> Self {
        let money = MoneyFormat::new(config.currency.clone());
        Self { config, money }
    }

    /// Registers a hook for every checkout event. Each hook builds the messages for its event and logs them.
    pub fn hooks(self) -> EventHooks {
        let notifier = Arc::new(self);
        let mut hooks = EventHooks::default();
        let n = Arc::clone(&notifier);
        hooks.on_order_created(move |ev: OrderCreatedEvent| -> HookFuture {
            let messages = n.order_created(&ev.order);
            Box::pin(async move { dispatch(messages) })
        });
        let n = Arc::clone(&notifier);
        hooks.on_payment_created(move |ev: PaymentCreatedEvent| -> HookFuture {
            let messages = n.payment_created(&ev.order, &ev.payment);
            Box::pin(async move { dispatch(messages) })
        });
        let n = notifier;
        hooks.on_payment_accepted(move |ev: PaymentAcceptedEvent| -> HookFuture {
            let messages = n.payment_status_updated(&ev.order, &ev.payment);
            Box::pin(async move { dispatch(messages) })
        });
        hooks
    }

    pub fn order_created(&self, order: &Order) -> Vec<Notification> {
        let mut sms = format!("Your order #{} has been accepted for processing.", order.id);
        if !order.do_not_call {
            sms.push_str(" We will call you shortly.");
        }
        let mut staff = format!("*New order created:* [{}]({})", order.id, self.order_link(order));
        if order.do_not_call {
            staff.push_str(" _DO NOT CALL_");
        }
        staff.push_str(&self.customer_block(order));
        staff.push_str(&self.summary_block(order, "Summary", false));
        staff.push_str("\n_Items_\n");
        for item in &order.items {
            staff.push_str(&format!(
                "[{}]({}) _{}_\tcost: _{}_\n",
                item.product.name,
                self.product_link(item.product.id),
                item.quantity,
                self.money.format(item.price.amount)
            ));
        }
        if !order.comment.is_empty() {
            staff.push_str(&format!("\n_Comment_\n{}", order.comment));
        }
        vec![Notification::sms(&order.customer.phone, sms), Notification::staff(staff)]
    }

    /// Only card transfers need instructions. Every other method is either settled offline or on the provider's page.
    pub fn payment_created(&self, order: &Order, _payment: &Payment) -> Vec<Notification> {
        if order.payment.method.slug != payment_method_slug::TO_CARD {
            return Vec::new();
        }
        let sms = format!(
            "To pay for order #{}, transfer {} to card {}.",
            order.id,
            self.money.format(order.total_cost.amount),
            self.config.card_number
        );
        vec![Notification::sms(&order.customer.phone, sms)]
    }

    pub fn payment_status_updated(&self, order: &Order, payment: &Payment) -> Vec<Notification> {
        let headline = match payment.status {
            PaymentStatus::WaitingConfirmation => "*Customer paid order and waiting confirmation:*",
            PaymentStatus::Done => "*Payment accepted and successful for order:*",
            PaymentStatus::Failed => "*Payment was failed:*",
            _ => return Vec::new(),
        };
        let mut staff = format!("{headline} [{}]({})", order.id, self.order_link(order));
        staff.push_str(&self.customer_block(order));
        staff.push_str(&self.summary_block(order, "Order info", true));
        let mut messages = vec![Notification::staff(staff)];
        let phone = &order.customer.phone;
        match payment.status {
            PaymentStatus::Done => {
                messages.push(Notification::sms(phone, format!("Your order #{} has been paid.", order.id)))
            },
            PaymentStatus::Failed => messages.push(Notification::sms(
                phone,
                format!("Your order #{} was not paid. We will call you shortly.", order.id),
            )),
            _ => {},
        }
        messages
    }

    fn order_link(&self, order: &Order) -> String {
        self.config.order_link_mask.replace("{id}", &order.id.to_string())
    }

    fn product_link(&self, product_id: i64) -> String {
        self.config.product_link_mask.replace("{id}", &product_id.to_string())
    }

    fn customer_block(&self, order: &Order) -> String {
        format!("\n_Customer_\n{}\n{}\n", order.customer.phone, order.customer.name)
    }

    fn summary_block(&self, order: &Order, title: &str, with_status: bool) -> String {
        let mut block = format!("\n_{title}_\n");
        block.push_str(&format!("total items: _{}_\n", order.items.len()));
        block.push_str(&format!("total cost: _{}_\n", self.money.format(order.total_cost.amount)));
        block.push_str(&format!("delivery: _{}_\n", order.delivery.method.name));
        block.push_str(&format!("payment: _{}_\n", order.payment.method.name));
        if with_status {
            block.push_str(&format!("status: _{}_\n", order.payment_status().label()));
        }
        block
    }
}

fn dispatch(messages: Vec<Notification>) {
    for message in messages {
        info!(target: NOTIFY_LOG_TARGET, "[{}] {}", message.channel, message.text);
    }
}

use std::fmt::Display;

use checkout_common::{Cents, DEFAULT_CURRENCY_CODE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

pub type OrderId = i64;

/// The comment attached to the first history entry of every order.
pub const NEW_ORDER_COMMENT: &str = "new order";

//--------------------------------------       Price          ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalePrice {
    pub amount: Cents,
    /// The sale price applies when at least this many units are bought
    pub min_quantity: u32,
}

/// An amount of money in a currency, with an optional quantity-tiered sale price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub amount: Cents,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale: Option<SalePrice>,
}

impl Price {
    pub fn new<C: Into<String>>(amount: Cents, currency: C) -> Self {
        Self { amount, currency: currency.into(), sale: None }
    }

    /// A price in the default currency
    pub fn from_cents(amount: i64) -> Self {
        Self::new(Cents::from(amount), DEFAULT_CURRENCY_CODE)
    }

    pub fn with_sale(mut self, amount: Cents, min_quantity: u32) -> Self {
        self.sale = Some(SalePrice { amount, min_quantity });
        self
    }

    /// The unit price that applies when buying `quantity` units.
    pub fn for_quantity(&self, quantity: u32) -> Cents {
        match &self.sale {
            Some(sale) if sale.min_quantity > 0 && quantity >= sale.min_quantity => sale.amount,
            _ => self.amount,
        }
    }

    /// The cost of `quantity` units, or `None` if it overflows.
    pub fn line_total(&self, quantity: u32) -> Option<Cents> {
        self.for_quantity(quantity).checked_mul(i64::from(quantity))
    }

    /// A flat price snapshot (no sale tier) of the unit price for `quantity` units.
    pub fn snapshot_for_quantity(&self, quantity: u32) -> Price {
        Price::new(self.for_quantity(quantity), self.currency.clone())
    }
}

impl Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}

//--------------------------------------      Statuses        ---------------------------------------------------------
#[derive(Debug, Clone, Error)]
#[error("{0} is not a valid {1} status code")]
pub struct StatusConversionError(pub i64, pub &'static str);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum DeliveryStatus {
    New = 1,
    Check = 2,
    WaitingDelivery = 3,
    Delivery = 4,
    ReadyToReceive = 5,
    Canceled = 6,
}

impl DeliveryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryStatus::New => "New",
            DeliveryStatus::Check => "Check",
            DeliveryStatus::WaitingDelivery => "Waiting delivery",
            DeliveryStatus::Delivery => "Delivery",
            DeliveryStatus::ReadyToReceive => "Ready to receive",
            DeliveryStatus::Canceled => "Canceled",
        }
    }
}

impl From<DeliveryStatus> for i64 {
    fn from(value: DeliveryStatus) -> Self {
        value as i64
    }
}

impl TryFrom<i64> for DeliveryStatus {
    type Error = StatusConversionError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::New),
            2 => Ok(Self::Check),
            3 => Ok(Self::WaitingDelivery),
            4 => Ok(Self::Delivery),
            5 => Ok(Self::ReadyToReceive),
            6 => Ok(Self::Canceled),
            v => Err(StatusConversionError(v, "delivery")),
        }
    }
}

impl Display for DeliveryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Payment status. Used both on [`Payment`] records and on the order's payment history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum PaymentStatus {
    New = 1,
    WaitingConfirmation = 2,
    Confirmed = 3,
    Pending = 4,
    Done = 5,
    Refund = 6,
    Failed = 7,
    Canceled = 8,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::New => "New",
            PaymentStatus::WaitingConfirmation => "Waiting confirmation",
            PaymentStatus::Confirmed => "Confirmed",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Done => "Done",
            PaymentStatus::Refund => "Refund",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Canceled => "Canceled",
        }
    }

    /// Settled payments. Provider callbacks can no longer change them.
    pub fn is_final(&self) -> bool {
        matches!(self, PaymentStatus::Done | PaymentStatus::Refund | PaymentStatus::Canceled)
    }
}

impl From<PaymentStatus> for i64 {
    fn from(value: PaymentStatus) -> Self {
        value as i64
    }
}

impl TryFrom<i64> for PaymentStatus {
    type Error = StatusConversionError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::New),
            2 => Ok(Self::WaitingConfirmation),
            3 => Ok(Self::Confirmed),
            4 => Ok(Self::Pending),
            5 => Ok(Self::Done),
            6 => Ok(Self::Refund),
            7 => Ok(Self::Failed),
            8 => Ok(Self::Canceled),
            v => Err(StatusConversionError(v, "payment")),
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

//--------------------------------------   Status history     ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange<S> {
    pub status: S,
    /// Unix timestamp, in seconds
    pub timestamp: i64,
    pub comment: String,
}

/// An append-only, never-empty list of status changes. The current status is always that of the last entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusHistory<S> {
    entries: Vec<StatusChange<S>>,
}

#[allow(clippy::len_without_is_empty)]
impl<S: Copy> StatusHistory<S> {
    pub fn new<C: Into<String>>(status: S, timestamp: i64, comment: C) -> Self {
        Self { entries: vec![StatusChange { status, timestamp, comment: comment.into() }] }
    }

    pub fn current(&self) -> S {
        self.last().status
    }

    pub fn last(&self) -> &StatusChange<S> {
        // The constructor and the deserializer both guarantee at least one entry
        &self.entries[self.entries.len() - 1]
    }

    pub fn push<C: Into<String>>(&mut self, status: S, timestamp: i64, comment: C) {
        self.entries.push(StatusChange { status, timestamp, comment: comment.into() });
    }

    pub fn entries(&self) -> &[StatusChange<S>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<'de, S: Deserialize<'de>> Deserialize<'de> for StatusHistory<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<StatusChange<S>>::deserialize(deserializer)?;
        if entries.is_empty() {
            return Err(serde::de::Error::custom("a status history must contain at least one entry"));
        }
        Ok(Self { entries })
    }
}

//--------------------------------------   Catalog entities   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryMethod {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

/// Payment method slugs understood by the checkout.
pub mod payment_method_slug {
    pub const CASH: &str = "cash";
    pub const P2P: &str = "p2p";
    pub const PAY_IN: &str = "pay-in";
    pub const CASH_ON_DELIVERY: &str = "cod";
    pub const TO_CARD: &str = "to_card";
    pub const PARTS_PAY: &str = "parts_pay";
}

/// A snapshot of a catalog product, as copied onto an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub price: Price,
}

//--------------------------------------        Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub code: String,
    pub name: String,
    /// The customer typed the address in themselves, so it is not in the carrier's catalog
    pub custom: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub city: City,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDelivery {
    pub method: DeliveryMethod,
    pub warehouse: Warehouse,
    pub history: StatusHistory<DeliveryStatus>,
}

impl OrderDelivery {
    pub fn status(&self) -> DeliveryStatus {
        self.history.current()
    }
}

/// Fields that only some payment methods need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentExtra {
    /// Bank-transfer invoices: the paying company
    #[serde(default)]
    pub company: String,
    /// Bank-transfer invoices: the company's tax registration number
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub email: String,
    /// Installments: how many parts to split the payment into
    #[serde(default)]
    pub parts_count: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPayment {
    pub method: PaymentMethod,
    pub history: StatusHistory<PaymentStatus>,
    pub extra: PaymentExtra,
}

impl OrderPayment {
    pub fn status(&self) -> PaymentStatus {
        self.history.current()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub quantity: u32,
    /// The unit price at the time the order was placed
    pub price: Price,
    pub product: ProductSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub comment: String,
    pub do_not_call: bool,
    /// Fixed when the order is created. It is never recomputed from the line items.
    pub total_cost: Price,
    pub customer: Customer,
    pub delivery: OrderDelivery,
    pub payment: OrderPayment,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Builds the order for a freshly allocated id, seeding both status histories with a single `New` entry dated at
    /// the order's creation time.
    pub fn from_new_order(id: OrderId, order: NewOrder) -> Self {
        let created = order.created_at.timestamp();
        let delivery = OrderDelivery {
            method: order.delivery_method,
            warehouse: order.warehouse,
            history: StatusHistory::new(DeliveryStatus::New, created, NEW_ORDER_COMMENT),
        };
        let payment = OrderPayment {
            method: order.payment_method,
            history: StatusHistory::new(PaymentStatus::New, created, NEW_ORDER_COMMENT),
            extra: order.payment_extra,
        };
        Self {
            id,
            created_at: order.created_at,
            comment: order.comment,
            do_not_call: order.do_not_call,
            total_cost: order.total_cost,
            customer: order.customer,
            delivery,
            payment,
            items: order.items,
        }
    }

    pub fn payment_status(&self) -> PaymentStatus {
        self.payment.status()
    }

    pub fn delivery_status(&self) -> DeliveryStatus {
        self.delivery.status()
    }

    /// A new payment may only be started while no payment is in flight or completed.
    pub fn can_make_payment(&self) -> bool {
        matches!(self.payment_status(), PaymentStatus::New | PaymentStatus::Failed)
    }

    pub fn update_payment_status<C: Into<String>>(&mut self, status: PaymentStatus, timestamp: i64, comment: C) {
        self.payment.history.push(status, timestamp, comment);
    }

    pub fn update_delivery_status<C: Into<String>>(&mut self, status: DeliveryStatus, timestamp: i64, comment: C) {
        self.delivery.history.push(status, timestamp, comment);
    }
}

/// Everything needed to create an order, except the id, which the order repository allocates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub created_at: DateTime<Utc>,
    pub comment: String,
    pub do_not_call: bool,
    pub total_cost: Price,
    pub customer: Customer,
    pub delivery_method: DeliveryMethod,
    pub warehouse: Warehouse,
    pub payment_method: PaymentMethod,
    pub payment_extra: PaymentExtra,
    pub items: Vec<OrderItem>,
}

//--------------------------------------       Payment        ---------------------------------------------------------
/// The provider tag of a payment that has not been initiated with any provider yet.
pub const NO_PROVIDER: &str = "";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    /// The public reference for this payment. Providers correlate their callbacks using this value.
    pub transaction_id: String,
    pub order_id: OrderId,
    /// The integration that handles this payment. Empty until a provider has accepted the payment initiation.
    pub provider: String,
    pub price: Price,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new payment attempt for the order, with a freshly generated transaction id.
    pub fn new_for_order(id: i64, order: &Order) -> Self {
        let now = Utc::now();
        Self {
            id,
            transaction_id: uuid::Uuid::new_v4().to_string(),
            order_id: order.id,
            provider: NO_PROVIDER.to_string(),
            price: order.total_cost.clone(),
            status: PaymentStatus::New,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn description(&self) -> String {
        format!("Payment for order #{}", self.order_id)
    }

    pub fn set_provider<S: Into<String>>(&mut self, provider: S) {
        self.provider = provider.into();
        self.updated_at = Utc::now();
    }

    pub fn update_status(&mut self, status: PaymentStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

//--------------------------------------    Initiation        ---------------------------------------------------------
/// What the customer has to do next to complete a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitAction {
    /// Nothing. The payment is settled offline.
    None,
    /// Submit the HTML form in the resource
    Form,
    /// Follow the URL in the resource
    Redirect,
}

impl Display for InitAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitAction::None => write!(f, "none"),
            InitAction::Form => write!(f, "form"),
            InitAction::Redirect => write!(f, "redirect"),
        }
    }
}

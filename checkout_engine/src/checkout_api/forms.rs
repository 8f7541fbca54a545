//! Request payloads of the checkout operations, and their validation.
use std::{fmt::Display, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::db_types::{payment_method_slug, OrderId};

const PHONE_PATTERN: &str = r"^\+?[0-9 ()-]{7,20}$";
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

fn matches(cell: &'static OnceLock<Option<Regex>>, pattern: &str, value: &str) -> bool {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref().is_some_and(|re| re.is_match(value))
}

fn is_valid_phone(phone: &str) -> bool {
    static PHONE: OnceLock<Option<Regex>> = OnceLock::new();
    matches(&PHONE, PHONE_PATTERN, phone)
}

fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    matches(&EMAIL, EMAIL_PATTERN, email)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientForm {
    /// Full name
    pub fio: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceForm {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryForm {
    pub method: String,
    pub city: PlaceForm,
    pub address: PlaceForm,
    #[serde(default)]
    pub custom_address: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentForm {
    pub method: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub parts_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemForm {
    pub product_id: i64,
    pub count: i64,
    /// The unit price the customer saw, in cents
    pub price: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderForm {
    /// Total order cost in cents, as shown to the customer
    pub cost: i64,
    pub items: Vec<OrderItemForm>,
}

/// The submitted cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub client: ClientForm,
    pub delivery: DeliveryForm,
    pub payment: PaymentForm,
    pub order: OrderForm,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub do_not_call: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormErrors(pub Vec<String>);

impl Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("; "))
    }
}

impl CheckoutForm {
    /// Checks the form without consulting any catalog. All problems are reported at once.
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = Vec::new();
        if self.client.fio.trim().is_empty() {
            errors.push("client name is required".to_string());
        }
        if self.client.phone.trim().is_empty() {
            errors.push("client phone is required".to_string());
        } else if !is_valid_phone(self.client.phone.trim()) {
            errors.push(format!("'{}' is not a valid phone number", self.client.phone));
        }
        if self.delivery.method.trim().is_empty() {
            errors.push("delivery method is required".to_string());
        }
        if self.delivery.city.code.trim().is_empty() || self.delivery.city.name.trim().is_empty() {
            errors.push("delivery city code and name are required".to_string());
        }
        if self.delivery.address.name.trim().is_empty() {
            errors.push("delivery address is required".to_string());
        }
        self.validate_payment(&mut errors);
        if self.order.cost < 1 {
            errors.push("order cost must be positive".to_string());
        }
        if self.order.items.is_empty() {
            errors.push("the order has no items".to_string());
        }
        for (i, item) in self.order.items.iter().enumerate() {
            if item.product_id < 1 {
                errors.push(format!("item {i}: invalid product id {}", item.product_id));
            }
            if item.count < 1 || item.count > i64::from(u32::MAX) {
                errors.push(format!("item {i}: invalid quantity {}", item.count));
            }
            if item.price < 1 {
                errors.push(format!("item {i}: price must be positive"));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(FormErrors(errors))
        }
    }

    fn validate_payment(&self, errors: &mut Vec<String>) {
        let payment = &self.payment;
        match payment.method.trim() {
            "" => errors.push("payment method is required".to_string()),
            payment_method_slug::PAY_IN => {
                if payment.company.trim().is_empty() {
                    errors.push("company is required for invoice payments".to_string());
                }
                if payment.tax_id.trim().is_empty() {
                    errors.push("tax id is required for invoice payments".to_string());
                }
                if !is_valid_email(payment.email.trim()) {
                    errors.push("a valid email is required for invoice payments".to_string());
                }
            },
            payment_method_slug::PARTS_PAY => {
                if payment.parts_count.unwrap_or(0) < 1 {
                    errors.push("the number of installments is required".to_string());
                }
            },
            _ => {},
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIdForm {
    pub order_id: OrderId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIdForm {
    pub transaction_id: String,
}

use checkout_engine::forms::{CheckoutForm, ClientForm, DeliveryForm, OrderForm, OrderItemForm, PaymentForm, PlaceForm};

use super::prepare_env::Catalog;

/// Two phones and a case, paid with `payment_method`. The submitted cost (100.00) deliberately differs from the sum of
/// the line items.
pub fn cart(catalog: &Catalog, payment_method: &str) -> CheckoutForm {
    CheckoutForm {
        client: ClientForm { fio: "Olena Kovalenko".into(), phone: "+380501234567".into() },
        delivery: DeliveryForm {
            method: "courier".into(),
            city: PlaceForm { code: "kyiv".into(), name: "Kyiv".into() },
            address: PlaceForm { code: "".into(), name: "Khreshchatyk 1".into() },
            custom_address: true,
        },
        payment: PaymentForm { method: payment_method.into(), parts_count: Some(3), ..Default::default() },
        order: OrderForm {
            cost: 10_000,
            items: vec![
                OrderItemForm { product_id: catalog.phone, count: 2, price: 4_500 },
                OrderItemForm { product_id: catalog.case, count: 1, price: 2_500 },
            ],
        },
        comment: "Leave at the door".into(),
        do_not_call: true,
    }
}

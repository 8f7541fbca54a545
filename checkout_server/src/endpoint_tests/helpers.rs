use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use checkout_common::Cents;
use checkout_engine::{
    db_types::{
        Address,
        City,
        Customer,
        DeliveryMethod,
        NewOrder,
        Order,
        OrderItem,
        Payment,
        PaymentExtra,
        PaymentMethod,
        Price,
        ProductSnapshot,
        Warehouse,
    },
    events::EventProducers,
    CheckoutApi,
    PaymentContext,
};
use chrono::{TimeZone, Utc};
use log::debug;

use super::mocks::{MockCardHold, MockDatabase, MockPartsPay};
use crate::{
    routes::{
        health,
        AcceptHoldenPaymentRoute,
        CreateOrderRoute,
        InitPaymentRoute,
        OrderInfoRoute,
        ProviderCallbackRoute,
    },
    server::json_config,
};

pub type MockCheckoutApi = CheckoutApi<MockDatabase, MockCardHold, MockPartsPay>;

pub fn checkout_api(db: MockDatabase, card_hold: MockCardHold, parts_pay: MockPartsPay) -> MockCheckoutApi {
    CheckoutApi::new(db, PaymentContext::new(card_hold, parts_pay), EventProducers::default())
}

/// Registers every route against the given mocks, the same way the live server does.
pub fn configure(api: MockCheckoutApi) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg: &mut ServiceConfig| {
        cfg.app_data(web::Data::new(api))
            .app_data(json_config())
            .service(health)
            .service(CreateOrderRoute::<MockDatabase, MockCardHold, MockPartsPay>::new())
            .service(InitPaymentRoute::<MockDatabase, MockCardHold, MockPartsPay>::new())
            .service(AcceptHoldenPaymentRoute::<MockDatabase, MockCardHold, MockPartsPay>::new())
            .service(OrderInfoRoute::<MockDatabase, MockCardHold, MockPartsPay>::new())
            .service(ProviderCallbackRoute::<MockDatabase, MockCardHold, MockPartsPay>::new());
    }
}

pub async fn post_request(
    path: &str,
    content_type: &str,
    body: &str,
    configure: impl FnOnce(&mut ServiceConfig),
) -> (StatusCode, String) {
    let req = TestRequest::post()
        .uri(path)
        .insert_header(("content-type", content_type))
        .set_payload(body.to_string())
        .to_request();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request to {path}");
    let (_, res) = test::call_service(&service, req).await.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    (status, body)
}

pub async fn post_json(path: &str, body: &str, configure: impl FnOnce(&mut ServiceConfig)) -> (StatusCode, String) {
    post_request(path, "application/json", body, configure).await
}

pub fn courier() -> DeliveryMethod {
    DeliveryMethod { id: 1, name: "Courier".into(), slug: "courier".into() }
}

pub fn payment_method(slug: &str) -> PaymentMethod {
    PaymentMethod { id: 2, name: slug.to_uppercase(), slug: slug.into() }
}

pub fn phone() -> ProductSnapshot {
    let price = Price::new(Cents::from(5_000), "UAH").with_sale(Cents::from(4_500), 2);
    ProductSnapshot { id: 11, name: "Phone".into(), slug: "phone".into(), price }
}

pub fn sample_order(id: i64, method: &str) -> Order {
    let new_order = NewOrder {
        created_at: Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
        comment: String::new(),
        do_not_call: false,
        total_cost: Price::new(Cents::from(9_000), "UAH"),
        customer: Customer { name: "Ivan Petrenko".into(), phone: "+380501234567".into() },
        delivery_method: courier(),
        warehouse: Warehouse {
            city: City { code: "kyiv".into(), name: "Kyiv".into() },
            address: Address { code: "".into(), name: "Khreshchatyk 1".into(), custom: true },
        },
        payment_method: payment_method(method),
        payment_extra: PaymentExtra { parts_count: Some(3), ..Default::default() },
        items: vec![OrderItem { quantity: 2, price: phone().price.snapshot_for_quantity(2), product: phone() }],
    };
    Order::from_new_order(id, new_order)
}

pub fn sample_payment(order: &Order, transaction_id: &str, provider: &str) -> Payment {
    let mut payment = Payment::new_for_order(1, order);
    payment.transaction_id = transaction_id.to_string();
    payment.provider = provider.to_string();
    payment
}

pub const CHECKOUT_FORM: &str = r#"{
    "client": {"fio": "Ivan Petrenko", "phone": "+380501234567"},
    "delivery": {"method": "courier", "city": {"code": "kyiv", "name": "Kyiv"}, "address": {"name": "Khreshchatyk 1"}},
    "payment": {"method": "cash"},
    "order": {"cost": 9000, "items": [{"product_id": 11, "count": 2, "price": 4500}]},
    "comment": "Ring twice"
}"#;

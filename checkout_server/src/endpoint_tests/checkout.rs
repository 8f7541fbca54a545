use actix_web::http::StatusCode;
use checkout_engine::{
    db_types::{Order, PaymentStatus},
    traits::CheckoutDatabaseError,
};
use payment_providers::ProviderApiError;
use serde_json::Value;

use super::{
    helpers::{
        checkout_api,
        configure,
        courier,
        payment_method,
        phone,
        post_json,
        sample_order,
        sample_payment,
        CHECKOUT_FORM,
    },
    mocks::{MockCardHold, MockDatabase, MockPartsPay},
};

fn no_providers() -> (MockCardHold, MockPartsPay) {
    (MockCardHold::new(), MockPartsPay::new())
}

#[actix_web::test]
async fn create_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_products_preserving_order().times(1).returning(|ids| {
        assert_eq!(ids.to_vec(), vec![11]);
        Ok(vec![phone()])
    });
    db.expect_fetch_delivery_method_by_slug().returning(|_| Ok(Some(courier())));
    db.expect_fetch_payment_method_by_slug().returning(|slug| Ok(Some(payment_method(slug))));
    db.expect_create_order().times(1).returning(|order| Ok(Order::from_new_order(17, order)));
    let (card_hold, parts_pay) = no_providers();
    let api = checkout_api(db, card_hold, parts_pay);

    let (status, body) = post_json("/checkout/create", CHECKOUT_FORM, configure(api)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let order: Order = serde_json::from_str(&body).expect("Response was not an order");
    assert_eq!(order.id, 17);
    assert_eq!(order.total_cost.amount.value(), 9000);
    assert_eq!(order.total_cost.currency, "UAH");
    assert_eq!(order.comment, "Ring twice");
    assert_eq!(order.payment.method.slug, "cash");
    assert_eq!(order.payment_status(), PaymentStatus::New);
    // the sale price applies from two units up
    assert_eq!(order.items[0].price.amount.value(), 4500);
    assert_eq!(order.items[0].quantity, 2);
}

#[actix_web::test]
async fn create_order_with_invalid_form() {
    let _ = env_logger::try_init().ok();
    // Any catalog lookup would panic, since no expectations are set
    let (card_hold, parts_pay) = no_providers();
    let api = checkout_api(MockDatabase::new(), card_hold, parts_pay);
    let form = CHECKOUT_FORM.replace(r#""fio": "Ivan Petrenko""#, r#""fio": """#);
    let (status, body) = post_json("/checkout/create", &form, configure(api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"[create order] Invalid form. client name is required"}"#);
}

#[actix_web::test]
async fn create_order_with_malformed_json() {
    let _ = env_logger::try_init().ok();
    let (card_hold, parts_pay) = no_providers();
    let api = checkout_api(MockDatabase::new(), card_hold, parts_pay);
    let (status, body) = post_json("/checkout/create", r#"{"client": "#, configure(api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.starts_with(r#"{"error":"Could not read request body: "#), "{body}");
}

#[actix_web::test]
async fn create_order_with_unknown_payment_method() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_products_preserving_order().returning(|_| Ok(vec![phone()]));
    db.expect_fetch_delivery_method_by_slug().returning(|_| Ok(Some(courier())));
    db.expect_fetch_payment_method_by_slug().returning(|_| Ok(None));
    db.expect_create_order().never();
    let (card_hold, parts_pay) = no_providers();
    let api = checkout_api(db, card_hold, parts_pay);
    let (status, body) = post_json("/checkout/create", CHECKOUT_FORM, configure(api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"[create order] Unknown payment method 'cash'"}"#);
}

#[actix_web::test]
async fn init_payment_for_missing_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_order().returning(|_| Ok(None));
    let (card_hold, parts_pay) = no_providers();
    let api = checkout_api(db, card_hold, parts_pay);
    let (status, body) = post_json("/checkout/init-payment", r#"{"order_id": 5}"#, configure(api)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, r#"{"error":"The data was not found. [init payment] Order #5 does not exist"}"#);
}

#[actix_web::test]
async fn init_payment_for_paid_order() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_order().returning(|id| {
        let mut order = sample_order(id, "p2p");
        order.update_payment_status(PaymentStatus::Done, 0, "paid");
        Ok(Some(order))
    });
    db.expect_insert_payment().never();
    let (card_hold, parts_pay) = no_providers();
    let api = checkout_api(db, card_hold, parts_pay);
    let (status, body) = post_json("/checkout/init-payment", r#"{"order_id": 5}"#, configure(api)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"[init payment] Cannot start a payment for order #5 with payment status 'Done'"}"#);
}

#[actix_web::test]
async fn init_cash_payment() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_order().returning(|id| Ok(Some(sample_order(id, "cash"))));
    db.expect_next_payment_id().times(1).returning(|| Ok(3));
    db.expect_insert_payment().times(1).withf(|p| p.provider.is_empty() && p.order_id == 5).returning(|_| Ok(()));
    db.expect_save_payment().times(1).withf(|p| p.provider == "none").returning(|_| Ok(()));
    let (card_hold, parts_pay) = no_providers();
    let api = checkout_api(db, card_hold, parts_pay);
    let (status, body) = post_json("/checkout/init-payment", r#"{"order_id": 5}"#, configure(api)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["action"], "none");
    assert_eq!(response["resource"], "");
    assert_eq!(response["order_id"], 5);
    assert_eq!(response["payment_method"], "cash");
    assert!(!response["transaction_id"].as_str().unwrap().is_empty());
}

#[actix_web::test]
async fn init_payment_when_the_provider_fails() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_order().returning(|id| Ok(Some(sample_order(id, "parts_pay"))));
    db.expect_next_payment_id().returning(|| Ok(3));
    db.expect_insert_payment().times(1).returning(|_| Ok(()));
    db.expect_save_payment().never();
    let card_hold = MockCardHold::new();
    let mut parts_pay = MockPartsPay::new();
    parts_pay
        .expect_hold()
        .times(1)
        .withf(|request| request.parts_count == 3)
        .returning(|_| Err(ProviderApiError::QueryError { status: 503, message: "Service unavailable".into() }));
    let api = checkout_api(db, card_hold, parts_pay);
    let (status, body) = post_json("/checkout/init-payment", r#"{"order_id": 5}"#, configure(api)).await;
    assert_eq!(status, StatusCode::FAILED_DEPENDENCY);
    assert!(body.contains("Service unavailable"), "{body}");
}

#[actix_web::test]
async fn accept_holden_payment() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_payment().returning(|txid| Ok(Some(sample_payment(&sample_order(5, "p2p"), txid, "liqpay"))));
    db.expect_fetch_order().returning(|id| Ok(Some(sample_order(id, "p2p"))));
    db.expect_save_payment().times(1).withf(|p| p.status == PaymentStatus::Done).returning(|_| Ok(()));
    db.expect_save_order().times(1).withf(|o| o.payment_status() == PaymentStatus::Done).returning(|_| Ok(()));
    let mut card_hold = MockCardHold::new();
    card_hold
        .expect_complete_hold()
        .times(1)
        .withf(|order_ref, amount| order_ref.to_string() == "tx-1" && amount.value() == 9000)
        .returning(|_, _| Ok(serde_json::json!({"status": "success"})));
    let api = checkout_api(db, card_hold, MockPartsPay::new());
    let (status, body) =
        post_json("/checkout/accept-holden-payment", r#"{"transaction_id": "tx-1"}"#, configure(api)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["transaction_id"], "tx-1");
    assert_eq!(response["status"], 5);
}

#[actix_web::test]
async fn backend_errors_are_not_leaked() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_payment()
        .returning(|_| Err(CheckoutDatabaseError::DatabaseError("disk I/O error at /var/lib/checkout.db".into())));
    let (card_hold, parts_pay) = no_providers();
    let api = checkout_api(db, card_hold, parts_pay);
    let (status, body) =
        post_json("/checkout/accept-holden-payment", r#"{"transaction_id": "tx-1"}"#, configure(api)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.contains("/var/lib"), "{body}");
}

#[actix_web::test]
async fn order_info() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_order().returning(|id| Ok(Some(sample_order(id, "p2p"))));
    db.expect_fetch_payments_for_order().returning(|id| {
        let order = sample_order(id, "p2p");
        Ok(vec![sample_payment(&order, "tx-1", ""), sample_payment(&order, "tx-2", "liqpay")])
    });
    let (card_hold, parts_pay) = no_providers();
    let api = checkout_api(db, card_hold, parts_pay);
    let (status, body) = post_json("/checkout/order-info", r#"{"order_id": 8}"#, configure(api)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["order"]["id"], 8);
    let payments = response["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 2);
    assert_eq!(payments[1]["provider"], "liqpay");
}

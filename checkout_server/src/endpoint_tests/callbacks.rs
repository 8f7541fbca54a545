use actix_web::http::StatusCode;
use checkout_engine::db_types::PaymentStatus;
use serde_json::json;

use super::{
    helpers::{checkout_api, configure, post_request, sample_order, sample_payment},
    mocks::{MockCardHold, MockDatabase, MockPartsPay},
};

const FORM: &str = "application/x-www-form-urlencoded";
const CALLBACK_BODY: &str = "data=eyJvcmRlcl9pZCI6InR4LTEifQ%3D%3D&signature=c2lnbmVk";

/// A card-hold gateway that accepts every signature and decodes every payload to `payload`.
fn card_hold_reporting(status: &'static str) -> MockCardHold {
    let mut card_hold = MockCardHold::new();
    card_hold.expect_verify_signature().returning(|data, signature| {
        data.to_string() == "eyJvcmRlcl9pZCI6InR4LTEifQ==" && signature.to_string() == "c2lnbmVk"
    });
    card_hold
        .expect_decode_payload()
        .returning(move |_| Ok(json!({"action": "hold", "status": status, "order_id": "tx-1"})));
    card_hold
}

fn database_with_payment(status: PaymentStatus) -> MockDatabase {
    database_with_provider_payment("liqpay", status)
}

fn database_with_provider_payment(provider: &'static str, status: PaymentStatus) -> MockDatabase {
    let mut db = MockDatabase::new();
    db.expect_fetch_payment().returning(move |txid| {
        let mut payment = sample_payment(&sample_order(5, "p2p"), txid, provider);
        payment.status = status;
        Ok(Some(payment))
    });
    db.expect_fetch_order().returning(|id| Ok(Some(sample_order(id, "p2p"))));
    db
}

#[actix_web::test]
async fn card_hold_callback_is_applied() {
    let _ = env_logger::try_init().ok();
    let mut db = database_with_payment(PaymentStatus::New);
    db.expect_save_payment()
        .times(1)
        .withf(|p| p.transaction_id == "tx-1" && p.status == PaymentStatus::WaitingConfirmation)
        .returning(|_| Ok(()));
    db.expect_save_order()
        .times(1)
        .withf(|o| {
            o.payment_status() == PaymentStatus::WaitingConfirmation &&
                o.payment.history.last().comment == "updated by callback"
        })
        .returning(|_| Ok(()));
    let api = checkout_api(db, card_hold_reporting("hold_wait"), MockPartsPay::new());
    let (status, body) = post_request("/callback/liqpay", FORM, CALLBACK_BODY, configure(api)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, r#"{"result":"applied"}"#);
}

#[actix_web::test]
async fn repeated_callback_is_acknowledged() {
    let _ = env_logger::try_init().ok();
    let mut db = database_with_payment(PaymentStatus::WaitingConfirmation);
    db.expect_save_payment().never();
    db.expect_save_order().never();
    let api = checkout_api(db, card_hold_reporting("hold_wait"), MockPartsPay::new());
    let (status, body) = post_request("/callback/liqpay", FORM, CALLBACK_BODY, configure(api)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, r#"{"result":"duplicate"}"#);
}

#[actix_web::test]
async fn callback_for_a_payment_of_another_provider() {
    let _ = env_logger::try_init().ok();
    let mut db = database_with_provider_payment("none", PaymentStatus::New);
    db.expect_save_payment().never();
    db.expect_save_order().never();
    let api = checkout_api(db, card_hold_reporting("success"), MockPartsPay::new());
    let (status, body) = post_request("/callback/liqpay", FORM, CALLBACK_BODY, configure(api)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, r#"{"error":"[provider callback] Payment tx-1 was initiated with 'none', not 'liqpay'"}"#);
}

#[actix_web::test]
async fn late_callback_for_a_settled_payment() {
    let _ = env_logger::try_init().ok();
    let mut db = database_with_payment(PaymentStatus::Done);
    db.expect_save_payment().never();
    db.expect_save_order().never();
    let api = checkout_api(db, card_hold_reporting("hold_wait"), MockPartsPay::new());
    let (status, body) = post_request("/callback/liqpay", FORM, CALLBACK_BODY, configure(api)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, r#"{"result":"ignored"}"#);
}

#[actix_web::test]
async fn forged_callback_is_rejected() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_payment().never();
    let api = checkout_api(db, card_hold_reporting("success"), MockPartsPay::new());
    let body = "data=eyJvcmRlcl9pZCI6InR4LTEifQ%3D%3D&signature=Zm9yZ2Vk";
    let (status, body) = post_request("/callback/liqpay", FORM, body, configure(api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"[provider callback] Invalid signature on a callback from 'liqpay'"}"#);
}

#[actix_web::test]
async fn callback_from_unknown_provider() {
    let _ = env_logger::try_init().ok();
    let api = checkout_api(MockDatabase::new(), MockCardHold::new(), MockPartsPay::new());
    let (status, body) = post_request("/callback/paypal", FORM, CALLBACK_BODY, configure(api)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"[provider callback] No callback capability for provider 'paypal'"}"#);
}

#[actix_web::test]
async fn installment_callback_in_intermediate_state() {
    let _ = env_logger::try_init().ok();
    let mut db = MockDatabase::new();
    db.expect_fetch_payment().returning(|txid| {
        let order = sample_order(5, "parts_pay");
        Ok(Some(sample_payment(&order, txid, "privat_parts_pay")))
    });
    db.expect_fetch_order().returning(|id| Ok(Some(sample_order(id, "parts_pay"))));
    db.expect_save_payment().never();
    let mut parts_pay = MockPartsPay::new();
    parts_pay.expect_verify_callback().returning(|cb| cb.signature == "valid");
    let api = checkout_api(db, MockCardHold::new(), parts_pay);
    let body = json!({
        "orderId": "tx-7",
        "storeId": "store-1",
        "paymentState": "CLIENT_WAIT",
        "message": "waiting for the client",
        "signature": "valid"
    });
    let (status, body) =
        post_request("/callback/privat_parts_pay", "application/json", &body.to_string(), configure(api)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body, r#"{"result":"skipped"}"#);
}

use checkout_common::Cents;
use checkout_engine::{
    db_types::{DeliveryMethod, NewOrder, Order, OrderId, Payment, PaymentMethod, ProductSnapshot},
    traits::{
        CardHoldGateway,
        CheckoutDatabase,
        CheckoutDatabaseError,
        DeliveryCatalog,
        OrderRepository,
        PartsPayGateway,
        PaymentRepository,
        ProductCatalog,
    },
};
use mockall::mock;
use payment_providers::{ConfirmResponse, HoldResponse, PartsPayCallback, PartsPayHoldRequest, ProviderApiError};
use serde_json::Value;

mock! {
    pub Database {}
    impl Clone for Database {
        fn clone(&self) -> Self;
    }
    impl OrderRepository for Database {
        async fn next_order_id(&self) -> Result<OrderId, CheckoutDatabaseError>;
        async fn create_order(&self, order: NewOrder) -> Result<Order, CheckoutDatabaseError>;
        async fn fetch_order(&self, id: OrderId) -> Result<Option<Order>, CheckoutDatabaseError>;
        async fn save_order(&self, order: &Order) -> Result<(), CheckoutDatabaseError>;
    }
    impl PaymentRepository for Database {
        async fn next_payment_id(&self) -> Result<i64, CheckoutDatabaseError>;
        async fn insert_payment(&self, payment: &Payment) -> Result<(), CheckoutDatabaseError>;
        async fn fetch_payment(&self, transaction_id: &str) -> Result<Option<Payment>, CheckoutDatabaseError>;
        async fn fetch_payments_for_order(&self, order_id: OrderId) -> Result<Vec<Payment>, CheckoutDatabaseError>;
        async fn save_payment(&self, payment: &Payment) -> Result<(), CheckoutDatabaseError>;
    }
    impl ProductCatalog for Database {
        async fn fetch_products_preserving_order(&self, ids: &[i64]) -> Result<Vec<ProductSnapshot>, CheckoutDatabaseError>;
    }
    impl DeliveryCatalog for Database {
        async fn fetch_delivery_method_by_slug(&self, slug: &str) -> Result<Option<DeliveryMethod>, CheckoutDatabaseError>;
        async fn fetch_payment_method_by_slug(&self, slug: &str) -> Result<Option<PaymentMethod>, CheckoutDatabaseError>;
    }
    impl CheckoutDatabase for Database {
        fn url(&self) -> &str;
    }
}

mock! {
    pub CardHold {}
    impl CardHoldGateway for CardHold {
        fn hold_form(&self, order_ref: &str, amount: Cents, description: &str) -> Result<String, ProviderApiError>;
        async fn complete_hold(&self, order_ref: &str, amount: Cents) -> Result<Value, ProviderApiError>;
        fn verify_signature(&self, data: &str, signature: &str) -> bool;
        fn decode_payload(&self, data: &str) -> Result<Value, ProviderApiError>;
    }
}

mock! {
    pub PartsPay {}
    impl PartsPayGateway for PartsPay {
        async fn hold(&self, request: &PartsPayHoldRequest) -> Result<HoldResponse, ProviderApiError>;
        async fn confirm(&self, order_ref: &str) -> Result<ConfirmResponse, ProviderApiError>;
        fn redirect_url(&self, token: &str) -> String;
        fn verify_callback(&self, callback: &PartsPayCallback) -> bool;
    }
}

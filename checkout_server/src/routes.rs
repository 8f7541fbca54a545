//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Every handler here awaits the checkout engine, which does its
//! database and provider I/O asynchronously, so a slow payment provider only holds up the request that is waiting on
//! it.
use actix_web::{get, http::header::CONTENT_TYPE, web, HttpRequest, HttpResponse, Responder};
use checkout_engine::{
    forms::{CheckoutForm, OrderIdForm, TransactionIdForm},
    strategies::CallbackParams,
    traits::{CardHoldGateway, CheckoutDatabase, PartsPayGateway},
    CheckoutApi,
};
use log::*;
use serde_json::json;

use crate::errors::ServerError;

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(create_order => Post "/checkout/create" impl CheckoutDatabase, CardHoldGateway, PartsPayGateway);
/// Turns the submitted cart into an order.
///
/// The body is a [`CheckoutForm`]. On success the new order is returned, with both its delivery and payment status
/// set to `New`.
pub async fn create_order<B, C, P>(
    body: web::Json<CheckoutForm>,
    api: web::Data<CheckoutApi<B, C, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    C: CardHoldGateway,
    P: PartsPayGateway,
{
    let form = body.into_inner();
    debug!("💻️ Create order request from {} for {} items", form.client.phone, form.order.items.len());
    let order = api.create_order(form).await.map_err(|e| {
        debug!("💻️ Could not create order. {e}");
        e
    })?;
    info!("💻️ Order #{} created", order.id);
    Ok(HttpResponse::Ok().json(order))
}

route!(init_payment => Post "/checkout/init-payment" impl CheckoutDatabase, CardHoldGateway, PartsPayGateway);
/// Starts a payment for an order. The response tells the storefront what to do next: nothing, submit a form, or
/// redirect the customer to the provider. See [`checkout_engine::InitPaymentResponse`].
pub async fn init_payment<B, C, P>(
    body: web::Json<OrderIdForm>,
    api: web::Data<CheckoutApi<B, C, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    C: CardHoldGateway,
    P: PartsPayGateway,
{
    let OrderIdForm { order_id } = body.into_inner();
    debug!("💻️ Init payment request for order #{order_id}");
    let response = api.init_payment(order_id).await.map_err(|e| {
        debug!("💻️ Could not start a payment for order #{order_id}. {e}");
        e
    })?;
    Ok(HttpResponse::Ok().json(response))
}

route!(accept_holden_payment => Post "/checkout/accept-holden-payment" impl CheckoutDatabase, CardHoldGateway, PartsPayGateway);
/// Captures the funds held for a payment. This is a back-office action, taken once the order has been confirmed.
pub async fn accept_holden_payment<B, C, P>(
    body: web::Json<TransactionIdForm>,
    api: web::Data<CheckoutApi<B, C, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    C: CardHoldGateway,
    P: PartsPayGateway,
{
    let TransactionIdForm { transaction_id } = body.into_inner();
    debug!("💻️ Accept held payment request for {transaction_id}");
    let payment = api.accept_held_payment(&transaction_id).await.map_err(|e| {
        debug!("💻️ Could not accept held payment {transaction_id}. {e}");
        e
    })?;
    info!("💻️ Held payment {transaction_id} is now '{}'", payment.status);
    Ok(HttpResponse::Ok().json(payment))
}

route!(order_info => Post "/checkout/order-info" impl CheckoutDatabase, CardHoldGateway, PartsPayGateway);
pub async fn order_info<B, C, P>(
    body: web::Json<OrderIdForm>,
    api: web::Data<CheckoutApi<B, C, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    C: CardHoldGateway,
    P: PartsPayGateway,
{
    let OrderIdForm { order_id } = body.into_inner();
    trace!("💻️ Order info request for order #{order_id}");
    let info = api.order_info(order_id).await?;
    Ok(HttpResponse::Ok().json(info))
}

//----------------------------------------------   Provider webhooks  -----------------------------------------------
route!(provider_callback => Post "/callback/{provider}" impl CheckoutDatabase, CardHoldGateway, PartsPayGateway);
/// Webhook for payment provider status updates.
///
/// The body is passed to the provider's callback handler untouched, since each provider has its own format (and
/// signs the raw bytes). Providers retry until they get a 2xx, so duplicates and intermediate states are answered
/// with `200 OK` as well.
pub async fn provider_callback<B, C, P>(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Bytes,
    api: web::Data<CheckoutApi<B, C, P>>,
) -> Result<HttpResponse, ServerError>
where
    B: CheckoutDatabase,
    C: CardHoldGateway,
    P: PartsPayGateway,
{
    let provider = path.into_inner();
    let content_type = req.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default();
    debug!("💻️ Received callback from '{provider}' ({content_type}, {} bytes)", body.len());
    let params = CallbackParams::new(content_type, body.to_vec());
    let result = api.provider_callback(&provider, params).await.map_err(|e| {
        warn!("💻️ Callback from '{provider}' was rejected. {e}");
        e
    })?;
    info!("💻️ Callback from '{provider}' handled: {result:?}");
    Ok(HttpResponse::Ok().json(json!({ "result": result })))
}

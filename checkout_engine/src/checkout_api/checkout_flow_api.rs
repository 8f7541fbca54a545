use std::fmt::Debug;

use checkout_common::{Cents, DEFAULT_CURRENCY_CODE};
use chrono::Utc;
use log::*;

use crate::{
    checkout_api::{
        errors::CheckoutError,
        forms::CheckoutForm,
        objects::{CallbackResult, InitPaymentResponse, OrderInfo},
    },
    db_types::{Address, City, Customer, NewOrder, Order, OrderId, OrderItem, Payment, PaymentExtra, Price, Warehouse},
    events::{EventProducers, OrderCreatedEvent, PaymentAcceptedEvent, PaymentCreatedEvent},
    helpers::KeyedLocks,
    payment_context::PaymentContext,
    strategies::{
        AcceptHold,
        CallbackOutcome,
        CallbackParams,
        CallbackStrategy,
        InitiatePayment,
        StatusUpdate,
        StrategyError,
    },
    traits::{CardHoldGateway, CheckoutDatabase, PartsPayGateway},
};

const CREATE_ORDER: &str = "create order";
const INIT_PAYMENT: &str = "init payment";
const ACCEPT_HELD_PAYMENT: &str = "accept held payment";
const PROVIDER_CALLBACK: &str = "provider callback";
const ORDER_INFO: &str = "order info";

/// `CheckoutApi` sequences the checkout: it turns carts into orders, starts payments with the right provider, captures
/// held payments and applies provider callbacks.
///
/// Work on a single order (payment initiation) or a single payment (capture, callbacks) is serialised with in-process
/// locks, so concurrent requests for the same order or transaction cannot interleave their read-modify-write cycles.
/// Unrelated orders proceed concurrently.
pub struct CheckoutApi<B, C, P> {
    db: B,
    context: PaymentContext<C, P>,
    producers: EventProducers,
    currency: String,
    order_locks: KeyedLocks<OrderId>,
    payment_locks: KeyedLocks<String>,
}

impl<B, C, P> Debug for CheckoutApi<B, C, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi ({})", self.currency)
    }
}

impl<B, C, P> CheckoutApi<B, C, P> {
    pub fn new(db: B, context: PaymentContext<C, P>, producers: EventProducers) -> Self {
        Self {
            db,
            context,
            producers,
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            order_locks: KeyedLocks::default(),
            payment_locks: KeyedLocks::default(),
        }
    }

    /// Sets the currency that order totals are recorded in.
    pub fn with_currency<S: Into<String>>(mut self, currency: S) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, C, P> CheckoutApi<B, C, P>
where
    B: CheckoutDatabase,
    C: CardHoldGateway,
    P: PartsPayGateway,
{
    /// Turns a submitted cart into a persisted order.
    ///
    /// The catalog must know every submitted product, and both the delivery and payment methods must exist and be
    /// enabled. Nothing is written otherwise. The order total is the submitted cost; it is not recomputed from the
    /// line items.
    pub async fn create_order(&self, form: CheckoutForm) -> Result<Order, CheckoutError> {
        form.validate().map_err(|errors| CheckoutError::InvalidForm { operation: CREATE_ORDER, errors })?;
        let ids = form.order.items.iter().map(|i| i.product_id).collect::<Vec<_>>();
        let products = self
            .db
            .fetch_products_preserving_order(&ids)
            .await
            .map_err(CheckoutError::persistence(CREATE_ORDER, "fetching products"))?;
        if products.len() != ids.len() {
            warn!("🛒️ {} products were ordered, but only {} exist in the catalog", ids.len(), products.len());
            return Err(CheckoutError::ItemCountMismatch { submitted: ids.len(), found: products.len() });
        }
        let delivery_method = self
            .db
            .fetch_delivery_method_by_slug(&form.delivery.method)
            .await
            .map_err(CheckoutError::persistence(CREATE_ORDER, "fetching delivery method"))?
            .ok_or_else(|| CheckoutError::UnknownDeliveryMethod(form.delivery.method.clone()))?;
        let payment_method = self
            .db
            .fetch_payment_method_by_slug(&form.payment.method)
            .await
            .map_err(CheckoutError::persistence(CREATE_ORDER, "fetching payment method"))?
            .ok_or_else(|| CheckoutError::UnknownPaymentMethod(form.payment.method.clone()))?;
        let items = form
            .order
            .items
            .iter()
            .zip(products)
            .map(|(item, product)| {
                // validate() guarantees the count fits
                let quantity = u32::try_from(item.count).unwrap_or(1);
                OrderItem { quantity, price: product.price.snapshot_for_quantity(quantity), product }
            })
            .collect::<Vec<_>>();
        let submitted_cost = Cents::from(form.order.cost);
        match items_total(&items) {
            Some(total) if total != submitted_cost => {
                debug!("🛒️ The submitted cost ({submitted_cost}) differs from the sum of the line items ({total})")
            },
            Some(_) => {},
            None => warn!("🛒️ The line item totals overflow. Keeping the submitted cost ({submitted_cost})"),
        }
        let new_order = NewOrder {
            created_at: Utc::now(),
            comment: form.comment,
            do_not_call: form.do_not_call,
            total_cost: Price::new(submitted_cost, self.currency.clone()),
            customer: Customer { name: form.client.fio.trim().to_string(), phone: form.client.phone.trim().to_string() },
            delivery_method,
            warehouse: Warehouse {
                city: City { code: form.delivery.city.code, name: form.delivery.city.name },
                address: Address {
                    code: form.delivery.address.code,
                    name: form.delivery.address.name,
                    custom: form.delivery.custom_address,
                },
            },
            payment_method,
            payment_extra: PaymentExtra {
                company: form.payment.company,
                tax_id: form.payment.tax_id,
                email: form.payment.email,
                parts_count: form.payment.parts_count,
            },
            items,
        };
        let order =
            self.db.create_order(new_order).await.map_err(CheckoutError::persistence(CREATE_ORDER, "saving order"))?;
        info!("🛒️ Order #{} created. Total {} with {} items", order.id, order.total_cost, order.items.len());
        self.producers.publish_order_created(OrderCreatedEvent::new(order.clone()));
        Ok(order)
    }

    /// Starts a new payment attempt for the order.
    ///
    /// The payment record is stored before the provider is contacted, so a failed provider call still leaves a record
    /// of the attempt (with status `New` and no provider tag). Order state is never modified here.
    ///
    /// Attempts for the same order run one after the other, but they are not merged: since initiation leaves the
    /// order's payment status untouched, each call that passes the guard creates its own payment with its own id and
    /// transaction id. The customer completes whichever attempt they choose.
    pub async fn init_payment(&self, order_id: OrderId) -> Result<InitPaymentResponse, CheckoutError> {
        let _guard = self.order_locks.lock(&order_id).await;
        let order = self.fetch_order(INIT_PAYMENT, order_id).await?;
        if !order.can_make_payment() {
            let status = order.payment_status();
            info!("🛒️ Refusing to start a payment for order #{order_id}. Its payment status is {status}");
            return Err(CheckoutError::PaymentNotAllowed { order_id, status });
        }
        let context = format!("order #{order_id}");
        let id = self
            .db
            .next_payment_id()
            .await
            .map_err(CheckoutError::persistence(INIT_PAYMENT, context.as_str()))?;
        let mut payment = Payment::new_for_order(id, &order);
        self.db.insert_payment(&payment).await.map_err(CheckoutError::persistence(INIT_PAYMENT, context.as_str()))?;
        debug!("🛒️ Payment {} created for order #{order_id}", payment.transaction_id);
        let initiator = self.context.resolve_initiator(&order.payment.method.slug);
        let result = initiator
            .initiate(&order, &payment)
            .await
            .map_err(CheckoutError::provider(INIT_PAYMENT, format!("payment {}", payment.transaction_id)))?;
        payment.set_provider(result.provider);
        self.db
            .save_payment(&payment)
            .await
            .map_err(CheckoutError::persistence(INIT_PAYMENT, format!("payment {}", payment.transaction_id)))?;
        info!(
            "🛒️ Payment {} for order #{order_id} initiated with provider '{}'. Next action: {}",
            payment.transaction_id, payment.provider, result.action
        );
        let response = InitPaymentResponse::new(&order, &payment, result.action, result.resource);
        self.producers.publish_payment_created(PaymentCreatedEvent::new(order, payment));
        Ok(response)
    }

    /// Captures a held payment, on the merchant's request. Returns the updated payment.
    pub async fn accept_held_payment(&self, transaction_id: &str) -> Result<Payment, CheckoutError> {
        let _guard = self.payment_locks.lock(&transaction_id.to_string()).await;
        let payment = self.fetch_payment(ACCEPT_HELD_PAYMENT, transaction_id).await?;
        let order = self.fetch_order(ACCEPT_HELD_PAYMENT, payment.order_id).await?;
        let accepter = self
            .context
            .resolve_accepter(&payment.provider)
            .map_err(|source| CheckoutError::Unresolved { operation: ACCEPT_HELD_PAYMENT, source })?;
        let update = accepter
            .accept_hold(&order, &payment)
            .await
            .map_err(CheckoutError::provider(ACCEPT_HELD_PAYMENT, format!("payment {transaction_id}")))?;
        trace!("🛒️ Accept response for {transaction_id}: {}", update.raw);
        let (_, payment) = self.apply_status_update(ACCEPT_HELD_PAYMENT, order, payment, update).await?;
        Ok(payment)
    }

    /// Verifies and applies an asynchronous provider webhook.
    ///
    /// Callbacks reporting an intermediate provider state, repeated deliveries of a status the payment already has,
    /// and anything arriving after the payment is settled are acknowledged without modifying anything. A callback
    /// from a provider other than the one that initiated the payment is refused.
    pub async fn provider_callback(
        &self,
        provider: &str,
        params: CallbackParams,
    ) -> Result<CallbackResult, CheckoutError> {
        let handler = self
            .context
            .resolve_callback_handler(provider)
            .map_err(|source| CheckoutError::Unresolved { operation: PROVIDER_CALLBACK, source })?;
        let malformed = |e: StrategyError| CheckoutError::MalformedCallback {
            provider: provider.to_string(),
            reason: e.to_string(),
        };
        let callback = handler.parse_callback(&params).map_err(malformed)?;
        if !handler.validate_signature(&callback) {
            warn!("🛒️ Rejected a callback from '{provider}' with an invalid signature");
            return Err(CheckoutError::InvalidSignature { provider: provider.to_string() });
        }
        let transaction_id = handler.transaction_id(&callback).map_err(malformed)?;
        let _guard = self.payment_locks.lock(&transaction_id).await;
        let payment = self.fetch_payment(PROVIDER_CALLBACK, &transaction_id).await?;
        let order = self.fetch_order(PROVIDER_CALLBACK, payment.order_id).await?;
        if payment.provider != provider {
            warn!(
                "🛒️ Payment {transaction_id} was initiated with '{}', but '{provider}' sent a callback for it",
                payment.provider
            );
            return Err(CheckoutError::ProviderMismatch {
                transaction_id,
                provider: provider.to_string(),
                expected: payment.provider,
            });
        }
        let outcome = handler.process_callback(&callback).map_err(|e| match e {
            StrategyError::MalformedCallback(_) => malformed(e),
            e => CheckoutError::Provider {
                operation: PROVIDER_CALLBACK,
                context: format!("payment {transaction_id}"),
                source: e,
            },
        })?;
        match outcome {
            CallbackOutcome::Skip { state, raw } => {
                debug!("🛒️ Callback for {transaction_id} reports intermediate state {state}. Nothing to do.");
                trace!("🛒️ Callback payload: {raw}");
                Ok(CallbackResult::Skipped)
            },
            CallbackOutcome::Apply(update) if update.status == payment.status => {
                info!("🛒️ Payment {transaction_id} is already {}. Ignoring the repeated callback.", payment.status);
                Ok(CallbackResult::Duplicate)
            },
            CallbackOutcome::Apply(update) if payment.status.is_final() => {
                warn!(
                    "🛒️ Payment {transaction_id} is settled as {}. Ignoring the late '{}' callback.",
                    payment.status, update.status
                );
                Ok(CallbackResult::Ignored)
            },
            CallbackOutcome::Apply(update) => {
                trace!("🛒️ Callback payload: {}", update.raw);
                self.apply_status_update(PROVIDER_CALLBACK, order, payment, update).await?;
                Ok(CallbackResult::Applied)
            },
        }
    }

    /// Returns the order along with every payment attempt made for it.
    pub async fn order_info(&self, order_id: OrderId) -> Result<OrderInfo, CheckoutError> {
        let order = self.fetch_order(ORDER_INFO, order_id).await?;
        let payments = self
            .db
            .fetch_payments_for_order(order_id)
            .await
            .map_err(CheckoutError::persistence(ORDER_INFO, format!("order #{order_id}")))?;
        Ok(OrderInfo { order, payments })
    }

    /// Records the new status on the payment and appends it to the order's payment history. Each write is its own
    /// unit; a failure after the payment was saved leaves the order history behind.
    async fn apply_status_update(
        &self,
        operation: &'static str,
        mut order: Order,
        mut payment: Payment,
        update: StatusUpdate,
    ) -> Result<(Order, Payment), CheckoutError> {
        let old_status = payment.status;
        payment.update_status(update.status);
        self.db
            .save_payment(&payment)
            .await
            .map_err(CheckoutError::persistence(operation, format!("payment {}", payment.transaction_id)))?;
        order.update_payment_status(update.status, Utc::now().timestamp(), update.description);
        self.db.save_order(&order).await.map_err(CheckoutError::persistence(operation, format!("order #{}", order.id)))?;
        info!(
            "🛒️ Payment {} for order #{} moved from {old_status} to {}",
            payment.transaction_id, order.id, payment.status
        );
        self.producers.publish_payment_accepted(PaymentAcceptedEvent::new(order.clone(), payment.clone()));
        Ok((order, payment))
    }

    async fn fetch_order(&self, operation: &'static str, order_id: OrderId) -> Result<Order, CheckoutError> {
        self.db
            .fetch_order(order_id)
            .await
            .map_err(CheckoutError::persistence(operation, format!("order #{order_id}")))?
            .ok_or(CheckoutError::OrderNotFound { operation, order_id })
    }

    async fn fetch_payment(&self, operation: &'static str, transaction_id: &str) -> Result<Payment, CheckoutError> {
        self.db
            .fetch_payment(transaction_id)
            .await
            .map_err(CheckoutError::persistence(operation, format!("payment {transaction_id}")))?
            .ok_or_else(|| CheckoutError::PaymentNotFound { operation, transaction_id: transaction_id.to_string() })
    }
}

/// The sum of the line totals at their snapshot prices, or `None` on overflow.
fn items_total(items: &[OrderItem]) -> Option<Cents> {
    items.iter().try_fold(Cents::default(), |total, item| total.checked_add(item.price.line_total(item.quantity)?))
}

use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Money, NewOrder, Order, OrderId, OrderItem, OrderStatusType},
    order_access::{check_update_allowed, resolve_list_filter, resolve_lookup, Access, Caller, OrderLookup},
    order_objects::{
        FullOrder,
        ModifyOrderRequest,
        OrderQueryFilter,
        PaymentOptions,
        PaymentRedirect,
        PaymentStatusResult,
        PlaceOrderRequest,
    },
    tog_api::{
        errors::OrderFlowError,
        payment_gateway_api::{map_provider_status, PaymentGatewayApi},
    },
    traits::{OrderManagement, PaymentProvider},
};

/// `OrderFlowApi` is the primary API for placing orders, initiating their payment, and reconciling payment state with
/// the payment provider.
///
/// Store writes happen first, inside a single transaction. The payment gateway is only called once the order has been
/// committed, so a gateway failure never loses an order: it stays `pending` with no payment reference, and payment can
/// be retried with [`Self::retry_payment`].
pub struct OrderFlowApi<B, P> {
    db: B,
    gateway: PaymentGatewayApi<P>,
}

impl<B, P> Debug for OrderFlowApi<B, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, P> OrderFlowApi<B, P> {
    pub fn new(db: B, gateway: PaymentGatewayApi<P>) -> Self {
        Self { db, gateway }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn gateway(&self) -> &PaymentGatewayApi<P> {
        &self.gateway
    }
}

impl<B, P> OrderFlowApi<B, P>
where
    B: OrderManagement,
    P: PaymentProvider,
{
    /// Places a new order and starts its payment.
    ///
    /// 1. The items payload is normalized. An empty or malformed list is rejected with
    ///    [`OrderFlowError::InvalidItems`] before anything is stored.
    /// 2. The customer details are validated.
    /// 3. The order and its items are created atomically. If any item is unknown, unavailable, or has a quantity below
    ///    one, nothing is stored.
    /// 4. A remote payment is created, and its identifier is recorded against the order.
    ///
    /// Returns the URL the buyer must be sent to in order to pay.
    pub async fn place_order(
        &self,
        request: PlaceOrderRequest,
        customer_ip: Option<String>,
    ) -> Result<PaymentRedirect, OrderFlowError> {
        let items = request.items.normalize()?;
        let new_order = NewOrder::new(
            request.customer_name,
            request.customer_email,
            request.customer_phone,
            request.delivery_address,
        );
        new_order.validate()?;
        let order_id = new_order.order_id.clone();
        let order = self.db.insert_order_with_items(new_order, &items).await.map_err(|e| {
            info!("🔄️📦️ Order {order_id} was not created. {e}");
            OrderFlowError::from(e)
        })?;
        debug!(
            "🔄️📦️ Order {} created with {} line items. Total: {}",
            order.order_id,
            items.len(),
            order.total_amount.unwrap_or_default()
        );
        let options = PaymentOptions::new(request.currency, customer_ip);
        self.initiate_payment(&order, &options).await
    }

    /// Starts payment again for an order whose earlier payment could not be created.
    ///
    /// The order must be `pending` and must not have a payment reference yet.
    pub async fn retry_payment(
        &self,
        caller: &Caller,
        order_id: &str,
        proof_email: Option<&str>,
        options: PaymentOptions,
    ) -> Result<PaymentRedirect, OrderFlowError> {
        let order = self.locate_order(caller, order_id, proof_email, Access::Mutate).await?;
        if order.payment_order_id.is_some() {
            return Err(OrderFlowError::Validation(format!("Order {} already has a payment", order.order_id)));
        }
        if order.status != OrderStatusType::Pending {
            let msg = format!("Order {} is {} and no longer awaiting payment", order.order_id, order.status);
            return Err(OrderFlowError::Validation(msg));
        }
        debug!("🔄️💳️ {caller} is retrying payment for order {}", order.order_id);
        self.initiate_payment(&order, &options).await
    }

    async fn initiate_payment(&self, order: &Order, options: &PaymentOptions) -> Result<PaymentRedirect, OrderFlowError> {
        let items = self.db.fetch_order_items(&order.order_id).await?;
        let token = self.gateway.obtain_access_token().await?;
        let redirect = self.gateway.create_remote_order(order, &items, &token, options).await?;
        self.db.set_payment_reference(&order.order_id, &redirect.external_order_id).await?;
        info!("🔄️💳️ Order {} is awaiting payment {}", order.order_id, redirect.external_order_id);
        Ok(redirect)
    }

    /// Recalculates the order total from its items and stores it.
    pub async fn recompute_total(&self, order_id: &OrderId) -> Result<Money, OrderFlowError> {
        let total = self.db.recompute_total(order_id).await?;
        trace!("🔄️📦️ Total for order {order_id} recomputed: {total}");
        Ok(total)
    }

    pub async fn fetch_order(
        &self,
        caller: &Caller,
        order_id: &str,
        proof_email: Option<&str>,
    ) -> Result<FullOrder, OrderFlowError> {
        let order = self.locate_order(caller, order_id, proof_email, Access::Read).await?;
        self.with_items(order).await
    }

    pub async fn list_orders(&self, caller: &Caller, filter: OrderQueryFilter) -> Result<Vec<FullOrder>, OrderFlowError> {
        let filter = resolve_list_filter(caller, filter)?;
        trace!("🔄️📦️ {caller} is listing orders. {filter}");
        let orders = self.db.fetch_orders(filter).await?;
        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            result.push(self.with_items(order).await?);
        }
        Ok(result)
    }

    /// Changes an order.
    ///
    /// Staff may change the status, the customer details and the delivery address. Everyone else may only change the
    /// delivery address. Status changes must follow [`OrderStatusType::can_transition_to`]; setting the current status
    /// again is rejected.
    ///
    /// An ownership proof carried in the request itself takes precedence over `proof_email`.
    pub async fn update_order(
        &self,
        caller: &Caller,
        order_id: &str,
        proof_email: Option<&str>,
        mut update: ModifyOrderRequest,
    ) -> Result<FullOrder, OrderFlowError> {
        let body_proof = update.take_proof();
        let proof_email = body_proof.as_deref().or(proof_email);
        let order = self.locate_order(caller, order_id, proof_email, Access::Mutate).await?;
        check_update_allowed(caller, &update)?;
        if update.is_empty() {
            return Err(OrderFlowError::Validation("No changes were requested".into()));
        }
        if let Some(new_status) = update.status {
            if !order.status.can_transition_to(new_status) {
                return Err(OrderFlowError::Validation(format!(
                    "Cannot change order status from {} to {new_status}",
                    order.status
                )));
            }
        }
        validate_update(&order, &update)?;
        let updated = self.db.update_order(&order.order_id, update).await?.ok_or(OrderFlowError::NotFound)?;
        info!("🔄️📦️ Order {} updated by {caller}", updated.order_id);
        self.with_items(updated).await
    }

    pub async fn delete_order(
        &self,
        caller: &Caller,
        order_id: &str,
        proof_email: Option<&str>,
    ) -> Result<(), OrderFlowError> {
        let order = self.locate_order(caller, order_id, proof_email, Access::Mutate).await?;
        if !self.db.delete_order(&order.order_id).await? {
            return Err(OrderFlowError::NotFound);
        }
        info!("🔄️📦️ Order {} deleted by {caller}", order.order_id);
        Ok(())
    }

    /// Reports the payment status of an order the caller may read. See [`Self::check_remote_status`].
    pub async fn check_payment_status(
        &self,
        caller: &Caller,
        order_id: &str,
        proof_email: Option<&str>,
    ) -> Result<PaymentStatusResult, OrderFlowError> {
        let order = self.locate_order(caller, order_id, proof_email, Access::Read).await?;
        self.check_remote_status(&order).await
    }

    /// Reconciles the payment status of an order with the payment provider.
    ///
    /// * An order without a payment reference is rejected without contacting the provider.
    /// * If a payment status has already been recorded, it is returned as-is and the provider is not contacted.
    /// * Otherwise the provider is queried. A known provider state is mapped and stored; an unknown one leaves the
    ///   order unchanged.
    pub async fn check_remote_status(&self, order: &Order) -> Result<PaymentStatusResult, OrderFlowError> {
        let reference = order
            .payment_order_id
            .as_deref()
            .ok_or_else(|| OrderFlowError::Validation(format!("Order {} has no payment to check", order.order_id)))?;
        if let Some(cached) = order.payment_status {
            trace!("🔄️💳️ Order {} has a recorded payment status: {cached}", order.order_id);
            return Ok(status_result(order));
        }
        let token = self.gateway.obtain_access_token().await?;
        let remote = self.gateway.fetch_remote_status(&token, reference).await?;
        let mapped = remote.as_deref().and_then(map_provider_status);
        match mapped {
            Some(status) if Some(status) != order.payment_status => {
                let updated = self.db.set_payment_status(&order.order_id, status).await?;
                info!("🔄️💳️ Payment for order {} is now {status}", order.order_id);
                Ok(status_result(&updated))
            },
            _ => {
                debug!("🔄️💳️ Payment for order {} unchanged. Provider reported {remote:?}", order.order_id);
                Ok(status_result(order))
            },
        }
    }

    async fn locate_order(
        &self,
        caller: &Caller,
        order_id: &str,
        proof_email: Option<&str>,
        access: Access,
    ) -> Result<Order, OrderFlowError> {
        let order = match resolve_lookup(caller, order_id, proof_email, access)? {
            OrderLookup::ById(id) => self.db.fetch_order(&id).await?,
            OrderLookup::ByIdAndEmail(id, email) => self.db.fetch_order_for_email(&id, &email).await?,
        };
        order.ok_or_else(|| {
            debug!("🔄️📦️ {caller} asked for order {order_id}, which was not found");
            OrderFlowError::NotFound
        })
    }

    async fn with_items(&self, order: Order) -> Result<FullOrder, OrderFlowError> {
        let items: Vec<OrderItem> = self.db.fetch_order_items(&order.order_id).await?;
        Ok(FullOrder { order, items })
    }
}

fn status_result(order: &Order) -> PaymentStatusResult {
    PaymentStatusResult {
        status: order.status,
        payment_status: order.payment_status,
        order_id: order.order_id.clone(),
    }
}

/// Field-level checks for an update, using the same rules as a new order.
fn validate_update(order: &Order, update: &ModifyOrderRequest) -> Result<(), OrderFlowError> {
    let candidate = NewOrder {
        order_id: order.order_id.clone(),
        customer_name: update.customer_name.clone().unwrap_or_else(|| order.customer_name.clone()),
        customer_email: update.customer_email.clone().unwrap_or_else(|| order.customer_email.clone()),
        customer_phone: update.customer_phone.clone().unwrap_or_else(|| order.customer_phone.clone()),
        delivery_address: update.delivery_address.clone().unwrap_or_else(|| order.delivery_address.clone()),
    };
    candidate.validate()?;
    Ok(())
}

use std::fmt::Debug;

use log::*;
use payu_tools::{PayuBuyer, PayuConfig, PayuOrderRequest, PayuProduct};
use tog_common::DEFAULT_CURRENCY_CODE;

use crate::{
    db_types::{Money, Order, OrderItem, PaymentStatus},
    order_objects::{PaymentOptions, PaymentRedirect},
    tog_api::errors::GatewayError,
    traits::PaymentProvider,
};

/// The merchant-level settings the adapter needs to build payment requests.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub merchant_pos_id: String,
    pub front_base_url: String,
    pub default_currency: String,
    pub language: String,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            merchant_pos_id: String::default(),
            front_base_url: "http://localhost:3000".to_string(),
            default_currency: DEFAULT_CURRENCY_CODE.to_string(),
            language: "pl".to_string(),
        }
    }
}

impl From<&PayuConfig> for GatewaySettings {
    fn from(config: &PayuConfig) -> Self {
        Self {
            merchant_pos_id: config.merchant_pos_id.clone(),
            front_base_url: config.front_base_url.clone(),
            default_currency: config.default_currency.clone(),
            language: config.language.clone(),
        }
    }
}

/// Maps a provider payment state onto the internal payment status. Unknown states map to `None`, meaning "no change".
pub fn map_provider_status(status: &str) -> Option<PaymentStatus> {
    match status {
        "COMPLETED" => Some(PaymentStatus::Confirmed),
        "PENDING" => Some(PaymentStatus::Pending),
        "CANCELED" | "REJECTED" => Some(PaymentStatus::Canceled),
        _ => None,
    }
}

/// `PaymentGatewayApi` is the adapter between orders and the remote payment system.
///
/// It builds provider requests from orders and interprets the provider's answers. It never retries: every failure is
/// reported to the caller straight away.
pub struct PaymentGatewayApi<P> {
    provider: P,
    settings: GatewaySettings,
}

impl<P> Debug for PaymentGatewayApi<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentGatewayApi ({:?})", self.settings)
    }
}

impl<P> PaymentGatewayApi<P> {
    pub fn new(provider: P, settings: GatewaySettings) -> Self {
        Self { provider, settings }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    /// Builds the provider payload for an order. Amounts are sent in minor units, as strings.
    pub fn build_order_request(&self, order: &Order, items: &[OrderItem], options: &PaymentOptions) -> PayuOrderRequest {
        let total = order.total_amount.unwrap_or_else(|| items.iter().map(|i| i.subtotal).sum::<Money>());
        let products = items
            .iter()
            .map(|item| PayuProduct {
                name: item.item_name.clone(),
                unit_price: item.unit_price.to_minor_units().to_string(),
                quantity: item.quantity,
            })
            .collect();
        let currency_code = options.currency.clone().unwrap_or_else(|| self.settings.default_currency.clone());
        PayuOrderRequest {
            ext_order_id: order.order_id.to_string(),
            merchant_pos_id: self.settings.merchant_pos_id.clone(),
            description: format!("Order {}", order.order_id),
            currency_code,
            total_amount: total.to_minor_units().to_string(),
            buyer: PayuBuyer {
                email: order.customer_email.clone(),
                phone: order.customer_phone.clone(),
                first_name: order.customer_name.clone(),
                language: self.settings.language.clone(),
            },
            products,
            continue_url: format!(
                "{}/payment-redirect/{}?email={}",
                self.settings.front_base_url, order.order_id, order.customer_email
            ),
            customer_ip: options.customer_ip.clone(),
        }
    }
}

impl<P> PaymentGatewayApi<P>
where P: PaymentProvider
{
    /// Obtains a bearer token from the provider. Any failure is a [`GatewayError::Auth`].
    pub async fn obtain_access_token(&self) -> Result<String, GatewayError> {
        self.provider.obtain_access_token().await.map_err(|e| {
            error!("💳️ Could not obtain a payment gateway access token. {e}");
            GatewayError::Auth(e.to_string())
        })
    }

    /// Creates the remote payment order for `order`.
    ///
    /// * `SUCCESS` with a redirect URI is a success.
    /// * `SUCCESS` without a redirect URI means the provider misbehaved: [`GatewayError::Unavailable`].
    /// * Any other status code is a [`GatewayError::Business`] failure carrying the provider's description.
    /// * A transport failure or an unparseable answer is [`GatewayError::Unavailable`].
    pub async fn create_remote_order(
        &self,
        order: &Order,
        items: &[OrderItem],
        access_token: &str,
        options: &PaymentOptions,
    ) -> Result<PaymentRedirect, GatewayError> {
        let request = self.build_order_request(order, items, options);
        debug!("💳️ Creating remote payment for order {} ({} minor units)", order.order_id, request.total_amount);
        let response = self.provider.submit_order(access_token, &request).await.map_err(|e| {
            warn!("💳️ Payment gateway call for order {} failed. {e}", order.order_id);
            GatewayError::Unavailable(e.to_string())
        })?;
        if !response.status.is_success() {
            let reason = response.status.status_desc.unwrap_or_else(|| "Unknown error".to_string());
            info!("💳️ Payment gateway declined order {}: {reason}", order.order_id);
            return Err(GatewayError::Business(reason));
        }
        match (response.redirect_uri, response.order_id) {
            (Some(redirect_url), Some(external_order_id)) => {
                info!("💳️ Remote payment {external_order_id} created for order {}", order.order_id);
                Ok(PaymentRedirect { redirect_url, external_order_id })
            },
            (None, _) => {
                warn!("💳️ Payment gateway accepted order {} without a redirect URL", order.order_id);
                Err(GatewayError::Unavailable("No redirect URL in PayU response".into()))
            },
            (Some(_), None) => {
                warn!("💳️ Payment gateway accepted order {} without an order id", order.order_id);
                Err(GatewayError::Unavailable("No order id in PayU response".into()))
            },
        }
    }

    /// Queries the provider for the payment state of `reference`. Returns the raw provider status of the first order
    /// in the answer, if there is one.
    pub async fn fetch_remote_status(&self, access_token: &str, reference: &str) -> Result<Option<String>, GatewayError> {
        let details = self.provider.query_order(access_token, reference).await.map_err(|e| {
            warn!("💳️ Could not fetch remote payment {reference}. {e}");
            GatewayError::Unavailable(e.to_string())
        })?;
        let status = details.first_status().map(String::from);
        trace!("💳️ Remote payment {reference} has status {status:?}");
        Ok(status)
    }
}

#[cfg(test)]
mod test {
    use chrono::Utc;

    use super::*;
    use crate::db_types::{OrderId, OrderStatusType};

    fn order() -> Order {
        Order {
            id: 1,
            order_id: OrderId::from("5b1e"),
            customer_name: "Jan".into(),
            customer_email: "jan@example.com".into(),
            customer_phone: "123456".into(),
            delivery_address: "Main St 1".into(),
            status: OrderStatusType::Pending,
            total_amount: Some(Money::from_cents(2198)),
            payment_order_id: None,
            payment_status: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn items() -> Vec<OrderItem> {
        vec![OrderItem {
            id: 1,
            order_id: OrderId::from("5b1e"),
            menu_item_id: Some(1),
            item_name: "Margherita".into(),
            unit_price: Money::from_cents(1099),
            quantity: 2,
            subtotal: Money::from_cents(2198),
        }]
    }

    #[test]
    fn provider_status_mapping() {
        assert_eq!(map_provider_status("COMPLETED"), Some(PaymentStatus::Confirmed));
        assert_eq!(map_provider_status("PENDING"), Some(PaymentStatus::Pending));
        assert_eq!(map_provider_status("CANCELED"), Some(PaymentStatus::Canceled));
        assert_eq!(map_provider_status("REJECTED"), Some(PaymentStatus::Canceled));
        assert_eq!(map_provider_status("WAITING_FOR_CONFIRMATION"), None);
        assert_eq!(map_provider_status(""), None);
    }

    #[test]
    fn order_request_payload() {
        let settings = GatewaySettings {
            merchant_pos_id: "300746".into(),
            front_base_url: "https://trattoria.test".into(),
            default_currency: "PLN".into(),
            language: "pl".into(),
        };
        let api = PaymentGatewayApi::new((), settings);
        let options = PaymentOptions::new(None, Some("10.0.0.1".into()));
        let req = api.build_order_request(&order(), &items(), &options);
        assert_eq!(req.ext_order_id, "5b1e");
        assert_eq!(req.merchant_pos_id, "300746");
        assert_eq!(req.description, "Order 5b1e");
        assert_eq!(req.currency_code, "PLN");
        assert_eq!(req.total_amount, "2198");
        assert_eq!(req.products.len(), 1);
        assert_eq!(req.products[0].unit_price, "1099");
        assert_eq!(req.products[0].quantity, 2);
        assert_eq!(req.buyer.first_name, "Jan");
        assert_eq!(req.buyer.language, "pl");
        assert_eq!(req.continue_url, "https://trattoria.test/payment-redirect/5b1e?email=jan@example.com");
        assert_eq!(req.customer_ip.as_deref(), Some("10.0.0.1"));

        let options = PaymentOptions::new(Some("EUR".into()), None);
        let req = api.build_order_request(&order(), &items(), &options);
        assert_eq!(req.currency_code, "EUR");
    }

    #[test]
    fn missing_total_falls_back_to_items() {
        let api = PaymentGatewayApi::new((), GatewaySettings::default());
        let mut order = order();
        order.total_amount = None;
        let req = api.build_order_request(&order, &items(), &PaymentOptions::default());
        assert_eq!(req.total_amount, "2198");
    }
}

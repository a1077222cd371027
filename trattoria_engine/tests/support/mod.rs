#![allow(dead_code)]
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use payu_tools::{PayuApiError, PayuOrderDetails, PayuOrderRequest, PayuOrderResponse, PayuOrderSummary, PayuStatus};
use trattoria_engine::{
    db_types::{MenuCategory, MenuItem, Money, NewMenuItem},
    CatalogApi,
    GatewaySettings,
    OrderFlowApi,
    PaymentGatewayApi,
    PaymentProvider,
    SqliteDatabase,
};
pub use trattoria_engine::test_utils::prepare_env::fresh_database;

/// What the fake provider should answer when an order is submitted.
#[derive(Clone)]
pub enum SubmitBehaviour {
    Accept,
    Decline(String),
    NoRedirect,
    Offline,
}

/// A payment provider that records every call and answers from a script.
pub struct FakeProvider {
    pub token_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub fail_auth: bool,
    pub submit: SubmitBehaviour,
    pub remote_status: Option<String>,
    pub submitted: Mutex<Vec<PayuOrderRequest>>,
}

impl Default for FakeProvider {
    fn default() -> Self {
        Self {
            token_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            query_calls: AtomicUsize::new(0),
            fail_auth: false,
            submit: SubmitBehaviour::Accept,
            remote_status: Some("COMPLETED".into()),
            submitted: Mutex::new(vec![]),
        }
    }
}

impl FakeProvider {
    pub fn with_submit(submit: SubmitBehaviour) -> Self {
        Self { submit, ..Default::default() }
    }

    pub fn with_remote_status(status: Option<&str>) -> Self {
        Self { remote_status: status.map(String::from), ..Default::default() }
    }

    pub fn calls(&self) -> usize {
        self.token_calls.load(Ordering::SeqCst) +
            self.submit_calls.load(Ordering::SeqCst) +
            self.query_calls.load(Ordering::SeqCst)
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn last_submitted(&self) -> Option<PayuOrderRequest> {
        self.submitted.lock().unwrap().last().cloned()
    }
}

impl PaymentProvider for FakeProvider {
    async fn obtain_access_token(&self) -> Result<String, PayuApiError> {
        self.token_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_auth {
            Err(PayuApiError::AuthenticationFailed { status: 401, message: "invalid_client".into() })
        } else {
            Ok("token-123".into())
        }
    }

    async fn submit_order(
        &self,
        access_token: &str,
        order: &PayuOrderRequest,
    ) -> Result<PayuOrderResponse, PayuApiError> {
        assert_eq!(access_token, "token-123");
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(order.clone());
        let ok = PayuStatus { status_code: "SUCCESS".into(), status_desc: None };
        match &self.submit {
            SubmitBehaviour::Accept => Ok(PayuOrderResponse {
                status: ok,
                redirect_uri: Some(format!("https://payu.test/pay/{}", order.ext_order_id)),
                order_id: Some(format!("PAYU-{}", order.ext_order_id)),
            }),
            SubmitBehaviour::Decline(desc) => Ok(PayuOrderResponse {
                status: PayuStatus { status_code: "ERROR_VALUE_INVALID".into(), status_desc: Some(desc.clone()) },
                redirect_uri: None,
                order_id: None,
            }),
            SubmitBehaviour::NoRedirect => {
                Ok(PayuOrderResponse { status: ok, redirect_uri: None, order_id: Some("PAYU-1".into()) })
            },
            SubmitBehaviour::Offline => Err(PayuApiError::RestResponseError("connection refused".into())),
        }
    }

    async fn query_order(&self, _access_token: &str, payment_order_id: &str) -> Result<PayuOrderDetails, PayuApiError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        let orders = self
            .remote_status
            .iter()
            .map(|status| PayuOrderSummary {
                order_id: payment_order_id.to_string(),
                ext_order_id: None,
                status: status.clone(),
            })
            .collect();
        Ok(PayuOrderDetails { orders })
    }
}

pub struct Fixture {
    pub flow: OrderFlowApi<SqliteDatabase, FakeProvider>,
    pub catalog: CatalogApi<SqliteDatabase>,
    pub margherita: MenuItem,
    pub tiramisu: MenuItem,
    pub sold_out: MenuItem,
}

impl Fixture {
    pub fn provider(&self) -> &FakeProvider {
        self.flow.gateway().provider()
    }
}

pub async fn setup(provider: FakeProvider) -> Fixture {
    let db = fresh_database().await;
    let catalog = CatalogApi::new(db.clone());
    let margherita = catalog
        .create_menu_item(NewMenuItem::new("Margherita", MenuCategory::Pizza, Money::from_cents(1099)))
        .await
        .expect("Error creating menu item");
    let tiramisu = catalog
        .create_menu_item(NewMenuItem::new("Tiramisu", MenuCategory::Dessert, Money::from_cents(750)))
        .await
        .expect("Error creating menu item");
    let mut sold_out = NewMenuItem::new("Calzone", MenuCategory::Pizza, Money::from_cents(1450));
    sold_out.is_available = false;
    let sold_out = catalog.create_menu_item(sold_out).await.expect("Error creating menu item");
    let settings = GatewaySettings {
        merchant_pos_id: "300746".into(),
        front_base_url: "https://trattoria.test".into(),
        default_currency: "PLN".into(),
        language: "pl".into(),
    };
    let flow = OrderFlowApi::new(db, PaymentGatewayApi::new(provider, settings));
    Fixture { flow, catalog, margherita, tiramisu, sold_out }
}

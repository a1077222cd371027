use mockall::mock;
use payu_tools::{PayuApiError, PayuOrderDetails, PayuOrderRequest, PayuOrderResponse, PayuStatus, PAYU_SUCCESS};
use trattoria_engine::traits::PaymentProvider;

mock! {
    pub Payu {}
    impl PaymentProvider for Payu {
        async fn obtain_access_token(&self) -> Result<String, PayuApiError>;
        async fn submit_order(&self, access_token: &str, order: &PayuOrderRequest) -> Result<PayuOrderResponse, PayuApiError>;
        async fn query_order(&self, access_token: &str, payment_order_id: &str) -> Result<PayuOrderDetails, PayuApiError>;
    }
}

/// A provider that never expects to be called.
pub fn idle_payu() -> MockPayu {
    let mut payu = MockPayu::new();
    payu.expect_obtain_access_token().never();
    payu.expect_submit_order().never();
    payu.expect_query_order().never();
    payu
}

/// A provider that accepts every order. The remote payment id is the local order id prefixed with `PAYU-`.
pub fn accepting_payu() -> MockPayu {
    let mut payu = MockPayu::new();
    payu.expect_obtain_access_token().returning(|| Ok("token-123".to_string()));
    payu.expect_submit_order().returning(|_, order| {
        Ok(PayuOrderResponse {
            status: PayuStatus { status_code: PAYU_SUCCESS.to_string(), status_desc: None },
            redirect_uri: Some(format!("https://payu.test/pay/{}", order.ext_order_id)),
            order_id: Some(format!("PAYU-{}", order.ext_order_id)),
        })
    });
    payu
}

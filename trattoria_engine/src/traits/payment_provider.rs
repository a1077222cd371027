use payu_tools::{PayuApi, PayuApiError, PayuOrderDetails, PayuOrderRequest, PayuOrderResponse};

/// The raw calls the engine makes against the remote payment system.
///
/// Implementations only move data. Interpreting responses (success, business failure, missing redirect) is the job
/// of [`crate::PaymentGatewayApi`].
#[allow(async_fn_in_trait)]
pub trait PaymentProvider {
    /// Exchanges client credentials for a bearer token.
    async fn obtain_access_token(&self) -> Result<String, PayuApiError>;

    /// Submits a new payment order and returns the provider's answer, whatever its status code.
    async fn submit_order(
        &self,
        access_token: &str,
        order: &PayuOrderRequest,
    ) -> Result<PayuOrderResponse, PayuApiError>;

    /// Fetches the current state of a payment order by the provider's identifier.
    async fn query_order(&self, access_token: &str, payment_order_id: &str) -> Result<PayuOrderDetails, PayuApiError>;
}

impl PaymentProvider for PayuApi {
    async fn obtain_access_token(&self) -> Result<String, PayuApiError> {
        self.fetch_access_token().await.map(|t| t.access_token)
    }

    async fn submit_order(
        &self,
        access_token: &str,
        order: &PayuOrderRequest,
    ) -> Result<PayuOrderResponse, PayuApiError> {
        self.create_order(access_token, order).await
    }

    async fn query_order(&self, access_token: &str, payment_order_id: &str) -> Result<PayuOrderDetails, PayuApiError> {
        self.fetch_order(access_token, payment_order_id).await
    }
}

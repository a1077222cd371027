use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    redirect::Policy,
    Client,
    StatusCode,
};

use crate::{
    config::PayuConfig,
    data_objects::{AccessToken, PayuOrderDetails, PayuOrderRequest, PayuOrderResponse},
    PayuApiError,
};

#[derive(Clone)]
pub struct PayuApi {
    config: PayuConfig,
    client: Arc<Client>,
}

impl PayuApi {
    pub fn new(config: PayuConfig) -> Result<Self, PayuApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        // PayU answers a new order with a 302 whose body carries the redirect URI. It must not be followed.
        let client = Client::builder()
            .default_headers(headers)
            .redirect(Policy::none())
            .build()
            .map_err(|e| PayuApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &PayuConfig {
        &self.config
    }

    /// Exchanges the configured client credentials for a bearer token. Anything other than a 200 response is an
    /// authentication failure.
    pub async fn fetch_access_token(&self) -> Result<AccessToken, PayuApiError> {
        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.reveal().as_str()),
        ];
        trace!("💳️ Requesting PayU access token from {}", self.config.oauth_url);
        let response = self
            .client
            .post(&self.config.oauth_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| PayuApiError::RestResponseError(e.to_string()))?;
        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(PayuApiError::AuthenticationFailed { status, message });
        }
        let token = response.json::<AccessToken>().await.map_err(|e| PayuApiError::JsonError(e.to_string()))?;
        debug!("💳️ Obtained PayU access token");
        Ok(token)
    }

    /// Submits a new payment order. The response body is returned as-is, whatever the HTTP status, since PayU
    /// reports business failures in the body's `status` object.
    pub async fn create_order(
        &self,
        access_token: &str,
        order: &PayuOrderRequest,
    ) -> Result<PayuOrderResponse, PayuApiError> {
        trace!("💳️ Creating PayU order for {}", order.ext_order_id);
        let response = self
            .client
            .post(&self.config.order_url)
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .json(order)
            .send()
            .await
            .map_err(|e| PayuApiError::RestResponseError(e.to_string()))?;
        let status = response.status();
        let result = response.json::<PayuOrderResponse>().await.map_err(|e| PayuApiError::JsonError(e.to_string()))?;
        debug!("💳️ PayU answered {status} for order {}: {}", order.ext_order_id, result.status.status_code);
        Ok(result)
    }

    pub async fn fetch_order(&self, access_token: &str, payu_order_id: &str) -> Result<PayuOrderDetails, PayuApiError> {
        let url = format!("{}/orders/{payu_order_id}", self.config.api_url.trim_end_matches('/'));
        trace!("💳️ Fetching PayU order: {url}");
        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(|e| PayuApiError::RestResponseError(e.to_string()))?;
        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(PayuApiError::QueryError { status, message });
        }
        response.json::<PayuOrderDetails>().await.map_err(|e| PayuApiError::JsonError(e.to_string()))
    }
}

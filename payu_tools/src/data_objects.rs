use serde::{Deserialize, Serialize};

/// The status code PayU uses to signal that a request was accepted.
pub const PAYU_SUCCESS: &str = "SUCCESS";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayuBuyer {
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub language: String,
}

/// A single product line on a PayU order. `unit_price` is in minor currency units, expressed as a string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayuProduct {
    pub name: String,
    pub unit_price: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayuOrderRequest {
    pub ext_order_id: String,
    pub merchant_pos_id: String,
    pub description: String,
    pub currency_code: String,
    /// Total order value in minor currency units, expressed as a string.
    pub total_amount: String,
    pub buyer: PayuBuyer,
    pub products: Vec<PayuProduct>,
    pub continue_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_ip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayuStatus {
    #[serde(default)]
    pub status_code: String,
    #[serde(default)]
    pub status_desc: Option<String>,
}

impl PayuStatus {
    pub fn is_success(&self) -> bool {
        self.status_code == PAYU_SUCCESS
    }
}

/// PayU's answer to an order creation request. A successful answer carries the URL the buyer must be sent to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayuOrderResponse {
    #[serde(default)]
    pub status: PayuStatus,
    #[serde(default)]
    pub redirect_uri: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayuOrderSummary {
    pub order_id: String,
    #[serde(default)]
    pub ext_order_id: Option<String>,
    /// One of `NEW`, `PENDING`, `WAITING_FOR_CONFIRMATION`, `COMPLETED`, `CANCELED`, `REJECTED`.
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct PayuOrderDetails {
    #[serde(default)]
    pub orders: Vec<PayuOrderSummary>,
}

impl PayuOrderDetails {
    /// The status of the first order in the result set, if there is one.
    pub fn first_status(&self) -> Option<&str> {
        self.orders.first().map(|o| o.status.as_str())
    }
}

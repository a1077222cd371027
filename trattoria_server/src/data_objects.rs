use serde::{Deserialize, Serialize};
use tog_common::parse_boolean_flag;
use trattoria_engine::db_types::MenuCategory;

/// Query parameters accepted by the single-order endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderLookupParams {
    /// Proof of ownership for callers without an access token.
    pub email: Option<String>,
    /// Set to `true` to get the payment status of the order instead of its details.
    pub check_payment: Option<String>,
}

impl OrderLookupParams {
    pub fn check_payment(&self) -> bool {
        parse_boolean_flag(self.check_payment.clone(), false)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuQuery {
    pub category: Option<MenuCategory>,
}

/// The optional body of a delete request, for clients that send the ownership proof in the body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnershipProof {
    pub email: Option<String>,
}

/// The optional body of a payment retry request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetryPaymentRequest {
    pub email: Option<String>,
    pub currency: Option<String>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn check_payment_flag() {
        let params: OrderLookupParams = serde_json::from_str(r#"{"check_payment": "true"}"#).unwrap();
        assert!(params.check_payment());
        assert!(!OrderLookupParams::default().check_payment());
    }
}

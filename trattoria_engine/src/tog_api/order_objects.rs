use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    db_types::{Order, OrderId, OrderItem, OrderStatusType, PaymentStatus},
    tog_api::errors::OrderFlowError,
};

//--------------------------------------    LineItemRequest    ---------------------------------------------------------
/// A request for `quantity` units of the menu item with id `menu_item`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemRequest {
    pub menu_item: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

impl LineItemRequest {
    pub fn new(menu_item: i64, quantity: i64) -> Self {
        Self { menu_item, quantity }
    }
}

//--------------------------------------      ItemsPayload     ---------------------------------------------------------
/// The `items` field of an order placement request, exactly as the client sent it.
///
/// Clients send line items in one of three shapes:
/// * a JSON array of `{"menu_item": .., "quantity": ..}` objects,
/// * a JSON array whose first element is a string holding that array as serialized JSON (form submissions), or
/// * a bare string holding the serialized array.
///
/// [`ItemsPayload::normalize`] turns any of these into a list of [`LineItemRequest`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemsPayload(pub Value);

impl From<Vec<LineItemRequest>> for ItemsPayload {
    fn from(items: Vec<LineItemRequest>) -> Self {
        Self(serde_json::to_value(items).unwrap_or_default())
    }
}

impl ItemsPayload {
    pub fn normalize(&self) -> Result<Vec<LineItemRequest>, OrderFlowError> {
        let items = match &self.0 {
            Value::String(s) => decode_items_string(s)?,
            Value::Array(arr) => match arr.first() {
                Some(Value::String(s)) => decode_items_string(s)?,
                _ => arr.clone(),
            },
            Value::Null => vec![],
            _ => return Err(OrderFlowError::InvalidItems("Invalid items format".into())),
        };
        if items.is_empty() {
            return Err(OrderFlowError::InvalidItems("An order must contain at least one item".into()));
        }
        items.into_iter().enumerate().map(|(position, item)| parse_line_item(position, item)).collect()
    }
}

fn decode_items_string(s: &str) -> Result<Vec<Value>, OrderFlowError> {
    let cleaned = s.replace(['\t', '\n'], "");
    match serde_json::from_str::<Value>(&cleaned) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) => Err(OrderFlowError::InvalidItems("Invalid items format".into())),
        Err(e) => Err(OrderFlowError::InvalidItems(format!("Invalid items format. {e}"))),
    }
}

fn parse_line_item(position: usize, item: Value) -> Result<LineItemRequest, OrderFlowError> {
    let invalid = |reason: &str| OrderFlowError::InvalidItems(format!("items[{position}]: {reason}"));
    let Value::Object(fields) = item else {
        return Err(invalid("expected an object"));
    };
    let menu_item = fields.get("menu_item").ok_or_else(|| invalid("menu_item is required"))?;
    let menu_item = integer_field(menu_item).ok_or_else(|| invalid("menu_item must be an integer id"))?;
    let quantity = match fields.get("quantity") {
        None | Some(Value::Null) => default_quantity(),
        Some(q) => integer_field(q).ok_or_else(|| invalid("quantity must be an integer"))?,
    };
    Ok(LineItemRequest { menu_item, quantity })
}

/// Accepts both `3` and `"3"`, since form-encoded clients send numbers as strings.
fn integer_field(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

//--------------------------------------   PlaceOrderRequest   ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    #[serde(default)]
    pub items: ItemsPayload,
    /// Overrides the configured default currency for the payment.
    #[serde(default)]
    pub currency: Option<String>,
}

/// Per-request details passed through to the payment provider.
#[derive(Debug, Clone, Default)]
pub struct PaymentOptions {
    pub currency: Option<String>,
    pub customer_ip: Option<String>,
}

impl PaymentOptions {
    pub fn new(currency: Option<String>, customer_ip: Option<String>) -> Self {
        Self { currency, customer_ip }
    }
}

//--------------------------------------   ModifyOrderRequest  ---------------------------------------------------------
/// A partial update to an order. Fields that are `None` are left unchanged.
///
/// Totals and payment fields are derived by the engine and cannot be set by clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModifyOrderRequest {
    pub status: Option<OrderStatusType>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    pub delivery_address: Option<String>,
    /// Proof of ownership for callers without an access token. It is never written to the order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ModifyOrderRequest {
    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_delivery_address<S: Into<String>>(mut self, address: S) -> Self {
        self.delivery_address = Some(address.into());
        self
    }

    pub fn with_customer_name<S: Into<String>>(mut self, name: S) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    /// Removes the ownership proof from the request, leaving only the changes.
    pub fn take_proof(&mut self) -> Option<String> {
        self.email.take()
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() &&
            self.customer_name.is_none() &&
            self.customer_email.is_none() &&
            self.customer_phone.is_none() &&
            self.delivery_address.is_none()
    }

    /// True if the request only touches the delivery address.
    pub fn is_address_only(&self) -> bool {
        self.delivery_address.is_some() &&
            self.status.is_none() &&
            self.customer_name.is_none() &&
            self.customer_email.is_none() &&
            self.customer_phone.is_none()
    }
}

//--------------------------------------    OrderQueryFilter   ---------------------------------------------------------
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    #[serde(alias = "email")]
    pub customer_email: Option<String>,
    pub status: Option<OrderStatusType>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl OrderQueryFilter {
    pub fn with_customer_email<S: Into<String>>(mut self, email: S) -> Self {
        self.customer_email = Some(email.into());
        self
    }

    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status = Some(status);
        self
    }

    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    pub fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.customer_email.is_none() && self.status.is_none() && self.since.is_none() && self.until.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "No filters.")?;
            return Ok(());
        }
        if let Some(email) = &self.customer_email {
            write!(f, "customer_email: {email}. ")?;
        }
        if let Some(status) = &self.status {
            write!(f, "status: {status}. ")?;
        }
        if let Some(since) = &self.since {
            write!(f, "since {since}. ")?;
        }
        if let Some(until) = &self.until {
            write!(f, "until {until}. ")?;
        }
        Ok(())
    }
}

//--------------------------------------    Response objects   ---------------------------------------------------------
/// An order together with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullOrder {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Where to send the buyer to complete a payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRedirect {
    #[serde(rename = "redirectUri")]
    pub redirect_url: String,
    /// The payment provider's identifier for the remote payment order
    #[serde(rename = "orderId")]
    pub external_order_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatusResult {
    pub status: OrderStatusType,
    #[serde(rename = "payuStatus")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(rename = "orderNumber")]
    pub order_id: OrderId,
}

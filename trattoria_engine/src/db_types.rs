use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;
pub use tog_common::Money;
use uuid::Uuid;

const MAX_NAME_LENGTH: usize = 100;
const MAX_PHONE_LENGTH: usize = 20;
/// Menu prices go up to 9999.99.
pub const MAX_PRICE: Money = Money::from_cents(999_999);
/// Order totals go up to 999999.99.
pub const MAX_ORDER_TOTAL: Money = Money::from_cents(99_999_999);
const EMAIL_PATTERN: &str = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

#[derive(Debug, Clone, Error)]
#[error("Invalid value: {0}")]
pub struct ConversionError(String);

pub fn is_valid_email(email: &str) -> bool {
    Regex::new(EMAIL_PATTERN).map(|re| re.is_match(email)).unwrap_or(false)
}

fn check_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError(format!("{field} may not be blank")));
    }
    if value.chars().count() > max {
        return Err(ValidationError(format!("{field} may not be longer than {max} characters")));
    }
    Ok(())
}

fn check_price(price: Money) -> Result<(), ValidationError> {
    if price.is_negative() {
        return Err(ValidationError("price may not be negative".into()));
    }
    if price > MAX_PRICE {
        return Err(ValidationError(format!("price may not exceed {MAX_PRICE}")));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(ValidationError(format!("{email} is not a valid email address")))
    }
}

//--------------------------------------        OrderId        ---------------------------------------------------------
/// The public identifier of an order. New identifiers are random v4 UUIDs, so they cannot be guessed or enumerated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OrderId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatusType {
    /// The order has been placed. Payment may or may not have been initiated.
    Pending,
    /// The kitchen has accepted the order.
    Confirmed,
    Preparing,
    OutForDelivery,
    Delivered,
    /// The order was canceled by staff, or the payment was canceled or rejected.
    Canceled,
}

impl OrderStatusType {
    /// Whether an order may move from this status to `to`.
    ///
    /// | From \ To        | Confirmed | Preparing | OutForDelivery | Delivered | Canceled |
    /// |------------------|-----------|-----------|----------------|-----------|----------|
    /// | Pending          | Ok        | Ok        | Err            | Err       | Ok       |
    /// | Confirmed        | -         | Ok        | Ok             | Err       | Ok       |
    /// | Preparing        | Err       | -         | Ok             | Err       | Ok       |
    /// | OutForDelivery   | Err       | Err       | -              | Ok        | Ok       |
    /// | Delivered        | Err       | Err       | Err            | Err       | Err      |
    /// | Canceled         | Err       | Err       | Err            | Err       | Err      |
    ///
    /// Nothing moves back to `Pending`, and a status never transitions to itself.
    pub fn can_transition_to(&self, to: OrderStatusType) -> bool {
        use OrderStatusType::*;
        matches!(
            (self, to),
            (Pending, Confirmed) |
                (Pending, Preparing) |
                (Pending, Canceled) |
                (Confirmed, Preparing) |
                (Confirmed, OutForDelivery) |
                (Confirmed, Canceled) |
                (Preparing, OutForDelivery) |
                (Preparing, Canceled) |
                (OutForDelivery, Delivered) |
                (OutForDelivery, Canceled)
        )
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatusType::Pending => "pending",
            OrderStatusType::Confirmed => "confirmed",
            OrderStatusType::Preparing => "preparing",
            OrderStatusType::OutForDelivery => "out_for_delivery",
            OrderStatusType::Delivered => "delivered",
            OrderStatusType::Canceled => "canceled",
        };
        f.write_str(s)
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "preparing" => Ok(Self::Preparing),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "canceled" => Ok(Self::Canceled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------    PaymentStatus      ---------------------------------------------------------
/// The last payment state reported by the payment provider. This is independent of the order's fulfilment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Canceled,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Confirmed => write!(f, "confirmed"),
            PaymentStatus::Canceled => write!(f, "canceled"),
        }
    }
}

//--------------------------------------     MenuCategory      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MenuCategory {
    Pizza,
    Pasta,
    Salad,
    Dessert,
    Drink,
    SideDish,
}

impl Display for MenuCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MenuCategory::Pizza => "pizza",
            MenuCategory::Pasta => "pasta",
            MenuCategory::Salad => "salad",
            MenuCategory::Dessert => "dessert",
            MenuCategory::Drink => "drink",
            MenuCategory::SideDish => "side_dish",
        };
        f.write_str(s)
    }
}

impl FromStr for MenuCategory {
    type Err = ConversionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pizza" => Ok(Self::Pizza),
            "pasta" => Ok(Self::Pasta),
            "salad" => Ok(Self::Salad),
            "dessert" => Ok(Self::Dessert),
            "drink" => Ok(Self::Drink),
            "side_dish" => Ok(Self::SideDish),
            s => Err(ConversionError(format!("Invalid menu category: {s}"))),
        }
    }
}

//--------------------------------------       MenuItem        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: MenuCategory,
    pub price: Money,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------      NewMenuItem      ---------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMenuItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: MenuCategory,
    pub price: Money,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

fn default_true() -> bool {
    true
}

impl NewMenuItem {
    pub fn new<S: Into<String>>(name: S, category: MenuCategory, price: Money) -> Self {
        Self { name: name.into(), description: String::default(), category, price, is_available: true }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("name", &self.name, MAX_NAME_LENGTH)?;
        check_price(self.price)
    }
}

//--------------------------------------    MenuItemUpdate     ---------------------------------------------------------
/// A partial update to a menu item. Fields that are `None` are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<MenuCategory>,
    pub price: Option<Money>,
    pub is_available: Option<bool>,
}

impl MenuItemUpdate {
    pub fn with_price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_availability(mut self, is_available: bool) -> Self {
        self.is_available = Some(is_available);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() &&
            self.description.is_none() &&
            self.category.is_none() &&
            self.price.is_none() &&
            self.is_available.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            check_length("name", name, MAX_NAME_LENGTH)?;
        }
        match self.price {
            Some(price) => check_price(price),
            None => Ok(()),
        }
    }
}

//--------------------------------------         Order         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Order {
    #[serde(skip)]
    pub id: i64,
    pub order_id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub status: OrderStatusType,
    /// Derived from the order's items. `None` until it has been computed for the first time.
    pub total_amount: Option<Money>,
    /// The identifier the payment provider assigned to the payment for this order
    pub payment_order_id: Option<String>,
    pub payment_status: Option<PaymentStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------        NewOrder       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// A freshly generated identifier for the order
    pub order_id: OrderId,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
}

impl NewOrder {
    pub fn new(customer_name: String, customer_email: String, customer_phone: String, delivery_address: String) -> Self {
        Self { order_id: OrderId::random(), customer_name, customer_email, customer_phone, delivery_address }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_length("customer_name", &self.customer_name, MAX_NAME_LENGTH)?;
        check_email(&self.customer_email)?;
        check_length("customer_phone", &self.customer_phone, MAX_PHONE_LENGTH)?;
        if self.delivery_address.trim().is_empty() {
            return Err(ValidationError("delivery_address may not be blank".into()));
        }
        Ok(())
    }
}

//--------------------------------------       OrderItem       ---------------------------------------------------------
/// A line item in an order. The name and unit price are copied from the catalog when the order is placed, so later
/// catalog changes never alter an existing order.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    /// Set to `None` if the menu item is removed from the catalog after the order was placed.
    pub menu_item_id: Option<i64>,
    pub item_name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub subtotal: Money,
}

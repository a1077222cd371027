//! Order access control.
//!
//! Every order endpoint resolves the caller's request into an [`OrderLookup`] before touching the store. The policy
//! is the same for every endpoint:
//!
//! | Caller    | Read one                         | List        | Mutate                            |
//! |-----------|----------------------------------|-------------|-----------------------------------|
//! | Staff     | any order                        | all orders  | any order                         |
//! | Customer  | own orders only                  | own orders  | own orders only                   |
//! | Anonymous | needs order id and proof email   | not allowed | needs proof email, else forbidden |
//!
//! When an order is looked up by id *and* email, a wrong id and a wrong email both produce
//! [`OrderFlowError::NotFound`], so the caller cannot probe for the existence of other people's orders.
use std::fmt::Display;

use crate::{
    db_types::OrderId,
    order_objects::{ModifyOrderRequest, OrderQueryFilter},
    tog_api::errors::OrderFlowError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Customer { email: String },
    Staff { email: String },
}

impl Caller {
    pub fn customer<S: Into<String>>(email: S) -> Self {
        Self::Customer { email: email.into() }
    }

    pub fn staff<S: Into<String>>(email: S) -> Self {
        Self::Staff { email: email.into() }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Self::Staff { .. })
    }

    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Customer { email } | Self::Staff { email } => Some(email.as_str()),
        }
    }
}

impl Display for Caller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Caller::Anonymous => write!(f, "anonymous"),
            Caller::Customer { email } => write!(f, "customer {email}"),
            Caller::Staff { email } => write!(f, "staff {email}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Mutate,
}

/// How the store should find the order a caller is asking for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderLookup {
    ById(OrderId),
    ByIdAndEmail(OrderId, String),
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

pub fn resolve_lookup(
    caller: &Caller,
    order_id: &str,
    proof_email: Option<&str>,
    access: Access,
) -> Result<OrderLookup, OrderFlowError> {
    let proof_email = non_blank(proof_email);
    let order_id = non_blank(Some(order_id));
    match (caller, access) {
        (Caller::Staff { .. }, _) => {
            let id = order_id.ok_or_else(|| OrderFlowError::Validation("Order id is required".into()))?;
            Ok(OrderLookup::ById(OrderId::from(id)))
        },
        (Caller::Customer { email }, _) => {
            let id = order_id.ok_or_else(|| OrderFlowError::Validation("Order id is required".into()))?;
            match proof_email {
                Some(proof) if proof != email => Err(OrderFlowError::NotFound),
                _ => Ok(OrderLookup::ByIdAndEmail(OrderId::from(id), email.clone())),
            }
        },
        (Caller::Anonymous, Access::Read) => match (order_id, proof_email) {
            (Some(id), Some(email)) => Ok(OrderLookup::ByIdAndEmail(OrderId::from(id), email.to_string())),
            _ => Err(OrderFlowError::Validation("Both the order id and email are required".into())),
        },
        (Caller::Anonymous, Access::Mutate) => match (order_id, proof_email) {
            (Some(id), Some(email)) => Ok(OrderLookup::ByIdAndEmail(OrderId::from(id), email.to_string())),
            (None, Some(_)) => Err(OrderFlowError::Validation("Order id is required".into())),
            (_, None) => Err(OrderFlowError::Forbidden("An email address is required to modify an order".into())),
        },
    }
}

/// Restricts an order listing to what the caller is allowed to see.
pub fn resolve_list_filter(caller: &Caller, filter: OrderQueryFilter) -> Result<OrderQueryFilter, OrderFlowError> {
    match caller {
        Caller::Staff { .. } => Ok(filter),
        Caller::Customer { email } => Ok(filter.with_customer_email(email.clone())),
        Caller::Anonymous => Err(OrderFlowError::Validation("Both the order id and email are required".into())),
    }
}

/// Only staff may change anything other than the delivery address.
pub fn check_update_allowed(caller: &Caller, update: &ModifyOrderRequest) -> Result<(), OrderFlowError> {
    if caller.is_staff() || update.is_empty() || update.is_address_only() {
        Ok(())
    } else {
        Err(OrderFlowError::Forbidden("Customers may only change the delivery address".into()))
    }
}

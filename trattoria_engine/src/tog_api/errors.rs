use thiserror::Error;

use crate::{db_types::ValidationError, traits::OrderStoreError};

/// Failures at the payment provider boundary.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The credential exchange failed. This is a configuration or provider problem, not the buyer's.
    #[error("Could not authenticate with the payment gateway: {0}")]
    Auth(String),
    /// The provider understood the request and declined it.
    #[error("PayU error: {0}")]
    Business(String),
    /// The provider could not be reached, or answered with something unusable.
    #[error("Payment gateway unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Error)]
pub enum OrderFlowError {
    #[error("Invalid items: {0}")]
    InvalidItems(String),
    #[error("{0}")]
    Validation(String),
    #[error("Order not found")]
    NotFound,
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<OrderStoreError> for OrderFlowError {
    fn from(e: OrderStoreError) -> Self {
        match e {
            OrderStoreError::DatabaseError(s) => Self::DatabaseError(s),
            OrderStoreError::OrderNotFound(_) => Self::NotFound,
            e @ OrderStoreError::InvalidItem { .. } => Self::InvalidItems(e.to_string()),
            OrderStoreError::ModificationNoOp => Self::Validation("No changes were requested".into()),
        }
    }
}

impl From<ValidationError> for OrderFlowError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e.0)
    }
}

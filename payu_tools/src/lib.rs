//! A thin client for the PayU REST API.
//!
//! Only the three calls the ordering gateway needs are covered: the OAuth client-credentials exchange, creating a
//! payment order, and fetching a payment order by its PayU identifier.
mod api;
mod config;
mod error;

mod data_objects;

pub use api::PayuApi;
pub use config::PayuConfig;
pub use data_objects::{
    AccessToken,
    PayuBuyer,
    PayuOrderDetails,
    PayuOrderRequest,
    PayuOrderResponse,
    PayuOrderSummary,
    PayuProduct,
    PayuStatus,
    PAYU_SUCCESS,
};
pub use error::PayuApiError;

//! # Storage and provider contracts
//!
//! This module defines the behaviour that backends need to expose in order to be driven by the Trattoria engine APIs.
//!
//! * [`CatalogManagement`] defines the menu catalog store.
//! * [`OrderManagement`] defines the order store, including the atomic creation of an order along with its items.
//! * [`PaymentProvider`] defines the raw calls the engine makes against the remote payment system. [`PayuApi`]
//!   implements it against the live PayU REST API.
//!
//! [`PayuApi`]: payu_tools::PayuApi
mod catalog_management;
mod order_management;
mod payment_provider;

pub use catalog_management::{CatalogApiError, CatalogManagement};
pub use order_management::{OrderManagement, OrderStoreError};
pub use payment_provider::PaymentProvider;

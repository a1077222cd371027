//! Trattoria Engine
//!
//! The engine holds the business logic of the Trattoria ordering gateway: the menu catalog, order placement and
//! lifecycle, access control over orders, and reconciliation with the PayU payment gateway.
//!
//! The library is divided into three main sections:
//! 1. Storage contracts ([`mod@traits`]) and the SQLite backend that implements them ([`SqliteDatabase`]). You should
//!    never need to call the backend directly. Instead, use the public API provided by the engine. The exception is
//!    the data types used in the database. These are defined in the [`mod@db_types`] module and are public.
//! 2. The engine public API ([`OrderFlowApi`], [`CatalogApi`] and [`PaymentGatewayApi`]). An API instance is created
//!    by supplying a backend that implements the traits the API requires.
//! 3. Order access control ([`order_access`]), which decides which orders a caller may read or modify.
pub mod db_types;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;
mod tog_api;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use tog_api::{
    catalog_api::CatalogApi,
    errors::{GatewayError, OrderFlowError},
    order_access,
    order_flow_api::OrderFlowApi,
    order_objects,
    payment_gateway_api::{map_provider_status, GatewaySettings, PaymentGatewayApi},
};
pub use traits::{CatalogManagement, OrderManagement, PaymentProvider};

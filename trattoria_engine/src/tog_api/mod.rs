//! # Trattoria engine public API
//!
//! The `tog_api` module exposes the programmatic API of the Trattoria engine.
//!
//! * [`catalog_api`] manages the menu.
//! * [`order_flow_api`] places orders, drives their lifecycle, and reconciles payment state.
//! * [`payment_gateway_api`] builds payment requests and interprets the payment provider's answers.
//! * [`order_access`] decides which orders a caller may see or change.
//!
//! # API usage
//!
//! An API instance is created by supplying a backend that implements the traits required by the API.
//!
//! ```rust,ignore
//! use payu_tools::{PayuApi, PayuConfig};
//! use trattoria_engine::{OrderFlowApi, PaymentGatewayApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url(...).await?;
//! let config = PayuConfig::new_from_env_or_default();
//! let gateway = PaymentGatewayApi::new(PayuApi::new(config.clone())?, (&config).into());
//! let api = OrderFlowApi::new(db, gateway);
//! let redirect = api.place_order(request, Some(customer_ip)).await?;
//! ```
pub mod catalog_api;
pub mod errors;
pub mod order_access;
pub mod order_flow_api;
pub mod order_objects;
pub mod payment_gateway_api;

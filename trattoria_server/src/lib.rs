//! # Trattoria ordering server
//! This crate hosts the HTTP front end of the ordering backend. It is responsible for:
//! * Serving the menu, and letting staff maintain it.
//! * Accepting orders from customers, and starting their payment with PayU.
//! * Letting customers and staff look up, change and cancel orders, subject to their access rights.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/menu`, `/menu/{id}`: The menu. Anyone may read it; changes require the `staff` role.
//! * `/orders`: Place (`POST`) or list (`GET`) orders.
//! * `/orders/{id}`: Fetch, change or delete a single order. Add `?check_payment=true` to reconcile its payment status.
//! * `/orders/{id}/payment`: Start payment again for an order whose payment could not be created.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod helpers;
pub mod middleware;
pub mod routes;
pub mod server;

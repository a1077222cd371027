use thiserror::Error;

use crate::{
    db_types::{Money, NewOrder, Order, OrderId, OrderItem, PaymentStatus},
    order_objects::{LineItemRequest, ModifyOrderRequest, OrderQueryFilter},
};

#[derive(Debug, Clone, Error)]
pub enum OrderStoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("items[{position}]: {reason}")]
    InvalidItem { position: usize, reason: String },
    #[error("No fields were provided to update")]
    ModificationNoOp,
}

impl From<sqlx::Error> for OrderStoreError {
    fn from(e: sqlx::Error) -> Self {
        OrderStoreError::DatabaseError(e.to_string())
    }
}

/// The `OrderManagement` trait defines the behaviour of the order store.
///
/// Orders are identified by their public [`OrderId`]. Deleting an order always deletes its items.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Creates a new `pending` order together with its line items, in a single atomic transaction:
    /// * The order is inserted with no total.
    /// * Each line item is resolved against the catalog. The item's current name and price are captured in the
    ///   order item, and the subtotal is fixed as `unit_price × quantity`.
    /// * The order total is computed from the inserted items.
    ///
    /// If any line item refers to a menu item that does not exist or is unavailable, or has a quantity less than one,
    /// the whole transaction is rolled back and [`OrderStoreError::InvalidItem`] identifies the first failing item.
    /// No trace of the order remains in that case.
    async fn insert_order_with_items(&self, order: NewOrder, items: &[LineItemRequest])
        -> Result<Order, OrderStoreError>;

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError>;

    /// Fetches the order only if it belongs to the given customer email. A wrong id and a wrong email are
    /// indistinguishable to the caller.
    async fn fetch_order_for_email(&self, order_id: &OrderId, email: &str) -> Result<Option<Order>, OrderStoreError>;

    /// Fetches orders according to the criteria in the filter, newest first.
    async fn fetch_orders(&self, filter: OrderQueryFilter) -> Result<Vec<Order>, OrderStoreError>;

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, OrderStoreError>;

    /// Applies the changes in `update` to the order. Returns `None` if the order does not exist.
    async fn update_order(
        &self,
        order_id: &OrderId,
        update: ModifyOrderRequest,
    ) -> Result<Option<Order>, OrderStoreError>;

    /// Records the identifier of the remote payment created for this order.
    async fn set_payment_reference(&self, order_id: &OrderId, reference: &str) -> Result<Order, OrderStoreError>;

    async fn set_payment_status(&self, order_id: &OrderId, status: PaymentStatus) -> Result<Order, OrderStoreError>;

    /// Deletes the order and all of its items. Returns `false` if the order did not exist.
    async fn delete_order(&self, order_id: &OrderId) -> Result<bool, OrderStoreError>;

    /// Recalculates the order total from its current items and writes it to the order. Calling this repeatedly gives
    /// the same result.
    async fn recompute_total(&self, order_id: &OrderId) -> Result<Money, OrderStoreError>;
}

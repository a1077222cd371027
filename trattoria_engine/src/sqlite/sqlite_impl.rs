//! `SqliteDatabase` is a concrete implementation of a Trattoria engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the storage traits defined in the [`traits`]
//! module.
//!
//! [`traits`]: crate::traits
use std::fmt::Debug;

use log::*;
use sqlx::{migrate, SqlitePool};

use super::db::{menu_items, new_pool, order_items, orders};
use crate::{
    db_types::{
        MenuCategory,
        MenuItem,
        MenuItemUpdate,
        Money,
        NewMenuItem,
        NewOrder,
        Order,
        OrderId,
        OrderItem,
        PaymentStatus,
        MAX_ORDER_TOTAL,
    },
    order_objects::{LineItemRequest, ModifyOrderRequest, OrderQueryFilter},
    traits::{CatalogApiError, CatalogManagement, OrderManagement, OrderStoreError},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_menu_item(&self, id: i64) -> Result<Option<MenuItem>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let item = menu_items::fetch_menu_item(id, &mut conn).await?;
        Ok(item)
    }

    async fn fetch_menu_items(&self, category: Option<MenuCategory>) -> Result<Vec<MenuItem>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let items = menu_items::fetch_menu_items(category, &mut conn).await?;
        Ok(items)
    }

    async fn insert_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let item = menu_items::insert_menu_item(item, &mut tx).await?;
        tx.commit().await?;
        Ok(item)
    }

    async fn update_menu_item(&self, id: i64, update: MenuItemUpdate) -> Result<Option<MenuItem>, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let item = menu_items::update_menu_item(id, update, &mut tx).await?;
        tx.commit().await?;
        Ok(item)
    }

    async fn delete_menu_item(&self, id: i64) -> Result<bool, CatalogApiError> {
        let mut tx = self.pool.begin().await?;
        let deleted = menu_items::delete_menu_item(id, &mut tx).await?;
        tx.commit().await?;
        Ok(deleted)
    }
}

impl OrderManagement for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order_with_items(
        &self,
        order: NewOrder,
        items: &[LineItemRequest],
    ) -> Result<Order, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::insert_order(order, &mut tx).await?;
        let order_id = order.order_id.clone();
        let mut running_total = Money::default();
        for (position, request) in items.iter().enumerate() {
            let menu_item = menu_items::fetch_menu_item(request.menu_item, &mut tx).await?;
            let line = match menu_item {
                _ if request.quantity < 1 => Err("quantity must be at least 1".to_string()),
                None => Err(format!("menu item {} does not exist", request.menu_item)),
                Some(m) if !m.is_available => Err(format!("{} is not available", m.name)),
                Some(m) => match m.price.checked_mul(request.quantity) {
                    Some(subtotal) => match running_total.checked_add(subtotal) {
                        Some(total) if total <= MAX_ORDER_TOTAL => {
                            running_total = total;
                            Ok((m, subtotal))
                        },
                        _ => Err(format!("the order total may not exceed {MAX_ORDER_TOTAL}")),
                    },
                    None => Err(format!("quantity {} is too large", request.quantity)),
                },
            };
            match line {
                Ok((menu_item, subtotal)) => {
                    order_items::insert_order_item(&order_id, &menu_item, request.quantity, subtotal, &mut tx).await?;
                },
                Err(reason) => {
                    // Nothing from this order may survive: dropping the order and the items inserted so far.
                    tx.rollback().await?;
                    debug!("🗃️ Order {order_id} discarded. items[{position}]: {reason}");
                    return Err(OrderStoreError::InvalidItem { position, reason });
                },
            }
        }
        let total = order_items::sum_subtotals(&order_id, &mut tx).await?;
        let order = orders::set_total(&order_id, total, &mut tx)
            .await?
            .ok_or_else(|| OrderStoreError::OrderNotFound(order_id.clone()))?;
        tx.commit().await?;
        debug!("🗃️ Order {order_id} saved with {} items. Total {total}", items.len());
        Ok(order)
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_for_email(&self, order_id: &OrderId, email: &str) -> Result<Option<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_for_email(order_id, email, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders(&self, filter: OrderQueryFilter) -> Result<Vec<Order>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let result = orders::search_orders(filter, &mut conn).await?;
        Ok(result)
    }

    async fn fetch_order_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, OrderStoreError> {
        let mut conn = self.pool.acquire().await?;
        let items = order_items::fetch_items_for_order(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn update_order(
        &self,
        order_id: &OrderId,
        update: ModifyOrderRequest,
    ) -> Result<Option<Order>, OrderStoreError> {
        if update.is_empty() {
            debug!("🗃️ No fields to update for order {order_id}. Update request skipped.");
            return Err(OrderStoreError::ModificationNoOp);
        }
        let mut tx = self.pool.begin().await?;
        let order = orders::update_order(order_id, update, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn set_payment_reference(&self, order_id: &OrderId, reference: &str) -> Result<Order, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::set_payment_order_id(order_id, reference, &mut tx)
            .await?
            .ok_or_else(|| OrderStoreError::OrderNotFound(order_id.clone()))?;
        tx.commit().await?;
        trace!("🗃️ Order {order_id} linked to payment {reference}");
        Ok(order)
    }

    async fn set_payment_status(&self, order_id: &OrderId, status: PaymentStatus) -> Result<Order, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::set_payment_status(order_id, status, &mut tx)
            .await?
            .ok_or_else(|| OrderStoreError::OrderNotFound(order_id.clone()))?;
        tx.commit().await?;
        trace!("🗃️ Payment status for order {order_id} set to {status}");
        Ok(order)
    }

    async fn delete_order(&self, order_id: &OrderId) -> Result<bool, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let items = order_items::delete_items_for_order(order_id, &mut tx).await?;
        let deleted = orders::delete_order(order_id, &mut tx).await?;
        tx.commit().await?;
        if deleted {
            debug!("🗃️ Order {order_id} deleted along with {items} items");
        }
        Ok(deleted)
    }

    async fn recompute_total(&self, order_id: &OrderId) -> Result<Money, OrderStoreError> {
        let mut tx = self.pool.begin().await?;
        let total = order_items::sum_subtotals(order_id, &mut tx).await?;
        orders::set_total(order_id, total, &mut tx).await?.ok_or_else(|| OrderStoreError::OrderNotFound(order_id.clone()))?;
        tx.commit().await?;
        Ok(total)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    /// Brings the schema up to date by running the embedded migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        Ok(())
    }
}

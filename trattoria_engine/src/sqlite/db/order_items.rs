use log::trace;
use sqlx::SqliteConnection;

use crate::db_types::{MenuItem, Money, OrderId, OrderItem};

/// Adds a line item to an order, capturing the menu item's current name and price.
pub async fn insert_order_item(
    order_id: &OrderId,
    menu_item: &MenuItem,
    quantity: i64,
    subtotal: Money,
    conn: &mut SqliteConnection,
) -> Result<OrderItem, sqlx::Error> {
    let item: OrderItem = sqlx::query_as(
        r#"
            INSERT INTO order_items (order_id, menu_item_id, item_name, unit_price, quantity, subtotal)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order_id.as_str())
    .bind(menu_item.id)
    .bind(&menu_item.name)
    .bind(menu_item.price)
    .bind(quantity)
    .bind(subtotal)
    .fetch_all(conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    trace!("📝️ {quantity} × {} ({}) added to order {order_id}", item.item_name, item.unit_price);
    Ok(item)
}

pub async fn fetch_items_for_order(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY id ASC")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// The sum of the subtotals of all the items in the order. Zero if the order has no items.
pub async fn sum_subtotals(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<Money, sqlx::Error> {
    let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(subtotal), 0) FROM order_items WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await?
        .pop()
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok(Money::from_cents(total))
}

pub async fn delete_items_for_order(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM order_items WHERE order_id = $1").bind(order_id.as_str()).execute(conn).await?;
    Ok(result.rows_affected())
}

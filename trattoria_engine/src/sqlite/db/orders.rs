use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{Money, NewOrder, Order, OrderId, PaymentStatus},
    order_objects::{ModifyOrderRequest, OrderQueryFilter},
};

/// Inserts a new order into the database using the given connection. The order starts out `pending`, with no total.
///
/// This is not atomic. You can embed this call inside a transaction if you need to ensure atomicity, and pass
/// `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, sqlx::Error> {
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                customer_name,
                customer_email,
                customer_phone,
                delivery_address
            ) VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order.order_id)
    .bind(order.customer_name)
    .bind(order.customer_email)
    .bind(order.customer_phone)
    .bind(order.delivery_address)
    .fetch_all(conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    debug!("📝️ Order [{}] inserted with id {}", order.order_id, order.id);
    Ok(order)
}

pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_all(conn)
        .await?
        .pop();
    Ok(order)
}

/// Returns the order only if both the `order_id` and the customer email match.
pub async fn fetch_order_for_email(
    order_id: &OrderId,
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE order_id = $1 AND customer_email = $2")
        .bind(order_id.as_str())
        .bind(email)
        .fetch_all(conn)
        .await?
        .pop();
    Ok(order)
}

/// Fetches orders according to criteria specified in the `OrderQueryFilter`
///
/// Resulting orders are ordered by `created_at` in descending order
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(email) = query.customer_email {
        where_clause.push("customer_email = ");
        where_clause.push_bind_unseparated(email);
    }
    if let Some(status) = query.status {
        where_clause.push("status = ");
        where_clause.push_bind_unseparated(status);
    }
    if let Some(since) = query.since {
        where_clause.push("datetime(created_at) >= datetime(");
        where_clause.push_bind_unseparated(since);
        where_clause.push_unseparated(")");
    }
    if let Some(until) = query.until {
        where_clause.push("datetime(created_at) <= datetime(");
        where_clause.push_bind_unseparated(until);
        where_clause.push_unseparated(")");
    }
    builder.push(" ORDER BY created_at DESC, id DESC");

    trace!("📝️ Executing query: {}", builder.sql());
    let query = builder.build_query_as::<Order>();
    let orders = query.fetch_all(conn).await?;
    trace!("📝️ Result of search_orders: {:?}", orders.len());
    Ok(orders)
}

pub async fn update_order(
    id: &OrderId,
    update: ModifyOrderRequest,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("UPDATE orders SET updated_at = CURRENT_TIMESTAMP");
    if let Some(status) = update.status {
        builder.push(", status = ");
        builder.push_bind(status);
    }
    if let Some(name) = update.customer_name {
        builder.push(", customer_name = ");
        builder.push_bind(name);
    }
    if let Some(email) = update.customer_email {
        builder.push(", customer_email = ");
        builder.push_bind(email);
    }
    if let Some(phone) = update.customer_phone {
        builder.push(", customer_phone = ");
        builder.push_bind(phone);
    }
    if let Some(address) = update.delivery_address {
        builder.push(", delivery_address = ");
        builder.push_bind(address);
    }
    builder.push(" WHERE order_id = ");
    builder.push_bind(id.as_str());
    builder.push(" RETURNING *");
    trace!("📝️ Executing query: {}", builder.sql());
    let res = builder.build().fetch_all(conn).await?.pop();
    let res = res.map(|row: SqliteRow| Order::from_row(&row)).transpose()?;
    trace!("📝️ Result of update_order: {res:?}");
    Ok(res)
}

pub async fn set_total(
    order_id: &OrderId,
    total: Money,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET total_amount = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 RETURNING *",
    )
    .bind(total)
    .bind(order_id.as_str())
    .fetch_all(conn)
    .await?
    .pop();
    Ok(order)
}

pub async fn set_payment_order_id(
    order_id: &OrderId,
    reference: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET payment_order_id = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 RETURNING *",
    )
    .bind(reference)
    .bind(order_id.as_str())
    .fetch_all(conn)
    .await?
    .pop();
    Ok(order)
}

pub async fn set_payment_status(
    order_id: &OrderId,
    status: PaymentStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as(
        "UPDATE orders SET payment_status = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 RETURNING *",
    )
    .bind(status)
    .bind(order_id.as_str())
    .fetch_all(conn)
    .await?
    .pop();
    Ok(order)
}

/// Deletes the order row only. Use [`super::order_items::delete_items_for_order`] in the same transaction to remove
/// its items.
pub async fn delete_order(order_id: &OrderId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM orders WHERE order_id = $1").bind(order_id.as_str()).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

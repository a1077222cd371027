use log::{debug, trace};
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, SqliteConnection};

use crate::db_types::{MenuCategory, MenuItem, MenuItemUpdate, NewMenuItem};

pub async fn fetch_menu_item(id: i64, conn: &mut SqliteConnection) -> Result<Option<MenuItem>, sqlx::Error> {
    let item = sqlx::query_as("SELECT * FROM menu_items WHERE id = $1").bind(id).fetch_all(conn).await?.pop();
    Ok(item)
}

pub async fn fetch_menu_items(
    category: Option<MenuCategory>,
    conn: &mut SqliteConnection,
) -> Result<Vec<MenuItem>, sqlx::Error> {
    let items = match category {
        Some(category) => {
            sqlx::query_as("SELECT * FROM menu_items WHERE category = $1 ORDER BY name ASC")
                .bind(category)
                .fetch_all(conn)
                .await?
        },
        None => sqlx::query_as("SELECT * FROM menu_items ORDER BY category ASC, name ASC").fetch_all(conn).await?,
    };
    trace!("🗃️ Fetched {} menu items", items.len());
    Ok(items)
}

pub async fn insert_menu_item(item: NewMenuItem, conn: &mut SqliteConnection) -> Result<MenuItem, sqlx::Error> {
    let item: MenuItem = sqlx::query_as(
        r#"
            INSERT INTO menu_items (name, description, category, price, is_available)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(item.name)
    .bind(item.description)
    .bind(item.category)
    .bind(item.price)
    .bind(item.is_available)
    .fetch_all(conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    debug!("🗃️ Menu item #{} ({}) inserted", item.id, item.name);
    Ok(item)
}

pub async fn update_menu_item(
    id: i64,
    update: MenuItemUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<MenuItem>, sqlx::Error> {
    let mut builder = QueryBuilder::new("UPDATE menu_items SET updated_at = CURRENT_TIMESTAMP");
    if let Some(name) = update.name {
        builder.push(", name = ");
        builder.push_bind(name);
    }
    if let Some(description) = update.description {
        builder.push(", description = ");
        builder.push_bind(description);
    }
    if let Some(category) = update.category {
        builder.push(", category = ");
        builder.push_bind(category);
    }
    if let Some(price) = update.price {
        builder.push(", price = ");
        builder.push_bind(price);
    }
    if let Some(is_available) = update.is_available {
        builder.push(", is_available = ");
        builder.push_bind(is_available);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING *");
    trace!("🗃️ Executing query: {}", builder.sql());
    let item = builder.build().fetch_all(conn).await?.pop();
    let item = item.map(|row: SqliteRow| MenuItem::from_row(&row)).transpose()?;
    Ok(item)
}

/// Deletes the menu item. Order items that refer to it are detached first, keeping their captured name and price.
pub async fn delete_menu_item(id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let detached = sqlx::query("UPDATE order_items SET menu_item_id = NULL WHERE menu_item_id = $1")
        .bind(id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
    let deleted = sqlx::query("DELETE FROM menu_items WHERE id = $1").bind(id).execute(conn).await?.rows_affected();
    if deleted > 0 {
        debug!("🗃️ Menu item #{id} deleted. {detached} order items detached from it");
    }
    Ok(deleted > 0)
}

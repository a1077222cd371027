use thiserror::Error;

use crate::db_types::{MenuCategory, MenuItem, MenuItemUpdate, NewMenuItem, ValidationError};

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Menu item {0} does not exist")]
    MenuItemNotFound(i64),
    #[error("Invalid menu item: {0}")]
    Validation(String),
    #[error("No fields were provided to update")]
    ModificationNoOp,
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}

impl From<ValidationError> for CatalogApiError {
    fn from(e: ValidationError) -> Self {
        CatalogApiError::Validation(e.0)
    }
}

/// The `CatalogManagement` trait defines behaviour for storing and querying the restaurant's menu.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    async fn fetch_menu_item(&self, id: i64) -> Result<Option<MenuItem>, CatalogApiError>;

    /// Fetches all menu items, optionally restricted to a single category. Items are ordered by category, then name.
    async fn fetch_menu_items(&self, category: Option<MenuCategory>) -> Result<Vec<MenuItem>, CatalogApiError>;

    async fn insert_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, CatalogApiError>;

    /// Applies a partial update. Returns `None` if the menu item does not exist.
    async fn update_menu_item(&self, id: i64, update: MenuItemUpdate) -> Result<Option<MenuItem>, CatalogApiError>;

    /// Removes a menu item from the catalog. Order items that referenced it keep their captured name and price, but
    /// lose the link to the catalog.
    ///
    /// Returns `false` if the item did not exist.
    async fn delete_menu_item(&self, id: i64) -> Result<bool, CatalogApiError>;
}

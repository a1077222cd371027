use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{MenuCategory, MenuItem, MenuItemUpdate, NewMenuItem},
    traits::{CatalogApiError, CatalogManagement},
};

/// `CatalogApi` validates and forwards menu operations to a [`CatalogManagement`] backend.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub async fn menu_item(&self, id: i64) -> Result<MenuItem, CatalogApiError> {
        self.db.fetch_menu_item(id).await?.ok_or(CatalogApiError::MenuItemNotFound(id))
    }

    pub async fn menu(&self, category: Option<MenuCategory>) -> Result<Vec<MenuItem>, CatalogApiError> {
        self.db.fetch_menu_items(category).await
    }

    pub async fn create_menu_item(&self, item: NewMenuItem) -> Result<MenuItem, CatalogApiError> {
        item.validate()?;
        let item = self.db.insert_menu_item(item).await?;
        info!("🍕️ Menu item #{} ({}) created at {}", item.id, item.name, item.price);
        Ok(item)
    }

    pub async fn update_menu_item(&self, id: i64, update: MenuItemUpdate) -> Result<MenuItem, CatalogApiError> {
        if update.is_empty() {
            return Err(CatalogApiError::ModificationNoOp);
        }
        update.validate()?;
        let item = self.db.update_menu_item(id, update).await?.ok_or(CatalogApiError::MenuItemNotFound(id))?;
        info!("🍕️ Menu item #{id} ({}) updated", item.name);
        Ok(item)
    }

    pub async fn delete_menu_item(&self, id: i64) -> Result<(), CatalogApiError> {
        if !self.db.delete_menu_item(id).await? {
            return Err(CatalogApiError::MenuItemNotFound(id));
        }
        info!("🍕️ Menu item #{id} deleted");
        Ok(())
    }
}

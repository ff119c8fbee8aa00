use crate::errors::internal::{
    classify_unique_violation, InternalError, ResourceKind, ValidationErrors,
};
use crate::services::navigation_map;
use crate::types::db::navigation_item::{self, Entity as NavigationItem};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

/// The navigation tree may nest at most this deep
const MAX_DEPTH: usize = 3;

pub struct NewNavigationItem {
    pub name: String,
    pub display_name: String,
    pub url_name: Option<String>,
    pub parent_id: Option<String>,
    pub item_order: i32,
}

pub struct NavigationItemUpdate {
    pub display_name: Option<String>,
    pub url_name: Option<Option<String>>,
    pub parent_id: Option<Option<String>>,
    pub item_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Persists the navigation-item tree
pub struct NavigationStore {
    db: DatabaseConnection,
}

impl NavigationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Seed the default navigation tree; safe to run on every boot.
    /// Parents are seeded before children because the defaults list them
    /// in tree order.
    pub async fn seed_defaults(&self) -> Result<(), InternalError> {
        for (name, display_name, url_name, parent, order) in navigation_map::DEFAULT_NAVIGATION {
            let existing = NavigationItem::find()
                .filter(navigation_item::Column::Name.eq(*name))
                .one(&self.db)
                .await?;
            if existing.is_some() {
                continue;
            }

            let parent_id = match parent {
                Some(parent_name) => {
                    let parent_row = NavigationItem::find()
                        .filter(navigation_item::Column::Name.eq(*parent_name))
                        .one(&self.db)
                        .await?
                        .ok_or(InternalError::NotFound(ResourceKind::NavigationItem))?;
                    Some(parent_row.id)
                }
                None => None,
            };

            navigation_item::ActiveModel {
                id: Set(Uuid::new_v4().to_string()),
                name: Set(name.to_string()),
                display_name: Set(display_name.to_string()),
                url_name: Set(url_name.map(str::to_string)),
                parent_id: Set(parent_id),
                item_order: Set(*order),
                is_active: Set(true),
            }
            .insert(&self.db)
            .await?;
        }
        Ok(())
    }

    pub async fn create_item(
        &self,
        item: NewNavigationItem,
    ) -> Result<navigation_item::Model, InternalError> {
        if let Some(parent_id) = &item.parent_id {
            self.check_depth(parent_id, None).await?;
        }

        navigation_item::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            name: Set(item.name),
            display_name: Set(item.display_name),
            url_name: Set(item.url_name),
            parent_id: Set(item.parent_id),
            item_order: Set(item.item_order),
            is_active: Set(true),
        }
        .insert(&self.db)
        .await
        .map_err(|e| match classify_unique_violation(&e) {
            Some(_) => InternalError::Validation(ValidationErrors::single(
                "name",
                "A navigation item with this name already exists.",
            )),
            None => InternalError::Database(e),
        })
    }

    pub async fn update_item(
        &self,
        item_id: &str,
        update: NavigationItemUpdate,
    ) -> Result<navigation_item::Model, InternalError> {
        let existing = self.get_item(item_id).await?;

        if let Some(new_parent) = &update.parent_id {
            if let Some(parent_id) = new_parent {
                self.check_depth(parent_id, Some(item_id)).await?;
            }
        }

        let mut active: navigation_item::ActiveModel = existing.into();
        if let Some(display_name) = update.display_name {
            active.display_name = Set(display_name);
        }
        if let Some(url_name) = update.url_name {
            active.url_name = Set(url_name);
        }
        if let Some(parent_id) = update.parent_id {
            active.parent_id = Set(parent_id);
        }
        if let Some(item_order) = update.item_order {
            active.item_order = Set(item_order);
        }
        if let Some(is_active) = update.is_active {
            active.is_active = Set(is_active);
        }
        Ok(active.update(&self.db).await?)
    }

    pub async fn get_item(&self, item_id: &str) -> Result<navigation_item::Model, InternalError> {
        NavigationItem::find_by_id(item_id)
            .one(&self.db)
            .await?
            .ok_or(InternalError::NotFound(ResourceKind::NavigationItem))
    }

    pub async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<navigation_item::Model>, InternalError> {
        Ok(NavigationItem::find()
            .filter(navigation_item::Column::Name.eq(name))
            .one(&self.db)
            .await?)
    }

    pub async fn list_all(&self) -> Result<Vec<navigation_item::Model>, InternalError> {
        Ok(NavigationItem::find()
            .order_by_asc(navigation_item::Column::ItemOrder)
            .all(&self.db)
            .await?)
    }

    pub async fn list_active(&self) -> Result<Vec<navigation_item::Model>, InternalError> {
        Ok(NavigationItem::find()
            .filter(navigation_item::Column::IsActive.eq(true))
            .order_by_asc(navigation_item::Column::ItemOrder)
            .all(&self.db)
            .await?)
    }

    /// Reject a parent chain that would exceed the depth bound or loop
    /// back through `moving_id`
    async fn check_depth(
        &self,
        parent_id: &str,
        moving_id: Option<&str>,
    ) -> Result<(), InternalError> {
        let mut current = Some(parent_id.to_string());
        let mut depth = 1usize;

        while let Some(id) = current {
            if Some(id.as_str()) == moving_id {
                return Err(InternalError::Validation(ValidationErrors::single(
                    "parent_id",
                    "A navigation item cannot be its own ancestor.",
                )));
            }
            depth += 1;
            if depth > MAX_DEPTH {
                return Err(InternalError::Validation(ValidationErrors::single(
                    "parent_id",
                    "Navigation items cannot be nested more than three levels deep.",
                )));
            }
            let row = self.get_item(&id).await?;
            current = row.parent_id;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::Database;

    async fn setup() -> NavigationStore {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to create test database");
        Migrator::up(&db, None).await.expect("Failed to run migrations");
        NavigationStore::new(db)
    }

    fn item(name: &str, parent_id: Option<String>) -> NewNavigationItem {
        NewNavigationItem {
            name: name.to_string(),
            display_name: name.to_string(),
            url_name: None,
            parent_id,
            item_order: 0,
        }
    }

    #[tokio::test]
    async fn test_seed_defaults_is_idempotent() {
        let store = setup().await;
        store.seed_defaults().await.unwrap();
        store.seed_defaults().await.unwrap();
        assert_eq!(
            store.list_all().await.unwrap().len(),
            navigation_map::DEFAULT_NAVIGATION.len()
        );
    }

    #[tokio::test]
    async fn test_seeded_children_carry_parent_links() {
        let store = setup().await;
        store.seed_defaults().await.unwrap();

        let parent = store.find_by_name("properties").await.unwrap().unwrap();
        let child = store.find_by_name("property_list").await.unwrap().unwrap();
        assert_eq!(child.parent_id.as_deref(), Some(parent.id.as_str()));
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let store = setup().await;
        store.create_item(item("reports", None)).await.unwrap();
        let result = store.create_item(item("reports", None)).await;
        assert!(matches!(result, Err(InternalError::Validation(_))));
    }

    #[tokio::test]
    async fn test_depth_bound_enforced() {
        let store = setup().await;
        let a = store.create_item(item("a", None)).await.unwrap();
        let b = store.create_item(item("b", Some(a.id.clone()))).await.unwrap();
        let c = store.create_item(item("c", Some(b.id.clone()))).await.unwrap();

        let result = store.create_item(item("d", Some(c.id.clone()))).await;
        assert!(matches!(result, Err(InternalError::Validation(_))));
    }

    #[tokio::test]
    async fn test_cycle_rejected_on_reparent() {
        let store = setup().await;
        let a = store.create_item(item("a", None)).await.unwrap();
        let b = store.create_item(item("b", Some(a.id.clone()))).await.unwrap();

        let result = store
            .update_item(
                &a.id,
                NavigationItemUpdate {
                    display_name: None,
                    url_name: None,
                    parent_id: Some(Some(b.id.clone())),
                    item_order: None,
                    is_active: None,
                },
            )
            .await;
        assert!(matches!(result, Err(InternalError::Validation(_))));
    }

    #[tokio::test]
    async fn test_list_active_excludes_disabled() {
        let store = setup().await;
        let a = store.create_item(item("a", None)).await.unwrap();
        store.create_item(item("b", None)).await.unwrap();

        store
            .update_item(
                &a.id,
                NavigationItemUpdate {
                    display_name: None,
                    url_name: None,
                    parent_id: None,
                    item_order: None,
                    is_active: Some(false),
                },
            )
            .await
            .unwrap();

        let active = store.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "b");
    }
}

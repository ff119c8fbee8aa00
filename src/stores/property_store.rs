use crate::errors::internal::InternalError;
use crate::types::db::property::{self, Entity as Property};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

/// Minimal ownership view over properties. Full property CRUD is another
/// service; this store answers the ownership questions the authorization
/// resolver asks.
pub struct PropertyStore {
    db: DatabaseConnection,
}

impl PropertyStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn add_property(
        &self,
        owner_id: &str,
        kind: &str,
        name: &str,
        is_active: bool,
        is_approved: bool,
    ) -> Result<property::Model, InternalError> {
        let model = property::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            owner_id: Set(owner_id.to_string()),
            kind: Set(kind.to_string()),
            name: Set(name.to_string()),
            is_active: Set(is_active),
            is_approved: Set(is_approved),
            created_at: Set(Utc::now().timestamp()),
        };
        Ok(model.insert(&self.db).await?)
    }

    /// Distinct kinds of property the principal owns
    pub async fn owned_kinds(&self, owner_id: &str) -> Result<Vec<String>, InternalError> {
        let rows = Property::find()
            .filter(property::Column::OwnerId.eq(owner_id))
            .all(&self.db)
            .await?;
        let mut kinds: Vec<String> = rows.into_iter().map(|p| p.kind).collect();
        kinds.sort();
        kinds.dedup();
        Ok(kinds)
    }

    /// List properties through an optional visibility filter produced by
    /// the resolver. `None` means unrestricted.
    pub async fn list_visible(
        &self,
        filter: Option<Condition>,
    ) -> Result<Vec<property::Model>, InternalError> {
        let mut query = Property::find();
        if let Some(condition) = filter {
            query = query.filter(condition);
        }
        Ok(query.order_by_asc(property::Column::Name).all(&self.db).await?)
    }
}

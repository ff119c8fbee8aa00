use crate::errors::internal::{InternalError, ResourceKind};
use crate::types::db::reset_notification::{self, Entity as ResetNotification};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

/// Password-reset requests queued for the admin pool
pub struct NotificationStore {
    db: DatabaseConnection,
}

impl NotificationStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Queue a reset request from a principal
    pub async fn create_reset_request(
        &self,
        requester_id: &str,
        requester_label: &str,
        metadata: Option<String>,
    ) -> Result<reset_notification::Model, InternalError> {
        let model = reset_notification::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            requester_id: Set(requester_id.to_string()),
            title: Set("Password reset requested".to_string()),
            message: Set(format!("{} has requested a password reset.", requester_label)),
            metadata: Set(metadata),
            created_at: Set(Utc::now().timestamp()),
            is_read: Set(false),
            read_by: Set(None),
            read_at: Set(None),
        };
        Ok(model.insert(&self.db).await?)
    }

    /// Record that an admin completed a reset; stored pre-read so it
    /// shows in history without inflating the unread count
    pub async fn record_reset_completed(
        &self,
        requester_id: &str,
        requester_label: &str,
        admin_id: &str,
    ) -> Result<reset_notification::Model, InternalError> {
        let now = Utc::now().timestamp();
        let model = reset_notification::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            requester_id: Set(requester_id.to_string()),
            title: Set("Password reset completed".to_string()),
            message: Set(format!(
                "The password for {} has been reset to the default.",
                requester_label
            )),
            metadata: Set(None),
            created_at: Set(now),
            is_read: Set(true),
            read_by: Set(Some(admin_id.to_string())),
            read_at: Set(Some(now)),
        };
        Ok(model.insert(&self.db).await?)
    }

    pub async fn get(&self, id: &str) -> Result<reset_notification::Model, InternalError> {
        ResetNotification::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InternalError::NotFound(ResourceKind::Notification))
    }

    /// Newest first
    pub async fn list(&self) -> Result<Vec<reset_notification::Model>, InternalError> {
        Ok(ResetNotification::find()
            .order_by_desc(reset_notification::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn unread_count(&self) -> Result<u64, InternalError> {
        Ok(ResetNotification::find()
            .filter(reset_notification::Column::IsRead.eq(false))
            .count(&self.db)
            .await?)
    }

    pub async fn mark_read(&self, id: &str, admin_id: &str) -> Result<(), InternalError> {
        let existing = self.get(id).await?;
        if existing.is_read {
            return Ok(());
        }
        let mut active: reset_notification::ActiveModel = existing.into();
        active.is_read = Set(true);
        active.read_by = Set(Some(admin_id.to_string()));
        active.read_at = Set(Some(Utc::now().timestamp()));
        active.update(&self.db).await?;
        Ok(())
    }

    pub async fn mark_all_read(&self, admin_id: &str) -> Result<u64, InternalError> {
        let now = Utc::now().timestamp();
        let result = ResetNotification::update_many()
            .col_expr(
                reset_notification::Column::IsRead,
                sea_orm::sea_query::Expr::value(true),
            )
            .col_expr(
                reset_notification::Column::ReadBy,
                sea_orm::sea_query::Expr::value(admin_id),
            )
            .col_expr(
                reset_notification::Column::ReadAt,
                sea_orm::sea_query::Expr::value(now),
            )
            .filter(reset_notification::Column::IsRead.eq(false))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    pub async fn delete(&self, id: &str) -> Result<(), InternalError> {
        let result = ResetNotification::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(InternalError::NotFound(ResourceKind::Notification));
        }
        Ok(())
    }
}

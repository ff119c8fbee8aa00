use crate::api::{bearer_principal, require_privileged, BearerAuth};
use crate::app_data::AppData;
use crate::errors::api::AdminError;
use crate::types::dto::common::MessageResponse;
use crate::types::dto::notification::{
    NotificationBody, NotificationCountResponse, NotificationListResponse,
};
use poem_openapi::param::Path;
use poem_openapi::{payload::Json, OpenApi, Tags};
use std::sync::Arc;

/// Password-reset notification queue, visible to admins only
pub struct NotificationsApi {
    app: Arc<AppData>,
}

impl NotificationsApi {
    pub fn new(app: Arc<AppData>) -> Self {
        Self { app }
    }
}

#[derive(Tags)]
enum NotificationTags {
    /// Reset-request queue
    Notifications,
}

#[OpenApi(prefix_path = "/notifications")]
impl NotificationsApi {
    /// All notifications, newest first
    #[oai(path = "/", method = "get", tag = "NotificationTags::Notifications")]
    async fn list(&self, auth: BearerAuth) -> Result<Json<NotificationListResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_privileged(&principal)?;

        let rows = self
            .app
            .notifications
            .list()
            .await
            .map_err(AdminError::from_internal)?;
        Ok(Json(NotificationListResponse {
            success: true,
            message: "Notifications".to_string(),
            notifications: rows.into_iter().map(NotificationBody::from).collect(),
        }))
    }

    /// Unread count for the admin badge
    #[oai(path = "/count", method = "get", tag = "NotificationTags::Notifications")]
    async fn count(&self, auth: BearerAuth) -> Result<Json<NotificationCountResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_privileged(&principal)?;

        let unread = self
            .app
            .notifications
            .unread_count()
            .await
            .map_err(AdminError::from_internal)?;
        Ok(Json(NotificationCountResponse {
            success: true,
            message: "Unread count".to_string(),
            unread,
        }))
    }

    /// Mark one notification read
    #[oai(
        path = "/:notification_id/mark-read",
        method = "post",
        tag = "NotificationTags::Notifications"
    )]
    async fn mark_read(
        &self,
        auth: BearerAuth,
        notification_id: Path<String>,
    ) -> Result<Json<MessageResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_privileged(&principal)?;

        self.app
            .notifications
            .mark_read(&notification_id.0, &principal.id)
            .await
            .map_err(AdminError::from_internal)?;
        Ok(Json(MessageResponse::ok("Marked read")))
    }

    /// Mark every unread notification read
    #[oai(path = "/mark-all-read", method = "post", tag = "NotificationTags::Notifications")]
    async fn mark_all_read(&self, auth: BearerAuth) -> Result<Json<MessageResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_privileged(&principal)?;

        let updated = self
            .app
            .notifications
            .mark_all_read(&principal.id)
            .await
            .map_err(AdminError::from_internal)?;
        Ok(Json(MessageResponse::ok(format!(
            "{} notifications marked read",
            updated
        ))))
    }

    /// Delete a notification
    #[oai(
        path = "/:notification_id/delete",
        method = "post",
        tag = "NotificationTags::Notifications"
    )]
    async fn delete(
        &self,
        auth: BearerAuth,
        notification_id: Path<String>,
    ) -> Result<Json<MessageResponse>, AdminError> {
        let principal = bearer_principal(&self.app, &auth).await?;
        require_privileged(&principal)?;

        self.app
            .notifications
            .delete(&notification_id.0)
            .await
            .map_err(AdminError::from_internal)?;
        Ok(Json(MessageResponse::ok("Notification deleted")))
    }
}

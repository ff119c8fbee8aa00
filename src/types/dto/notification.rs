use crate::types::db::reset_notification;
use poem_openapi::Object;
use serde::Serialize;

/// Wire view of a password-reset notification
#[derive(Object, Debug, Serialize)]
pub struct NotificationBody {
    pub id: String,
    pub requester_id: String,
    pub title: String,
    pub message: String,

    /// JSON string with requester context, when present
    pub metadata: Option<String>,
    pub created_at: i64,
    pub is_read: bool,
    pub read_by: Option<String>,
    pub read_at: Option<i64>,
}

impl From<reset_notification::Model> for NotificationBody {
    fn from(model: reset_notification::Model) -> Self {
        Self {
            id: model.id,
            requester_id: model.requester_id,
            title: model.title,
            message: model.message,
            metadata: model.metadata,
            created_at: model.created_at,
            is_read: model.is_read,
            read_by: model.read_by,
            read_at: model.read_at,
        }
    }
}

#[derive(Object, Debug)]
pub struct NotificationListResponse {
    pub success: bool,
    pub message: String,
    pub notifications: Vec<NotificationBody>,
}

#[derive(Object, Debug)]
pub struct NotificationCountResponse {
    pub success: bool,
    pub message: String,
    pub unread: u64,
}

// Database entities - SeaORM models
pub mod navigation_item;
pub mod permission;
pub mod profile;
pub mod property;
pub mod refresh_token;
pub mod reset_notification;
pub mod role;
pub mod role_assignment;
pub mod role_navigation_item;
pub mod role_permission;
pub mod user;

pub mod credential_store;
pub mod navigation_store;
pub mod notification_store;
pub mod principal_store;
pub mod property_store;
pub mod role_store;

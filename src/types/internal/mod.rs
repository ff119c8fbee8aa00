// Internal types shared across layers
pub mod auth;
pub mod permission;
pub mod system_role;

pub mod auth_service;
pub mod crypto;
pub mod navigation_map;
pub mod password_policy;
pub mod phone;
pub mod resolver;
pub mod signup_service;
pub mod throttle;
pub mod token_service;

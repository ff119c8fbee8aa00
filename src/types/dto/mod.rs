// Wire payloads for the HTTP surface
pub mod auth;
pub mod common;
pub mod notification;
pub mod role;
pub mod user;

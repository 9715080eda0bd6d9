pub mod auth;
pub mod conversation;
pub mod file;
pub mod integration;
pub mod signup;
pub mod subscription;
pub mod tag;
pub mod tenant;
pub mod user;

pub mod auth;
pub mod billing;
pub mod conversation;
pub mod dashboard;
pub mod file;
pub mod health;
pub mod integration;
pub mod member;
pub mod pages;
pub mod signup;
pub mod tag;

pub mod auth;
pub mod backend;
pub mod factory;
pub mod functions;
pub mod repositories;

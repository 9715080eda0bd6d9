pub mod billing;
pub mod conversations;
pub mod dashboard;
pub mod entitlements;
pub mod fetch_guard;
pub mod integration_registry;
pub mod knowledge_base;
pub mod locks;
pub mod oauth_callback;
pub mod routes;
pub mod session;
pub mod signup;
pub mod tags;
pub mod team;
pub mod tenant_resolver;

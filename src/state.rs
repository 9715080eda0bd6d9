use std::sync::Arc;

use tera::Tera;

use crate::config::Config;
use crate::domain::ports::Backend;
use crate::domain::services::{locks::TenantLocks, session::SessionStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub backend: Backend,
    pub sessions: Arc<SessionStore>,
    pub locks: Arc<TenantLocks>,
    pub templates: Arc<Tera>,
}

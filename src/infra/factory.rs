use std::sync::Arc;

use tera::Tera;
use tracing::info;

use crate::config::Config;
use crate::domain::ports::Backend;
use crate::domain::services::{locks::TenantLocks, session::SessionStore};
use crate::error::AppError;
use crate::state::AppState;
use crate::infra::auth::http_auth_gateway::HttpAuthGateway;
use crate::infra::backend::client::BackendClient;
use crate::infra::functions::{
    channel_sender::channel_senders, meta_oauth_exchange::MetaOAuthExchange,
    rag_file_processor::RagFileProcessor,
};
use crate::infra::repositories::{
    rest_company_repo::RestCompanyRepo, rest_conversation_repo::RestConversationRepo,
    rest_file_repo::RestFileRepo, rest_integration_store::RestIntegrationStore,
    rest_subscription_repo::RestSubscriptionRepo, rest_tag_repo::RestTagRepo,
    rest_team_repo::RestTeamRepo, rest_usage_repo::RestUsageRepo,
};

pub fn load_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("shell.html", include_str!("../../templates/shell.html")),
        ("oauth_callback.html", include_str!("../../templates/oauth_callback.html")),
    ])
    .map_err(|e| AppError::InternalWithMsg(format!("Failed to load templates: {}", e)))?;
    Ok(tera)
}

/// Wires every port to the backend-as-a-service over HTTP.
pub fn http_backend(config: &Config) -> Result<Backend, AppError> {
    let client = Arc::new(BackendClient::new(
        &config.backend_url,
        config.backend_api_key.clone(),
        config.backend_timeout,
    )?);

    Ok(Backend {
        auth: Arc::new(HttpAuthGateway::new(client.clone())),
        companies: Arc::new(RestCompanyRepo::new(client.clone())),
        team: Arc::new(RestTeamRepo::new(client.clone())),
        subscriptions: Arc::new(RestSubscriptionRepo::new(client.clone())),
        usage: Arc::new(RestUsageRepo::new(client.clone())),
        integrations: Arc::new(RestIntegrationStore::new(client.clone())),
        oauth: Arc::new(MetaOAuthExchange::new(client.clone())),
        conversations: Arc::new(RestConversationRepo::new(client.clone())),
        senders: channel_senders(&client),
        tags: Arc::new(RestTagRepo::new(client.clone())),
        files: Arc::new(RestFileRepo::new(client.clone())),
        file_processor: Arc::new(RagFileProcessor::new(client)),
    })
}

/// Builds application state around any [`Backend`].
pub fn build_state(config: &Config, backend: Backend) -> Result<AppState, AppError> {
    let locks = Arc::new(TenantLocks::default());
    Ok(AppState {
        config: config.clone(),
        sessions: Arc::new(SessionStore::new(backend.clone(), locks.clone())),
        backend,
        locks,
        templates: Arc::new(load_templates()?),
    })
}

pub fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    info!("Connecting to backend at {}", config.backend_url);
    let backend = http_backend(config)?;
    build_state(config, backend)
}

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::domain::models::integration::{
    Channel, ChannelSpec, ConnectionPhase, ExchangedToken, Integration,
};
use crate::domain::ports::{IntegrationStore, OAuthExchange};
use crate::domain::services::{fetch_guard::Scoped, locks::TenantLocks};
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum RegistryState<C> {
    Unconfigured,
    Connecting { previous: Option<Integration<C>> },
    Connected(Integration<C>),
    Disconnecting(Integration<C>),
}

impl<C> RegistryState<C> {
    pub fn phase(&self) -> ConnectionPhase {
        match self {
            RegistryState::Unconfigured => ConnectionPhase::Unconfigured,
            RegistryState::Connecting { .. } => ConnectionPhase::Connecting,
            RegistryState::Connected(_) => ConnectionPhase::Connected,
            RegistryState::Disconnecting(_) => ConnectionPhase::Disconnecting,
        }
    }

    pub fn integration(&self) -> Option<&Integration<C>> {
        match self {
            RegistryState::Connected(i) | RegistryState::Disconnecting(i) => Some(i),
            RegistryState::Connecting { previous } => previous.as_ref(),
            RegistryState::Unconfigured => None,
        }
    }
}

/// Client-facing view of a registry. Never carries the access token.
#[derive(Debug, Serialize, Clone)]
pub struct IntegrationStatus {
    pub channel: Channel,
    pub phase: ConnectionPhase,
    pub connected: bool,
    pub details: Option<Value>,
    pub token_expires_at: Option<chrono::DateTime<Utc>>,
    pub token_expired: bool,
}

/// OAuth-backed credential registry of one company for one channel.
pub struct IntegrationRegistry<S: ChannelSpec> {
    company_id: String,
    store: Arc<dyn IntegrationStore>,
    exchange: Arc<dyn OAuthExchange>,
    locks: Arc<TenantLocks>,
    state: Scoped<RegistryState<S::Credentials>>,
    _spec: PhantomData<S>,
}

impl<S: ChannelSpec> IntegrationRegistry<S> {
    pub fn new(
        company_id: String,
        store: Arc<dyn IntegrationStore>,
        exchange: Arc<dyn OAuthExchange>,
        locks: Arc<TenantLocks>,
    ) -> Self {
        Self {
            state: Scoped::new(company_id.clone(), RegistryState::Unconfigured),
            company_id,
            store,
            exchange,
            locks,
            _spec: PhantomData,
        }
    }

    pub fn phase(&self) -> ConnectionPhase {
        self.state.read(|s| s.phase())
    }

    pub fn current(&self) -> Option<Integration<S::Credentials>> {
        self.state.read(|s| match s {
            RegistryState::Connected(i) => Some(i.clone()),
            _ => None,
        })
    }

    pub fn status(&self) -> IntegrationStatus {
        let now = Utc::now();
        self.state.read(|s| {
            let integration = s.integration();
            IntegrationStatus {
                channel: S::CHANNEL,
                phase: s.phase(),
                connected: matches!(s, RegistryState::Connected(_)),
                details: integration.and_then(|i| serde_json::to_value(&i.credentials).ok()),
                token_expires_at: integration.and_then(|i| i.token_expires_at),
                token_expired: integration.is_some_and(|i| i.is_token_expired(now)),
            }
        })
    }

    /// Loads the stored row, if any.
    #[instrument(skip(self), fields(company_id = %self.company_id, channel = %S::CHANNEL))]
    pub async fn refresh(&self) -> Result<(), AppError> {
        let _guard = self.locks.channel(&self.company_id, S::CHANNEL).await;
        let ticket = self.state.begin();
        let row = self.store.fetch(S::CHANNEL, &self.company_id).await?;
        let next = match row {
            Some(row) => RegistryState::Connected(decode_row::<S>(row)?),
            None => RegistryState::Unconfigured,
        };
        self.state.commit(&ticket, next);
        Ok(())
    }

    /// Exchanges an authorization code and stores the resulting credentials.
    /// A failed exchange or store leaves the previous state in place.
    #[instrument(skip(self, code), fields(company_id = %self.company_id, channel = %S::CHANNEL))]
    pub async fn configure(&self, code: &str) -> Result<Integration<S::Credentials>, AppError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::Validation("Authorization code is required".into()));
        }

        let _guard = self.locks.channel(&self.company_id, S::CHANNEL).await;
        let previous = self.state.snapshot();
        self.state.set(RegistryState::Connecting {
            previous: previous.integration().cloned(),
        });

        match self.exchange_and_store(code).await {
            Ok(integration) => {
                info!("{} integration connected", S::CHANNEL.display_name());
                self.state.set(RegistryState::Connected(integration.clone()));
                Ok(integration)
            }
            Err(e) => {
                warn!("{} integration failed: {}", S::CHANNEL.display_name(), e);
                self.state.set(previous);
                Err(e)
            }
        }
    }

    async fn exchange_and_store(&self, code: &str) -> Result<Integration<S::Credentials>, AppError> {
        let raw = self.exchange.exchange(S::CHANNEL, code).await?;
        let token: ExchangedToken<S::Credentials> = serde_json::from_value(raw).map_err(|e| {
            AppError::Remote(format!("Unexpected token exchange response: {}", e))
        })?;

        let integration = Integration {
            id: None,
            company_id: self.company_id.clone(),
            credentials: token.credentials,
            access_token: token.access_token,
            token_expires_at: token.token_expires_at,
            updated_at: Some(Utc::now()),
        };
        let row = serde_json::to_value(&integration)
            .map_err(|e| AppError::InternalWithMsg(format!("Cannot encode integration: {}", e)))?;

        let stored = self.store.upsert(S::CHANNEL, &row).await?;
        decode_row::<S>(stored)
    }

    /// Deletes the stored credentials.
    #[instrument(skip(self), fields(company_id = %self.company_id, channel = %S::CHANNEL))]
    pub async fn disconnect(&self) -> Result<(), AppError> {
        let _guard = self.locks.channel(&self.company_id, S::CHANNEL).await;
        let current = match self.state.snapshot() {
            RegistryState::Connected(i) => i,
            _ => {
                return Err(AppError::NotFound(format!(
                    "No {} integration found",
                    S::CHANNEL.display_name()
                )));
            }
        };

        self.state.set(RegistryState::Disconnecting(current.clone()));
        match self.store.delete(S::CHANNEL, &self.company_id).await {
            Ok(()) => {
                info!("{} integration disconnected", S::CHANNEL.display_name());
                self.state.set(RegistryState::Unconfigured);
                Ok(())
            }
            Err(e) => {
                warn!("{} disconnect failed: {}", S::CHANNEL.display_name(), e);
                self.state.set(RegistryState::Connected(current));
                Err(e)
            }
        }
    }
}

fn decode_row<S: ChannelSpec>(row: Value) -> Result<Integration<S::Credentials>, AppError> {
    serde_json::from_value(row).map_err(|e| {
        AppError::Remote(format!(
            "Malformed {} integration row: {}",
            S::CHANNEL.display_name(),
            e
        ))
    })
}

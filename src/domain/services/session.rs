use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::domain::models::auth::AuthTokens;
use crate::domain::models::user::Principal;
use crate::domain::ports::Backend;
use crate::domain::services::{
    dashboard::TenantContext,
    locks::TenantLocks,
    tenant_resolver::{Resolution, TenantResolver},
};
use crate::error::AppError;

#[derive(Clone)]
pub enum TenantState {
    NoCompany,
    Active(Arc<TenantContext>),
}

/// One signed-in principal and the tenant resolved for it.
pub struct DashboardSession {
    pub principal: Principal,
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
    tenant: RwLock<TenantState>,
}

impl DashboardSession {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    pub async fn tenant(&self) -> TenantState {
        self.tenant.read().await.clone()
    }

    pub async fn require_tenant(&self) -> Result<Arc<TenantContext>, AppError> {
        match self.tenant().await {
            TenantState::Active(ctx) => Ok(ctx),
            TenantState::NoCompany => Err(AppError::NoCompany),
        }
    }

    /// Resolves the tenant again and swaps in a freshly loaded context.
    /// Fetches still in flight for the old context land there, not here.
    #[instrument(skip(self, backend, locks), fields(user_id = %self.principal.id))]
    pub async fn reload(&self, backend: &Backend, locks: &Arc<TenantLocks>) -> Result<TenantState, AppError> {
        let fresh = resolve_tenant(backend, locks, &self.principal).await?;
        *self.tenant.write().await = fresh.clone();
        Ok(fresh)
    }
}

async fn resolve_tenant(
    backend: &Backend,
    locks: &Arc<TenantLocks>,
    principal: &Principal,
) -> Result<TenantState, AppError> {
    let resolver = TenantResolver::new(backend.team.clone(), backend.companies.clone());
    match resolver.resolve(&principal.id).await? {
        Resolution::NoCompany => Ok(TenantState::NoCompany),
        Resolution::Member { company, membership } => {
            let ctx = TenantContext::new(backend, locks.clone(), principal.clone(), company, membership);
            ctx.load().await;
            Ok(TenantState::Active(Arc::new(ctx)))
        }
    }
}

/// Live dashboard sessions, keyed by the SHA-256 of their access token.
pub struct SessionStore {
    backend: Backend,
    locks: Arc<TenantLocks>,
    sessions: RwLock<HashMap<String, Arc<DashboardSession>>>,
}

impl SessionStore {
    pub fn new(backend: Backend, locks: Arc<TenantLocks>) -> Self {
        Self {
            backend,
            locks,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    #[instrument(skip(self, tokens), fields(user_id = %tokens.principal.id))]
    pub async fn establish(&self, tokens: AuthTokens) -> Result<Arc<DashboardSession>, AppError> {
        let tenant = resolve_tenant(&self.backend, &self.locks, &tokens.principal).await?;
        let session = Arc::new(DashboardSession {
            principal: tokens.principal,
            expires_at: tokens.expires_at,
            tenant: RwLock::new(tenant),
            access_token: tokens.access_token,
        });

        let key = Self::hash_token(&session.access_token);
        let mut sessions = self.sessions.write().await;
        prune_expired(&mut sessions, Utc::now());
        // A concurrent request for the same token may have won the race
        let kept = sessions.entry(key).or_insert(session).clone();
        info!("Session established");
        Ok(kept)
    }

    pub async fn get(&self, access_token: &str) -> Option<Arc<DashboardSession>> {
        let key = Self::hash_token(access_token);
        let session = self.sessions.read().await.get(&key).cloned()?;
        if session.is_expired(Utc::now()) {
            self.sessions.write().await.remove(&key);
            return None;
        }
        Some(session)
    }

    /// Returns the cached session for a verified token, rebuilding it from the
    /// auth API after a restart.
    pub async fn restore(
        &self,
        access_token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Arc<DashboardSession>, AppError> {
        if let Some(session) = self.get(access_token).await {
            return Ok(session);
        }
        debug!("No cached session for token, asking the auth backend");
        let principal = self.backend.auth.current_user(access_token).await?;
        self.establish(AuthTokens {
            access_token: access_token.to_string(),
            refresh_token: None,
            expires_at,
            principal,
        })
        .await
    }

    pub async fn end(&self, access_token: &str) {
        let key = Self::hash_token(access_token);
        self.sessions.write().await.remove(&key);
        if let Err(e) = self.backend.auth.sign_out(access_token).await {
            warn!("Remote sign-out failed: {}", e);
        }
    }
}

fn prune_expired(sessions: &mut HashMap<String, Arc<DashboardSession>>, now: DateTime<Utc>) {
    let before = sessions.len();
    sessions.retain(|_, s| !s.is_expired(now));
    let dropped = before - sessions.len();
    if dropped > 0 {
        debug!("Dropped {} expired sessions", dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn session(token: &str, expires_at: Option<DateTime<Utc>>) -> Arc<DashboardSession> {
        Arc::new(DashboardSession {
            principal: Principal {
                id: "u1".into(),
                email: "ana@example.com".into(),
                display_name: None,
                phone: None,
            },
            access_token: token.into(),
            expires_at,
            tenant: RwLock::new(TenantState::NoCompany),
        })
    }

    #[test]
    fn test_prune_drops_only_expired_sessions() {
        let now = Utc::now();
        let mut sessions = HashMap::new();
        sessions.insert("old".to_string(), session("old", Some(now - Duration::minutes(1))));
        sessions.insert("live".to_string(), session("live", Some(now + Duration::hours(1))));
        sessions.insert("open".to_string(), session("open", None));

        prune_expired(&mut sessions, now);

        let mut left: Vec<_> = sessions.keys().cloned().collect();
        left.sort();
        assert_eq!(left, vec!["live".to_string(), "open".to_string()]);
    }

    #[test]
    fn test_hash_token_is_stable_hex() {
        let a = SessionStore::hash_token("token");
        assert_eq!(a, SessionStore::hash_token("token"));
        assert_ne!(a, SessionStore::hash_token("other"));
        assert_eq!(a.len(), 64);
    }
}

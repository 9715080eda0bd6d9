use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::Span;

use crate::api::extractors::auth::AuthSession;
use crate::domain::services::dashboard::TenantContext;
use crate::error::AppError;
use crate::state::AppState;

/// The resolved company of the signed-in principal. Rejects with
/// `NoCompany` when there is none.
pub struct Tenant(pub Arc<TenantContext>);

impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthSession(session) = AuthSession::from_request_parts(parts, state).await?;
        let ctx = session.require_tenant().await?;
        Span::current().record("company_id", ctx.company_id());
        Ok(Tenant(ctx))
    }
}

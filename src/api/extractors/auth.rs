use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use chrono::DateTime;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use tower_cookies::Cookies;
use tracing::{debug, Span};

use crate::domain::models::auth::Claims;
use crate::domain::services::session::DashboardSession;
use crate::error::AppError;
use crate::state::AppState;

pub const ACCESS_COOKIE: &str = "access_token";
pub const TOKEN_AUDIENCE: &str = "authenticated";

/// A verified principal with its dashboard session.
pub struct AuthSession(pub Arc<DashboardSession>);

/// Access token from the cookie, or from an `Authorization: Bearer` header.
pub fn access_token(parts: &Parts) -> Option<String> {
    if let Some(cookies) = parts.extensions.get::<Cookies>()
        && let Some(cookie) = cookies.get(ACCESS_COOKIE)
    {
        return Some(cookie.value().to_string());
    }
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

pub fn verify_access_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[TOKEN_AUDIENCE]);

    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!("Rejected access token: {}", e);
            AppError::Unauthorized
        })
}

/// Verifies `token` locally, then finds or rebuilds its session.
pub async fn session_for_token(state: &AppState, token: &str) -> Result<Arc<DashboardSession>, AppError> {
    let claims = verify_access_token(&state.config.backend_jwt_secret, token)?;
    let expires_at = DateTime::from_timestamp(claims.exp as i64, 0);
    let session = state.sessions.restore(token, expires_at).await?;
    if session.principal.id != claims.sub {
        return Err(AppError::Unauthorized);
    }
    Ok(session)
}

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Arc<DashboardSession>>() {
            return Ok(AuthSession(session.clone()));
        }

        let token = access_token(parts).ok_or(AppError::Unauthorized)?;
        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let session = session_for_token(&app_state, &token).await?;

        Span::current().record("user_id", session.principal.id.as_str());
        Ok(AuthSession(session))
    }
}

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use time::Duration;
use tower_cookies::{cookie::SameSite, Cookie, Cookies};
use tracing::info;

use crate::api::dtos::responses::SessionResponse;
use crate::api::extractors::auth::{AuthSession, ACCESS_COOKIE};
use crate::domain::models::auth::{AuthTokens, Credentials};
use crate::domain::services::session::DashboardSession;
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<Credentials>,
) -> Result<impl IntoResponse, AppError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("Email and password are required".into()));
    }

    let tokens = state.backend.auth.sign_in(&payload).await?;
    let session = start_session(&state, &cookies, tokens).await?;

    info!("User logged in: {}", session.principal.id);
    Ok(Json(SessionResponse::from_session(&session).await))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    AuthSession(session): AuthSession,
) -> Result<impl IntoResponse, AppError> {
    state.sessions.end(&session.access_token).await;
    cookies.remove(Cookie::build((ACCESS_COOKIE, "")).path("/").into());

    info!("User logged out: {}", session.principal.id);
    Ok(StatusCode::OK)
}

pub async fn get_session(AuthSession(session): AuthSession) -> Result<impl IntoResponse, AppError> {
    Ok(Json(SessionResponse::from_session(&session).await))
}

/// Re-resolves the tenant, e.g. after an invitation was accepted elsewhere.
pub async fn reload_session(
    State(state): State<Arc<AppState>>,
    AuthSession(session): AuthSession,
) -> Result<impl IntoResponse, AppError> {
    session.reload(&state.backend, &state.locks).await?;
    Ok(Json(SessionResponse::from_session(&session).await))
}

/// Establishes the dashboard session for fresh tokens and sets the cookie.
pub async fn start_session(
    state: &AppState,
    cookies: &Cookies,
    tokens: AuthTokens,
) -> Result<Arc<DashboardSession>, AppError> {
    let max_age = tokens
        .expires_at
        .map(|at| (at - Utc::now()).num_seconds().max(0))
        .unwrap_or(3600);
    let session = state.sessions.establish(tokens).await?;

    let mut cookie = Cookie::new(ACCESS_COOKIE, session.access_token.clone());
    cookie.set_http_only(true);
    cookie.set_secure(state.config.cookie_secure);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(Duration::seconds(max_age));
    cookies.add(cookie);

    Ok(session)
}

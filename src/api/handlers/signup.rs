use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use tower_cookies::Cookies;
use tracing::{info, warn};

use crate::api::cookie_store::CookieStore;
use crate::api::dtos::requests::{CompleteSignupRequest, SignupStepRequest};
use crate::api::dtos::responses::SessionResponse;
use crate::api::handlers::auth::start_session;
use crate::domain::models::integration::Channel;
use crate::domain::services::{
    session::TenantState,
    signup::{self, SignupFlow},
};
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_draft(State(state): State<Arc<AppState>>, cookies: Cookies) -> impl IntoResponse {
    let store = CookieStore::new(cookies, state.config.cookie_secure);
    let flow = SignupFlow::new(&store);
    Json(json!({ "success": true, "step": flow.step(), "draft": flow.draft() }))
}

pub async fn save_step(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<SignupStepRequest>,
) -> Result<impl IntoResponse, AppError> {
    let store = CookieStore::new(cookies, state.config.cookie_secure);
    let draft = SignupFlow::new(&store).save(payload.step, payload.data)?;
    Ok(Json(json!({ "success": true, "step": payload.step, "draft": draft })))
}

pub async fn abandon(State(state): State<Arc<AppState>>, cookies: Cookies) -> impl IntoResponse {
    let store = CookieStore::new(cookies, state.config.cookie_secure);
    SignupFlow::new(&store).abandon();
    Json(json!({ "success": true }))
}

/// Provisions account and company from the stored draft, signs the user in
/// and, when the draft carries a WhatsApp authorization code, connects it.
pub async fn complete(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<CompleteSignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let store = CookieStore::new(cookies.clone(), state.config.cookie_secure);
    let flow = SignupFlow::new(&store);
    let draft = flow.draft();

    let provisioned = signup::provision(&state.backend, &draft, &payload.password).await?;
    flow.abandon();

    let session = start_session(&state, &cookies, provisioned.tokens).await?;
    info!(company_id = %provisioned.company.id, "Signup completed");

    let mut whatsapp_error = None;
    if let Some(code) = draft.whatsapp_code.as_deref().filter(|c| !c.trim().is_empty())
        && let TenantState::Active(ctx) = session.tenant().await
        && let Err(e) = ctx.configure(Channel::WhatsApp, code).await
    {
        warn!("WhatsApp setup after signup failed: {}", e);
        whatsapp_error = Some(e.to_string());
    }

    let view = SessionResponse::from_session(&session).await;
    Ok(Json(json!({
        "success": true,
        "session": view,
        "whatsapp_error": whatsapp_error,
    })))
}

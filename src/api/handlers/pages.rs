use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::{header, StatusCode, Uri},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Json,
};
use serde_json::json;
use tera::Context;
use tower_cookies::Cookies;
use tracing::{debug, info};

use crate::api::extractors::auth::{session_for_token, ACCESS_COOKIE};
use crate::domain::services::{
    oauth_callback::{handle_callback, CallbackParams},
    routes,
    session::{DashboardSession, TenantState},
};
use crate::error::AppError;
use crate::state::AppState;

fn render(state: &AppState, template: &str, context: &Context) -> Result<Html<String>, AppError> {
    state
        .templates
        .render(template, context)
        .map(Html)
        .map_err(|e| AppError::InternalWithMsg(format!("Template {} failed: {}", template, e)))
}

/// Sends anonymous visitors of the dashboard subtree to the landing page and
/// hands the session to the page handlers.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Response {
    let session = match cookies.get(ACCESS_COOKIE) {
        Some(cookie) => session_for_token(&state, cookie.value()).await.ok(),
        None => None,
    };

    if let Some(target) = routes::guard(request.uri().path(), session.is_some()) {
        debug!("Redirecting anonymous request for {}", request.uri().path());
        return Redirect::to(target).into_response();
    }
    if let Some(session) = session {
        request.extensions_mut().insert(session);
    }
    next.run(request).await
}

pub async fn public_page(State(state): State<Arc<AppState>>, uri: Uri) -> Result<impl IntoResponse, AppError> {
    let mut context = Context::new();
    context.insert("page", uri.path());
    context.insert("authenticated", &false);
    render(&state, "shell.html", &context)
}

pub async fn dashboard_page(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<DashboardSession>>,
    uri: Uri,
) -> Result<impl IntoResponse, AppError> {
    let mut context = Context::new();
    context.insert("page", uri.path());
    context.insert("authenticated", &true);
    context.insert("user", session.principal.label());
    match session.tenant().await {
        TenantState::Active(ctx) => context.insert("company", &ctx.company.name),
        TenantState::NoCompany => context.insert("no_company", &true),
    }
    render(&state, "shell.html", &context)
}

/// Landing page of the WhatsApp OAuth redirect. Always answers with a page
/// that moves on to the settings tab after the configured delay.
pub async fn oauth_callback(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Arc<DashboardSession>>,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, AppError> {
    let tenant = session.tenant().await;
    let registry = match &tenant {
        TenantState::Active(ctx) => Some(&ctx.whatsapp),
        TenantState::NoCompany => None,
    };
    let outcome = handle_callback(&params, registry, state.config.oauth_redirect_delay).await;
    info!(status = ?outcome.status, "OAuth callback handled");

    let delay_ms = outcome.redirect_after.as_millis() as u64;
    let mut context = Context::new();
    context.insert("status", &outcome.status);
    context.insert("message", &outcome.message);
    context.insert("redirect_to", outcome.redirect_to);
    context.insert("delay_ms", &delay_ms);
    let page = render(&state, "oauth_callback.html", &context)?;

    let refresh = format!("{}; url={}", delay_ms.div_ceil(1000), outcome.redirect_to);
    Ok(([(header::REFRESH, refresh)], page))
}

pub async fn not_found(uri: Uri) -> impl IntoResponse {
    debug!("No route for {}", uri.path());
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Not found" })),
    )
}

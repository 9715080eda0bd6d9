use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::info;

use crate::api::dtos::requests::InviteMemberRequest;
use crate::api::dtos::responses::SessionResponse;
use crate::api::extractors::{auth::AuthSession, tenant::Tenant};
use crate::domain::services::team::accept_invitation;
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_members(Tenant(ctx): Tenant) -> Result<impl IntoResponse, AppError> {
    ctx.team.refresh().await?;
    let roster = ctx.team.roster();
    Ok(Json(json!({
        "success": true,
        "members": roster.members,
        "invitations": roster.invitations,
    })))
}

pub async fn invite_member(
    Tenant(ctx): Tenant,
    Json(payload): Json<InviteMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    let invitation = ctx.team.invite(&payload.email, payload.role).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "invitation": invitation }))))
}

pub async fn delete_member(
    Tenant(ctx): Tenant,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    ctx.team.remove(&user_id).await?;
    info!("Member removed: {}", user_id);
    Ok(Json(json!({ "success": true })))
}

/// Joins the caller to the inviting company and switches the session to it.
pub async fn accept(
    State(state): State<Arc<AppState>>,
    AuthSession(session): AuthSession,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let backend = &state.backend;
    let membership = accept_invitation(
        backend.team.as_ref(),
        backend.subscriptions.as_ref(),
        backend.usage.as_ref(),
        &state.locks,
        &session.principal,
        &token,
    )
    .await?;

    session.reload(backend, &state.locks).await?;
    info!(company_id = %membership.company_id, "Invitation accepted by {}", session.principal.id);
    Ok(Json(SessionResponse::from_session(&session).await))
}

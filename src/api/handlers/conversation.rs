use axum::{extract::Path, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api::dtos::requests::{ContactTagsRequest, SendMessageRequest, ToggleRequest};
use crate::api::extractors::tenant::Tenant;
use crate::domain::models::conversation::ConversationPatch;
use crate::error::AppError;

pub async fn list_conversations(Tenant(ctx): Tenant) -> Result<impl IntoResponse, AppError> {
    ctx.conversations.refresh().await?;
    Ok(Json(json!({ "success": true, "conversations": ctx.conversations.conversations() })))
}

pub async fn get_conversation(
    Tenant(ctx): Tenant,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let conversation = ctx
        .conversations
        .get(&id)
        .ok_or_else(|| AppError::NotFound("Conversation not found".into()))?;
    Ok(Json(json!({ "success": true, "conversation": conversation })))
}

pub async fn select_conversation(
    Tenant(ctx): Tenant,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let conversation = ctx.conversations.select(&id)?;
    Ok(Json(json!({ "success": true, "conversation": conversation })))
}

/// Selects the conversation, then relays `content` on its channel.
pub async fn send_message(
    Tenant(ctx): Tenant,
    Path(id): Path<String>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.conversations.select(&id)?;
    let message = ctx.conversations.send_message(&payload.content).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "message": message }))))
}

pub async fn update_contact(
    Tenant(ctx): Tenant,
    Path(id): Path<String>,
    Json(patch): Json<ConversationPatch>,
) -> Result<impl IntoResponse, AppError> {
    let conversation = ctx.conversations.update(&id, patch).await?;
    Ok(Json(json!({ "success": true, "conversation": conversation })))
}

pub async fn set_pinned(
    Tenant(ctx): Tenant,
    Path(id): Path<String>,
    Json(payload): Json<ToggleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let conversation = ctx.conversations.set_pinned(&id, payload.value).await?;
    Ok(Json(json!({ "success": true, "conversation": conversation })))
}

pub async fn set_auto_respond(
    Tenant(ctx): Tenant,
    Path(id): Path<String>,
    Json(payload): Json<ToggleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let conversation = ctx.conversations.set_auto_respond(&id, payload.value).await?;
    Ok(Json(json!({ "success": true, "conversation": conversation })))
}

pub async fn set_contact_tags(
    Tenant(ctx): Tenant,
    Path(id): Path<String>,
    Json(payload): Json<ContactTagsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let conversation = ctx.conversations.set_contact_tags(&id, payload.tags).await?;
    Ok(Json(json!({ "success": true, "conversation": conversation })))
}

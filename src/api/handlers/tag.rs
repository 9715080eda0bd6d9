use axum::{extract::Path, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::api::dtos::requests::{CreateTagRequest, EditTagRequest, RecolorTagRequest};
use crate::api::extractors::tenant::Tenant;
use crate::domain::services::dashboard::TenantContext;
use crate::error::AppError;

fn tag_view(ctx: &TenantContext) -> Json<Value> {
    Json(json!({
        "success": true,
        "tags": ctx.tags.tags(),
        "draft": ctx.tags.draft(),
        "has_changes": ctx.tags.has_changes(),
    }))
}

pub async fn list_tags(Tenant(ctx): Tenant) -> Result<impl IntoResponse, AppError> {
    ctx.tags.refresh().await?;
    Ok(tag_view(&ctx))
}

pub async fn stage_create(
    Tenant(ctx): Tenant,
    Json(payload): Json<CreateTagRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.tags.add(&payload.name, &payload.color)?;
    Ok(tag_view(&ctx))
}

pub async fn stage_edit(
    Tenant(ctx): Tenant,
    Path(id): Path<String>,
    Json(payload): Json<EditTagRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.tags.edit(&id, payload.name.as_deref(), payload.color.as_deref())?;
    Ok(tag_view(&ctx))
}

pub async fn stage_recolor(
    Tenant(ctx): Tenant,
    Path(id): Path<String>,
    Json(payload): Json<RecolorTagRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.tags.recolor(&id, &payload.color)?;
    Ok(tag_view(&ctx))
}

pub async fn stage_delete(
    Tenant(ctx): Tenant,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    ctx.tags.delete(&id)?;
    Ok(tag_view(&ctx))
}

pub async fn save_changes(Tenant(ctx): Tenant) -> Result<impl IntoResponse, AppError> {
    ctx.tags.save_tag_changes().await?;
    Ok(tag_view(&ctx))
}

pub async fn reset_changes(Tenant(ctx): Tenant) -> Result<impl IntoResponse, AppError> {
    ctx.tags.reset_tags();
    Ok(tag_view(&ctx))
}

use axum::{extract::Path, response::IntoResponse, Json};
use serde_json::json;
use tracing::info;

use crate::api::dtos::requests::ConfigureIntegrationRequest;
use crate::api::extractors::tenant::Tenant;
use crate::domain::models::integration::Channel;
use crate::error::AppError;

/// An unknown channel in the path is a missing resource, not a broken invariant.
fn parse_channel(raw: &str) -> Result<Channel, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("Unknown integration: {}", raw)))
}

pub async fn list_integrations(Tenant(ctx): Tenant) -> Result<impl IntoResponse, AppError> {
    Ok(Json(json!({ "success": true, "integrations": ctx.integration_statuses() })))
}

pub async fn get_integration(
    Tenant(ctx): Tenant,
    Path(channel): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let channel = parse_channel(&channel)?;
    let status = ctx.refresh_integration(channel).await?;
    Ok(Json(json!({ "success": true, "integration": status })))
}

pub async fn configure_integration(
    Tenant(ctx): Tenant,
    Path(channel): Path<String>,
    Json(payload): Json<ConfigureIntegrationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let channel = parse_channel(&channel)?;
    let status = ctx.configure(channel, &payload.code).await?;
    info!("{} configured for {}", channel, ctx.company_id());
    Ok(Json(json!({ "success": true, "integration": status })))
}

pub async fn disconnect_integration(
    Tenant(ctx): Tenant,
    Path(channel): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let channel = parse_channel(&channel)?;
    ctx.disconnect(channel).await?;
    Ok(Json(json!({ "success": true, "integration": ctx.integration_status(channel) })))
}

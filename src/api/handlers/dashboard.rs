use axum::{response::IntoResponse, Json};
use serde_json::json;

use crate::api::extractors::tenant::Tenant;
use crate::error::AppError;

/// Everything the dashboard's first paint needs, from the loaded context.
pub async fn overview(Tenant(ctx): Tenant) -> Result<impl IntoResponse, AppError> {
    let conversations = ctx.conversations.conversations();
    let unpinned = conversations.iter().filter(|c| !c.is_pinned).count();
    Ok(Json(json!({
        "success": true,
        "company": ctx.company,
        "role": ctx.membership.role,
        "billing": ctx.billing.snapshot(),
        "integrations": ctx.integration_statuses(),
        "conversation_count": conversations.len(),
        "pinned_count": conversations.len() - unpinned,
        "file_count": ctx.files.files().len(),
        "tag_count": ctx.tags.tags().len(),
    })))
}

use axum::{
    extract::{Multipart, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use tracing::debug;

use crate::api::extractors::tenant::Tenant;
use crate::domain::models::file::FileUpload;
use crate::error::AppError;

pub async fn list_files(Tenant(ctx): Tenant) -> Result<impl IntoResponse, AppError> {
    ctx.files.refresh().await?;
    Ok(Json(json!({ "success": true, "files": ctx.files.files() })))
}

/// Multipart upload; the document travels in the `file` field.
pub async fn upload_file(
    Tenant(ctx): Tenant,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            debug!("Skipping multipart field {:?}", field.name());
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Malformed upload: {}", e)))?;
        upload = Some(FileUpload { file_name, content_type, bytes: bytes.to_vec() });
    }

    let upload = upload.ok_or_else(|| AppError::Validation("A file is required".into()))?;
    let file = ctx.files.upload(upload).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "file": file }))))
}

pub async fn delete_file(
    Tenant(ctx): Tenant,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    ctx.files.delete(&id).await?;
    Ok(Json(json!({ "success": true })))
}

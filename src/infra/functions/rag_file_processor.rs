use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use tracing::instrument;

use crate::domain::{
    models::file::{FileUpload, ProcessedFile},
    ports::FileProcessor,
};
use crate::error::AppError;
use crate::infra::backend::client::BackendClient;

const UPLOAD: &str = "rag-files/upload";
const DELETE: &str = "rag-files/delete";

/// Knowledge base ingestion through the `rag-files` functions.
pub struct RagFileProcessor {
    client: Arc<BackendClient>,
}

impl RagFileProcessor {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FileProcessor for RagFileProcessor {
    #[instrument(skip(self, upload), fields(file = %upload.file_name, size = upload.bytes.len()))]
    async fn upload(&self, company_id: &str, upload: &FileUpload) -> Result<ProcessedFile, AppError> {
        let mut part = Part::bytes(upload.bytes.clone()).file_name(upload.file_name.clone());
        if let Some(content_type) = &upload.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|_| AppError::Validation(format!("Unsupported content type: {}", content_type)))?;
        }
        let form = Form::new()
            .text("company_id", company_id.to_string())
            .part("file", part);

        self.client.invoke_multipart(UPLOAD, company_id, form).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, company_id: &str, remote_id: &str) -> Result<(), AppError> {
        let form = Form::new()
            .text("company_id", company_id.to_string())
            .text("file_id", remote_id.to_string());
        let _: Value = self.client.invoke_multipart(DELETE, company_id, form).await?;
        Ok(())
    }
}

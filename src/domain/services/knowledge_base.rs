use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::models::file::{FileUpload, KnowledgeFile};
use crate::domain::models::subscription::UsageField;
use crate::domain::ports::{FileProcessor, FileRepository};
use crate::domain::services::{billing::BillingService, fetch_guard::Scoped};
use crate::error::AppError;

/// Knowledge base documents of one company. The remote processor, the
/// `files` table and the usage ledger are kept in step; a failure part way
/// through undoes the steps already taken, best-effort.
pub struct FileLibrary {
    company_id: String,
    repo: Arc<dyn FileRepository>,
    processor: Arc<dyn FileProcessor>,
    billing: Arc<BillingService>,
    files: Scoped<Vec<KnowledgeFile>>,
}

impl FileLibrary {
    pub fn new(
        company_id: String,
        repo: Arc<dyn FileRepository>,
        processor: Arc<dyn FileProcessor>,
        billing: Arc<BillingService>,
    ) -> Self {
        Self {
            files: Scoped::new(company_id.clone(), Vec::new()),
            company_id,
            repo,
            processor,
            billing,
        }
    }

    pub fn files(&self) -> Vec<KnowledgeFile> {
        self.files.snapshot()
    }

    pub async fn refresh(&self) -> Result<(), AppError> {
        let ticket = self.files.begin();
        let list = self.repo.list(&self.company_id).await?;
        self.files.commit(&ticket, list);
        Ok(())
    }

    #[instrument(skip(self, upload), fields(company_id = %self.company_id, file = %upload.file_name))]
    pub async fn upload(&self, upload: FileUpload) -> Result<KnowledgeFile, AppError> {
        if upload.file_name.trim().is_empty() {
            return Err(AppError::Validation("File name is required".into()));
        }
        if upload.bytes.is_empty() {
            return Err(AppError::Validation("File is empty".into()));
        }

        let _slot = self.billing.reserve(UsageField::Files).await?;

        let processed = self.processor.upload(&self.company_id, &upload).await?;
        let record = KnowledgeFile::new(self.company_id.clone(), &upload, processed.remote_id);

        let stored = match self.repo.insert(&record).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("File record insert failed, removing processed artifact: {}", e);
                self.discard_remote(&record.remote_id).await;
                return Err(e);
            }
        };

        if let Err(e) = self.billing.record_usage(UsageField::Files, 1).await {
            warn!("Usage increment failed, rolling back file {}: {}", stored.id, e);
            if let Err(cleanup) = self.repo.delete(&self.company_id, &stored.id).await {
                warn!("Could not remove file record {}: {}", stored.id, cleanup);
            }
            self.discard_remote(&stored.remote_id).await;
            return Err(e);
        }

        info!("Uploaded knowledge base file {}", stored.id);
        self.refresh().await?;
        Ok(stored)
    }

    #[instrument(skip(self), fields(company_id = %self.company_id))]
    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let file = self
            .repo
            .find_by_id(&self.company_id, id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".into()))?;

        self.processor.delete(&self.company_id, &file.remote_id).await?;
        self.repo.delete(&self.company_id, &file.id).await.map_err(|e| {
            warn!("Processed artifact {} removed but record {} remains: {}", file.remote_id, file.id, e);
            e
        })?;
        self.billing.record_usage(UsageField::Files, -1).await?;

        info!("Deleted knowledge base file {}", file.id);
        self.refresh().await
    }

    async fn discard_remote(&self, remote_id: &str) {
        match self.processor.delete(&self.company_id, remote_id).await {
            Ok(()) => info!("Compensating delete of {} succeeded", remote_id),
            Err(e) => warn!("Compensating delete of {} failed: {}", remote_id, e),
        }
    }
}

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{models::file::KnowledgeFile, ports::FileRepository};
use crate::error::AppError;
use crate::infra::backend::client::{eq, BackendClient};

const TABLE: &str = "files";

pub struct RestFileRepo {
    client: Arc<BackendClient>,
}

impl RestFileRepo {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FileRepository for RestFileRepo {
    async fn list(&self, company_id: &str) -> Result<Vec<KnowledgeFile>, AppError> {
        self.client
            .select(TABLE, &[("company_id", eq(company_id)), ("order", "created_at.desc".into())])
            .await
    }

    async fn find_by_id(&self, company_id: &str, id: &str) -> Result<Option<KnowledgeFile>, AppError> {
        self.client
            .select_one(TABLE, &[("id", eq(id)), ("company_id", eq(company_id))])
            .await
    }

    async fn insert(&self, file: &KnowledgeFile) -> Result<KnowledgeFile, AppError> {
        self.client.insert(TABLE, file).await
    }

    async fn delete(&self, company_id: &str, id: &str) -> Result<(), AppError> {
        let deleted = self
            .client
            .delete(TABLE, &[("id", eq(id)), ("company_id", eq(company_id))])
            .await?;
        if deleted == 0 {
            return Err(AppError::NotFound("File not found".into()));
        }
        Ok(())
    }
}

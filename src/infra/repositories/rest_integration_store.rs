use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{models::integration::Channel, ports::IntegrationStore};
use crate::error::AppError;
use crate::infra::backend::client::{eq, BackendClient};

/// Credential rows in the per-channel `*_integrations` tables, one row per
/// company.
pub struct RestIntegrationStore {
    client: Arc<BackendClient>,
}

impl RestIntegrationStore {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IntegrationStore for RestIntegrationStore {
    async fn fetch(&self, channel: Channel, company_id: &str) -> Result<Option<Value>, AppError> {
        self.client
            .select_one(channel.table(), &[("company_id", eq(company_id))])
            .await
    }

    async fn upsert(&self, channel: Channel, row: &Value) -> Result<Value, AppError> {
        self.client.upsert(channel.table(), "company_id", row).await
    }

    async fn delete(&self, channel: Channel, company_id: &str) -> Result<(), AppError> {
        let deleted = self
            .client
            .delete(channel.table(), &[("company_id", eq(company_id))])
            .await?;
        if deleted == 0 {
            return Err(AppError::NotFound(format!(
                "No {} integration found",
                channel.display_name()
            )));
        }
        Ok(())
    }
}

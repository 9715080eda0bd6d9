use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::domain::{
    models::subscription::{Limits, Usage, UsageField},
    ports::UsageRepository,
};
use crate::error::AppError;
use crate::infra::backend::client::{eq, BackendClient};

const TABLE: &str = "subscription_usage";
const INCREMENT_RPC: &str = "increment_usage";

pub struct RestUsageRepo {
    client: Arc<BackendClient>,
}

impl RestUsageRepo {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }

    async fn current(&self, company_id: &str) -> Result<Usage, AppError> {
        self.find_by_company(company_id)
            .await?
            .ok_or_else(|| AppError::NotFound("No usage record found for this company".into()))
    }
}

#[async_trait]
impl UsageRepository for RestUsageRepo {
    async fn create(&self, usage: &Usage) -> Result<Usage, AppError> {
        self.client.insert(TABLE, usage).await
    }

    async fn find_by_company(&self, company_id: &str) -> Result<Option<Usage>, AppError> {
        self.client.select_one(TABLE, &[("company_id", eq(company_id))]).await
    }

    /// Atomic on the backend side. The RPC may answer with the updated row or
    /// with nothing, in which case the row is read back.
    async fn increment(&self, company_id: &str, field: UsageField, delta: i64) -> Result<Usage, AppError> {
        let result: Value = self
            .client
            .rpc(
                INCREMENT_RPC,
                &json!({ "p_company_id": company_id, "p_field": field.as_str(), "p_delta": delta }),
            )
            .await?;

        let row = match result {
            Value::Array(rows) => rows.into_iter().next(),
            Value::Object(_) => Some(result),
            _ => None,
        };
        match row.and_then(|r| serde_json::from_value::<Usage>(r).ok()) {
            Some(usage) => Ok(usage),
            None => {
                debug!("{} returned no row, reading usage back", INCREMENT_RPC);
                self.current(company_id).await
            }
        }
    }

    async fn set_limits(&self, company_id: &str, limits: Limits) -> Result<Usage, AppError> {
        let rows: Vec<Usage> = self
            .client
            .update(TABLE, &[("company_id", eq(company_id))], &limits)
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("No usage record found for this company".into()))
    }
}

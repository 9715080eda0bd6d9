use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{models::tenant::Company, ports::CompanyRepository};
use crate::error::AppError;
use crate::infra::backend::client::{eq, BackendClient};

const TABLE: &str = "companies";

pub struct RestCompanyRepo {
    client: Arc<BackendClient>,
}

impl RestCompanyRepo {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CompanyRepository for RestCompanyRepo {
    async fn create(&self, company: &Company) -> Result<Company, AppError> {
        self.client.insert(TABLE, company).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Company>, AppError> {
        self.client.select_one(TABLE, &[("id", eq(id))]).await
    }
}

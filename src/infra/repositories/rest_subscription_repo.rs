use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{models::subscription::Subscription, ports::SubscriptionRepository};
use crate::error::AppError;
use crate::infra::backend::client::{eq, BackendClient};

const TABLE: &str = "subscriptions";

pub struct RestSubscriptionRepo {
    client: Arc<BackendClient>,
}

impl RestSubscriptionRepo {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SubscriptionRepository for RestSubscriptionRepo {
    async fn create(&self, subscription: &Subscription) -> Result<Subscription, AppError> {
        self.client.insert(TABLE, subscription).await
    }

    async fn find_by_company(&self, company_id: &str) -> Result<Option<Subscription>, AppError> {
        self.client
            .select_one(TABLE, &[("company_id", eq(company_id)), ("order", "created_at.desc".into())])
            .await
    }

    async fn update(&self, subscription: &Subscription) -> Result<Subscription, AppError> {
        self.client
            .update::<Subscription, _>(TABLE, &[("id", eq(&subscription.id))], subscription)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Subscription not found".into()))
    }
}

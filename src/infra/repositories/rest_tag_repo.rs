use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{models::tag::Tag, ports::TagRepository};
use crate::error::AppError;
use crate::infra::backend::client::{eq, BackendClient};

const TABLE: &str = "tags";

pub struct RestTagRepo {
    client: Arc<BackendClient>,
}

impl RestTagRepo {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TagRepository for RestTagRepo {
    /// Company tags plus the global ones.
    async fn list(&self, company_id: &str) -> Result<Vec<Tag>, AppError> {
        self.client
            .select(
                TABLE,
                &[
                    ("or", format!("(company_id.eq.{},is_global.eq.true)", company_id)),
                    ("order", "name.asc".into()),
                ],
            )
            .await
    }

    async fn create(&self, tag: &Tag) -> Result<Tag, AppError> {
        self.client.insert(TABLE, tag).await
    }

    async fn update(&self, tag: &Tag) -> Result<Tag, AppError> {
        self.client
            .update::<Tag, _>(
                TABLE,
                &[("id", eq(&tag.id)), ("company_id", eq(&tag.company_id))],
                tag,
            )
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::NotFound("Tag not found".into()))
    }

    async fn delete(&self, company_id: &str, id: &str) -> Result<(), AppError> {
        let deleted = self
            .client
            .delete(TABLE, &[("id", eq(id)), ("company_id", eq(company_id))])
            .await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Tag not found".into()));
        }
        Ok(())
    }
}

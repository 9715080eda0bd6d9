use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::domain::{
    models::tenant::{Invitation, InvitationStatus, Membership},
    ports::TeamRepository,
};
use crate::error::AppError;
use crate::infra::backend::client::{eq, BackendClient};

const MEMBERS: &str = "team";
const INVITATIONS: &str = "team_invitations";

pub struct RestTeamRepo {
    client: Arc<BackendClient>,
}

impl RestTeamRepo {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TeamRepository for RestTeamRepo {
    async fn create(&self, membership: &Membership) -> Result<Membership, AppError> {
        self.client.insert(MEMBERS, membership).await
    }

    async fn find_by_user(&self, user_id: &str) -> Result<Option<Membership>, AppError> {
        self.client
            .select_one(MEMBERS, &[("user_id", eq(user_id)), ("order", "created_at.asc".into())])
            .await
    }

    async fn list_by_company(&self, company_id: &str) -> Result<Vec<Membership>, AppError> {
        self.client
            .select(MEMBERS, &[("company_id", eq(company_id)), ("order", "created_at.asc".into())])
            .await
    }

    async fn delete(&self, company_id: &str, user_id: &str) -> Result<(), AppError> {
        let deleted = self
            .client
            .delete(MEMBERS, &[("company_id", eq(company_id)), ("user_id", eq(user_id))])
            .await?;
        if deleted == 0 {
            return Err(AppError::NotFound("Member not found".into()));
        }
        Ok(())
    }

    async fn create_invitation(&self, invitation: &Invitation) -> Result<Invitation, AppError> {
        self.client.insert(INVITATIONS, invitation).await
    }

    async fn find_invitation(&self, token: &str) -> Result<Option<Invitation>, AppError> {
        self.client.select_one(INVITATIONS, &[("token", eq(token))]).await
    }

    async fn list_invitations(&self, company_id: &str) -> Result<Vec<Invitation>, AppError> {
        self.client
            .select(INVITATIONS, &[("company_id", eq(company_id)), ("order", "created_at.desc".into())])
            .await
    }

    async fn set_invitation_status(&self, id: &str, status: InvitationStatus) -> Result<(), AppError> {
        let rows: Vec<Invitation> = self
            .client
            .update(INVITATIONS, &[("id", eq(id))], &json!({ "status": status }))
            .await?;
        if rows.is_empty() {
            return Err(AppError::NotFound("Invitation not found".into()));
        }
        Ok(())
    }
}

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::domain::models::integration::{Channel, Facebook, Instagram, WhatsApp};
use crate::domain::models::tenant::{Company, Membership};
use crate::domain::models::user::Principal;
use crate::domain::ports::Backend;
use crate::domain::services::{
    billing::BillingService,
    conversations::ConversationAggregate,
    integration_registry::{IntegrationRegistry, IntegrationStatus},
    knowledge_base::FileLibrary,
    locks::TenantLocks,
    tags::TagService,
    team::TeamService,
};
use crate::error::AppError;

/// Everything the dashboard shows for one resolved company. It can only be
/// built from a resolved [`Company`], so no tenant-scoped fetch runs without
/// a company id.
pub struct TenantContext {
    pub principal: Principal,
    pub company: Company,
    pub membership: Membership,
    pub billing: Arc<BillingService>,
    pub whatsapp: IntegrationRegistry<WhatsApp>,
    pub instagram: IntegrationRegistry<Instagram>,
    pub facebook: IntegrationRegistry<Facebook>,
    pub conversations: ConversationAggregate,
    pub tags: TagService,
    pub files: FileLibrary,
    pub team: TeamService,
}

impl TenantContext {
    pub fn new(
        backend: &Backend,
        locks: Arc<TenantLocks>,
        principal: Principal,
        company: Company,
        membership: Membership,
    ) -> Self {
        let company_id = company.id.clone();
        let billing = Arc::new(BillingService::new(
            company_id.clone(),
            backend.subscriptions.clone(),
            backend.usage.clone(),
            locks.clone(),
        ));
        let whatsapp = IntegrationRegistry::new(
            company_id.clone(),
            backend.integrations.clone(),
            backend.oauth.clone(),
            locks.clone(),
        );
        let instagram = IntegrationRegistry::new(
            company_id.clone(),
            backend.integrations.clone(),
            backend.oauth.clone(),
            locks.clone(),
        );
        let facebook = IntegrationRegistry::new(
            company_id.clone(),
            backend.integrations.clone(),
            backend.oauth.clone(),
            locks,
        );

        Self {
            conversations: ConversationAggregate::new(
                company_id.clone(),
                backend.conversations.clone(),
                backend.senders.clone(),
                billing.clone(),
            ),
            tags: TagService::new(company_id.clone(), backend.tags.clone()),
            files: FileLibrary::new(
                company_id,
                backend.files.clone(),
                backend.file_processor.clone(),
                billing.clone(),
            ),
            team: TeamService::new(membership.clone(), backend.team.clone(), billing.clone()),
            whatsapp,
            instagram,
            facebook,
            billing,
            principal,
            company,
            membership,
        }
    }

    pub fn company_id(&self) -> &str {
        &self.company.id
    }

    /// Fetches every tenant-scoped resource concurrently. A failing resource
    /// is logged and left empty; the rest still load.
    #[instrument(skip(self), fields(company_id = %self.company.id))]
    pub async fn load(&self) {
        let (billing, whatsapp, instagram, facebook, conversations, tags, files, team) = tokio::join!(
            self.billing.refresh(),
            self.whatsapp.refresh(),
            self.instagram.refresh(),
            self.facebook.refresh(),
            self.conversations.refresh(),
            self.tags.refresh(),
            self.files.refresh(),
            self.team.refresh(),
        );
        let results = [
            ("billing", billing),
            ("whatsapp", whatsapp),
            ("instagram", instagram),
            ("facebook", facebook),
            ("conversations", conversations),
            ("tags", tags),
            ("files", files),
            ("team", team),
        ];
        let mut failed = 0;
        for (resource, result) in results {
            if let Err(e) = result {
                failed += 1;
                warn!("Loading {} failed: {}", resource, e);
            }
        }
        info!("Dashboard loaded ({} of 8 resources failed)", failed);
    }

    pub async fn configure(&self, channel: Channel, code: &str) -> Result<IntegrationStatus, AppError> {
        match channel {
            Channel::WhatsApp => self.whatsapp.configure(code).await.map(|_| self.whatsapp.status()),
            Channel::Instagram => self.instagram.configure(code).await.map(|_| self.instagram.status()),
            Channel::Facebook => self.facebook.configure(code).await.map(|_| self.facebook.status()),
        }
    }

    pub async fn disconnect(&self, channel: Channel) -> Result<(), AppError> {
        match channel {
            Channel::WhatsApp => self.whatsapp.disconnect().await,
            Channel::Instagram => self.instagram.disconnect().await,
            Channel::Facebook => self.facebook.disconnect().await,
        }
    }

    pub async fn refresh_integration(&self, channel: Channel) -> Result<IntegrationStatus, AppError> {
        match channel {
            Channel::WhatsApp => self.whatsapp.refresh().await?,
            Channel::Instagram => self.instagram.refresh().await?,
            Channel::Facebook => self.facebook.refresh().await?,
        }
        Ok(self.integration_status(channel))
    }

    pub fn integration_status(&self, channel: Channel) -> IntegrationStatus {
        match channel {
            Channel::WhatsApp => self.whatsapp.status(),
            Channel::Instagram => self.instagram.status(),
            Channel::Facebook => self.facebook.status(),
        }
    }

    pub fn integration_statuses(&self) -> Vec<IntegrationStatus> {
        Channel::ALL.iter().map(|c| self.integration_status(*c)).collect()
    }
}

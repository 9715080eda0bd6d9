use crate::domain::models::{
    auth::{AuthTokens, Credentials, NewAccount},
    conversation::{Conversation, ConversationPatch, Message},
    file::{FileUpload, KnowledgeFile, ProcessedFile},
    integration::Channel,
    subscription::{Limits, Subscription, Usage, UsageField},
    tag::Tag,
    tenant::{Company, Invitation, InvitationStatus, Membership},
    user::Principal,
};
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthTokens, AppError>;
    async fn sign_up(&self, account: &NewAccount) -> Result<AuthTokens, AppError>;
    async fn current_user(&self, access_token: &str) -> Result<Principal, AppError>;
    async fn sign_out(&self, access_token: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn create(&self, company: &Company) -> Result<Company, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Company>, AppError>;
}

#[async_trait]
pub trait TeamRepository: Send + Sync {
    async fn create(&self, membership: &Membership) -> Result<Membership, AppError>;
    async fn find_by_user(&self, user_id: &str) -> Result<Option<Membership>, AppError>;
    async fn list_by_company(&self, company_id: &str) -> Result<Vec<Membership>, AppError>;
    async fn delete(&self, company_id: &str, user_id: &str) -> Result<(), AppError>;

    async fn create_invitation(&self, invitation: &Invitation) -> Result<Invitation, AppError>;
    async fn find_invitation(&self, token: &str) -> Result<Option<Invitation>, AppError>;
    async fn list_invitations(&self, company_id: &str) -> Result<Vec<Invitation>, AppError>;
    async fn set_invitation_status(&self, id: &str, status: InvitationStatus) -> Result<(), AppError>;
}

#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    async fn create(&self, subscription: &Subscription) -> Result<Subscription, AppError>;
    async fn find_by_company(&self, company_id: &str) -> Result<Option<Subscription>, AppError>;
    async fn update(&self, subscription: &Subscription) -> Result<Subscription, AppError>;
}

#[async_trait]
pub trait UsageRepository: Send + Sync {
    async fn create(&self, usage: &Usage) -> Result<Usage, AppError>;
    async fn find_by_company(&self, company_id: &str) -> Result<Option<Usage>, AppError>;
    async fn increment(&self, company_id: &str, field: UsageField, delta: i64) -> Result<Usage, AppError>;
    async fn set_limits(&self, company_id: &str, limits: Limits) -> Result<Usage, AppError>;
}

/// Per-channel credential rows. Rows travel as JSON because each channel
/// table has its own columns.
#[async_trait]
pub trait IntegrationStore: Send + Sync {
    async fn fetch(&self, channel: Channel, company_id: &str) -> Result<Option<Value>, AppError>;
    async fn upsert(&self, channel: Channel, row: &Value) -> Result<Value, AppError>;
    async fn delete(&self, channel: Channel, company_id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait OAuthExchange: Send + Sync {
    async fn exchange(&self, channel: Channel, code: &str) -> Result<Value, AppError>;
}

#[async_trait]
pub trait ConversationRepository: Send + Sync {
    async fn list(&self, company_id: &str) -> Result<Vec<Conversation>, AppError>;
    async fn update(&self, company_id: &str, id: &str, patch: &ConversationPatch) -> Result<(), AppError>;
    async fn insert_message(&self, message: &Message) -> Result<Message, AppError>;
}

#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, company_id: &str, conversation: &Conversation, content: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn list(&self, company_id: &str) -> Result<Vec<Tag>, AppError>;
    async fn create(&self, tag: &Tag) -> Result<Tag, AppError>;
    async fn update(&self, tag: &Tag) -> Result<Tag, AppError>;
    async fn delete(&self, company_id: &str, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait FileRepository: Send + Sync {
    async fn list(&self, company_id: &str) -> Result<Vec<KnowledgeFile>, AppError>;
    async fn find_by_id(&self, company_id: &str, id: &str) -> Result<Option<KnowledgeFile>, AppError>;
    async fn insert(&self, file: &KnowledgeFile) -> Result<KnowledgeFile, AppError>;
    async fn delete(&self, company_id: &str, id: &str) -> Result<(), AppError>;
}

/// Remote ingestion pipeline for knowledge base documents.
#[async_trait]
pub trait FileProcessor: Send + Sync {
    async fn upload(&self, company_id: &str, upload: &FileUpload) -> Result<ProcessedFile, AppError>;
    async fn delete(&self, company_id: &str, remote_id: &str) -> Result<(), AppError>;
}

/// Small string store owned by the client, e.g. cookies.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// One relay per channel. Dispatch goes through [`ChannelSenders::for_channel`].
#[derive(Clone)]
pub struct ChannelSenders {
    pub whatsapp: Arc<dyn MessageSender>,
    pub instagram: Arc<dyn MessageSender>,
    pub facebook: Arc<dyn MessageSender>,
}

impl ChannelSenders {
    pub fn for_channel(&self, channel: Channel) -> &Arc<dyn MessageSender> {
        match channel {
            Channel::WhatsApp => &self.whatsapp,
            Channel::Instagram => &self.instagram,
            Channel::Facebook => &self.facebook,
        }
    }
}

/// Every backend port the dashboard talks to.
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthGateway>,
    pub companies: Arc<dyn CompanyRepository>,
    pub team: Arc<dyn TeamRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub usage: Arc<dyn UsageRepository>,
    pub integrations: Arc<dyn IntegrationStore>,
    pub oauth: Arc<dyn OAuthExchange>,
    pub conversations: Arc<dyn ConversationRepository>,
    pub senders: ChannelSenders,
    pub tags: Arc<dyn TagRepository>,
    pub files: Arc<dyn FileRepository>,
    pub file_processor: Arc<dyn FileProcessor>,
}

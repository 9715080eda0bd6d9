use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info, instrument};

use crate::domain::models::conversation::{Conversation, ConversationPatch, Message};
use crate::domain::models::integration::Channel;
use crate::domain::models::subscription::UsageField;
use crate::domain::ports::{ChannelSenders, ConversationRepository};
use crate::domain::services::{billing::BillingService, fetch_guard::Scoped};
use crate::error::AppError;

/// In-memory projection of a company's conversations. Every mutation is a
/// remote command followed by a full re-fetch.
pub struct ConversationAggregate {
    company_id: String,
    repo: Arc<dyn ConversationRepository>,
    senders: ChannelSenders,
    billing: Arc<BillingService>,
    conversations: Scoped<Vec<Conversation>>,
    selected: Mutex<Option<String>>,
}

impl ConversationAggregate {
    pub fn new(
        company_id: String,
        repo: Arc<dyn ConversationRepository>,
        senders: ChannelSenders,
        billing: Arc<BillingService>,
    ) -> Self {
        Self {
            conversations: Scoped::new(company_id.clone(), Vec::new()),
            company_id,
            repo,
            senders,
            billing,
            selected: Mutex::new(None),
        }
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        self.conversations.snapshot()
    }

    pub fn get(&self, id: &str) -> Option<Conversation> {
        self.conversations.read(|list| list.iter().find(|c| c.id == id).cloned())
    }

    pub async fn refresh(&self) -> Result<(), AppError> {
        let ticket = self.conversations.begin();
        let mut list = self.repo.list(&self.company_id).await?;
        for conversation in &mut list {
            conversation.messages.sort_by_key(|m| m.created_at);
        }
        list.sort_by(Conversation::display_order);
        self.conversations.commit(&ticket, list);
        Ok(())
    }

    pub fn select(&self, id: &str) -> Result<Conversation, AppError> {
        let conversation = self
            .get(id)
            .ok_or_else(|| AppError::NotFound("Conversation not found".into()))?;
        *self.selected.lock() = Some(conversation.id.clone());
        Ok(conversation)
    }

    pub fn selected(&self) -> Option<Conversation> {
        let id = self.selected.lock().clone()?;
        self.get(&id)
    }

    /// Sends `content` to the selected conversation through the sender of
    /// its channel. An unrecognized channel fails before anything is sent.
    #[instrument(skip(self, content), fields(company_id = %self.company_id))]
    pub async fn send_message(&self, content: &str) -> Result<Message, AppError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::Validation("Message content is required".into()));
        }
        let conversation = self
            .selected()
            .ok_or_else(|| AppError::Validation("No conversation selected".into()))?;
        let channel: Channel = conversation.channel.parse()?;

        let _slot = self.billing.reserve(UsageField::Messages).await?;
        self.senders
            .for_channel(channel)
            .send(&self.company_id, &conversation, content)
            .await?;

        let message = Message::outbound(conversation.id.clone(), content.to_string());
        let inserted = self.repo.insert_message(&message).await;
        if let Err(e) = &inserted {
            error!("Message relayed on {} but not recorded: {}", channel, e);
        }
        // Relayed messages count against the limit whether or not they were recorded
        self.billing.record_usage(UsageField::Messages, 1).await?;
        let stored = inserted?;
        info!(conversation_id = %conversation.id, "Message sent via {}", channel);

        self.refresh().await?;
        Ok(stored)
    }

    pub async fn update(&self, id: &str, patch: ConversationPatch) -> Result<Conversation, AppError> {
        if patch.is_empty() {
            return Err(AppError::Validation("Nothing to update".into()));
        }
        if self.get(id).is_none() {
            return Err(AppError::NotFound("Conversation not found".into()));
        }
        self.repo.update(&self.company_id, id, &patch).await?;
        self.refresh().await?;
        self.get(id)
            .ok_or_else(|| AppError::NotFound("Conversation not found".into()))
    }

    pub async fn set_pinned(&self, id: &str, pinned: bool) -> Result<Conversation, AppError> {
        self.update(id, ConversationPatch { is_pinned: Some(pinned), ..Default::default() }).await
    }

    pub async fn set_auto_respond(&self, id: &str, enabled: bool) -> Result<Conversation, AppError> {
        self.update(id, ConversationPatch { auto_respond: Some(enabled), ..Default::default() }).await
    }

    pub async fn set_contact_tags(&self, id: &str, mut tags: Vec<String>) -> Result<Conversation, AppError> {
        tags.iter_mut().for_each(|t| *t = t.trim().to_string());
        tags.retain(|t| !t.is_empty());
        tags.dedup();
        self.update(id, ConversationPatch { contact_tags: Some(tags), ..Default::default() }).await
    }
}

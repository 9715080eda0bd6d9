use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::domain::{
    models::conversation::{Conversation, ConversationPatch, Message},
    ports::ConversationRepository,
};
use crate::error::AppError;
use crate::infra::backend::client::{eq, BackendClient};

const CONVERSATIONS: &str = "conversations";
const MESSAGES: &str = "messages";

pub struct RestConversationRepo {
    client: Arc<BackendClient>,
}

impl RestConversationRepo {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ConversationRepository for RestConversationRepo {
    async fn list(&self, company_id: &str) -> Result<Vec<Conversation>, AppError> {
        self.client
            .select_columns(
                CONVERSATIONS,
                "*,messages(*)",
                &[
                    ("company_id", eq(company_id)),
                    ("order", "last_message_at.desc.nullslast".into()),
                ],
            )
            .await
    }

    async fn update(&self, company_id: &str, id: &str, patch: &ConversationPatch) -> Result<(), AppError> {
        let rows: Vec<Conversation> = self
            .client
            .update(CONVERSATIONS, &[("id", eq(id)), ("company_id", eq(company_id))], patch)
            .await?;
        if rows.is_empty() {
            return Err(AppError::NotFound("Conversation not found".into()));
        }
        Ok(())
    }

    async fn insert_message(&self, message: &Message) -> Result<Message, AppError> {
        let stored: Message = self.client.insert(MESSAGES, message).await?;
        if let Err(e) = self
            .client
            .update::<serde_json::Value, _>(
                CONVERSATIONS,
                &[("id", eq(&stored.conversation_id))],
                &json!({ "last_message_at": stored.created_at }),
            )
            .await
        {
            warn!("Could not bump last_message_at of {}: {}", stored.conversation_id, e);
        }
        Ok(stored)
    }
}
